use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Shortest normalized text accepted as a keyword.
pub const MIN_KEYWORD_CHARS: usize = 2;
/// Longest normalized text accepted as a keyword.
pub const MAX_KEYWORD_CHARS: usize = 100;

fn re_strip() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9\s-]+").expect("invalid strip regex"))
}

fn re_whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("invalid whitespace regex"))
}

#[derive(Debug, Error)]
pub enum KeywordError {
    #[error("keyword is empty after normalization")]
    Empty,
    #[error("keyword '{0}' is {1} characters, minimum is {MIN_KEYWORD_CHARS}")]
    TooShort(String, usize),
    #[error("keyword is {0} characters, maximum is {MAX_KEYWORD_CHARS}")]
    TooLong(usize),
    #[error("keyword '{0}' is purely numeric")]
    PurelyNumeric(String),
}

/// Normalizes free text into keyword form: trimmed, lowercased, stripped of
/// everything outside `a-z`, `0-9`, hyphens and whitespace, with internal
/// whitespace runs collapsed to a single space.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped = re_strip().replace_all(&lowered, "");
    re_whitespace()
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// A normalized token used as a key into the partner keyword index.
///
/// Construction runs the full normalization chain, so two keywords built
/// from case or punctuation variants of the same word compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Keyword {
    text: String,
}

impl Keyword {
    pub fn new(raw: &str) -> Result<Self, KeywordError> {
        let text = normalize(raw);
        if text.is_empty() {
            return Err(KeywordError::Empty);
        }
        // Normalized text is ASCII, so byte length is character length.
        let len = text.len();
        if len < MIN_KEYWORD_CHARS {
            return Err(KeywordError::TooShort(text, len));
        }
        if len > MAX_KEYWORD_CHARS {
            return Err(KeywordError::TooLong(len));
        }
        if text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(KeywordError::PurelyNumeric(text));
        }
        Ok(Keyword { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_strips() {
        assert_eq!(normalize("  WALMART GROCERY  "), "walmart grocery");
        assert_eq!(normalize("AMAZON.COM*PAYMENT"), "amazoncompayment");
        assert_eq!(normalize("café"), "caf");
    }

    #[test]
    fn normalize_preserves_hyphens_and_digits() {
        assert_eq!(normalize("Big-Box 24"), "big-box 24");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("acme \t\n  corp"), "acme corp");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("  Héllo,   WORLD!  ");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn new_accepts_valid_word() {
        let kw = Keyword::new("Walmart").unwrap();
        assert_eq!(kw.text(), "walmart");
    }

    #[test]
    fn case_variants_compare_equal() {
        assert_eq!(Keyword::new("WALMART").unwrap(), Keyword::new("walmart").unwrap());
    }

    #[test]
    fn length_boundaries() {
        assert!(Keyword::new("ab").is_ok());
        assert!(Keyword::new(&"a".repeat(100)).is_ok());
        assert!(matches!(Keyword::new("a"), Err(KeywordError::TooShort(_, 1))));
        assert!(matches!(
            Keyword::new(&"a".repeat(101)),
            Err(KeywordError::TooLong(101))
        ));
    }

    #[test]
    fn rejects_empty_after_normalization() {
        assert!(matches!(Keyword::new("  !!! "), Err(KeywordError::Empty)));
        assert!(matches!(Keyword::new(""), Err(KeywordError::Empty)));
    }

    #[test]
    fn rejects_purely_numeric() {
        assert!(matches!(
            Keyword::new("12345"),
            Err(KeywordError::PurelyNumeric(_))
        ));
    }

    #[test]
    fn accepts_mixed_alphanumeric() {
        assert!(Keyword::new("4runner").is_ok());
        assert!(Keyword::new("12-34").is_ok());
    }

    #[test]
    fn length_checked_after_normalization() {
        // Four raw characters, one survives the strip.
        assert!(matches!(Keyword::new("é!a?"), Err(KeywordError::TooShort(_, 1))));
    }

    #[test]
    fn serializes_as_plain_string() {
        let kw = Keyword::new("Walmart").unwrap();
        assert_eq!(serde_json::to_string(&kw).unwrap(), "\"walmart\"");
    }

    #[test]
    fn display_shows_normalized_text() {
        assert_eq!(Keyword::new(" ACME ").unwrap().to_string(), "acme");
    }
}
