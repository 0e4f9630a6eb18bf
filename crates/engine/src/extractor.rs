use std::collections::HashSet;

use thiserror::Error;

use socius_core::keyword::{Keyword, KeywordError};

use crate::config::{ConfigError, EngineConfig};
use crate::stopwords::DEFAULT_STOPWORDS;

/// Length floor applied on top of keyword validation, overridable per
/// extractor.
pub const DEFAULT_MIN_KEYWORD_LENGTH: usize = 3;

/// Punctuation that ends a token. Hyphens are deliberately absent so
/// compound tokens like "big-box" survive extraction whole.
const TOKEN_BREAKS: &[char] = &[
    ',', ';', '.', '!', '?', '(', ')', '{', '}', '[', ']', '"', '\'', '<', '>', '/', '\\', '|',
    '+', '=', '*', '&', '^', '%', '$', '#', '@', '~', '`',
];

/// Why the extractor refused a word.
#[derive(Debug, Error)]
pub enum KeywordRejection {
    #[error(transparent)]
    Invalid(#[from] KeywordError),
    #[error("'{word}' is {len} characters, configured minimum is {min}")]
    BelowMinLength { word: String, len: usize, min: usize },
    #[error("'{0}' is a stopword")]
    Stopword(String),
}

/// Turns free text into the deduplicated list of valid, non-stopword
/// keywords the matcher searches with.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    stopwords: HashSet<String>,
    min_keyword_length: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordExtractor {
    pub fn new() -> Self {
        Self {
            stopwords: DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect(),
            min_keyword_length: DEFAULT_MIN_KEYWORD_LENGTH,
        }
    }

    /// Builds an extractor from a validated config, layering its extra
    /// stopwords over the built-in table.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut extractor = Self::new();
        extractor.min_keyword_length = config.min_keyword_length;
        for word in &config.extra_stopwords {
            extractor.add_stopword(word);
        }
        Ok(extractor)
    }

    /// Extracts every usable keyword from `text`, first occurrence wins:
    /// tokens are normalized, validated, length- and stopword-filtered,
    /// and deduplicated case-insensitively in input order.
    pub fn extract(&self, text: &str) -> Vec<Keyword> {
        let mut seen = HashSet::new();
        text.split(token_break)
            .filter(|token| !token.is_empty())
            .filter_map(|token| self.check(token).ok())
            .filter(|keyword| seen.insert(keyword.text().to_string()))
            .collect()
    }

    /// Like [`extract`](Self::extract) but yields the bare normalized
    /// strings, ready for a repository query.
    pub fn extract_strings(&self, text: &str) -> Vec<String> {
        self.extract(text).into_iter().map(Keyword::into_text).collect()
    }

    /// Runs one word through the full validation chain, reporting why it
    /// fails.
    pub fn check(&self, word: &str) -> Result<Keyword, KeywordRejection> {
        let keyword = Keyword::new(word)?;
        let len = keyword.text().len();
        if len < self.min_keyword_length {
            return Err(KeywordRejection::BelowMinLength {
                word: keyword.into_text(),
                len,
                min: self.min_keyword_length,
            });
        }
        if self.stopwords.contains(keyword.text()) {
            return Err(KeywordRejection::Stopword(keyword.into_text()));
        }
        Ok(keyword)
    }

    pub fn is_valid(&self, word: &str) -> bool {
        self.check(word).is_ok()
    }

    /// Adds a stopword; comparison is against normalized keywords, so the
    /// word is lowercased on the way in.
    pub fn add_stopword(&mut self, word: &str) {
        self.stopwords.insert(word.trim().to_lowercase());
    }

    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }

    pub fn min_keyword_length(&self) -> usize {
        self.min_keyword_length
    }

    pub fn set_min_keyword_length(&mut self, length: usize) -> Result<(), ConfigError> {
        if length < 1 {
            return Err(ConfigError::MinKeywordLength(length));
        }
        self.min_keyword_length = length;
        Ok(())
    }
}

fn token_break(c: char) -> bool {
    c.is_whitespace() || TOKEN_BREAKS.contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(keywords: &[Keyword]) -> Vec<&str> {
        keywords.iter().map(|k| k.text()).collect()
    }

    #[test]
    fn extracts_and_filters_stopwords() {
        let extractor = KeywordExtractor::new();
        let keywords = extractor.extract("the to big-box store");
        assert_eq!(texts(&keywords), vec!["big-box", "store"]);
    }

    #[test]
    fn splits_on_punctuation() {
        let extractor = KeywordExtractor::new();
        let keywords = extractor.extract("AMAZON.COM*PAYMENT");
        assert_eq!(texts(&keywords), vec!["amazon", "com", "payment"]);
    }

    #[test]
    fn preserves_hyphenated_tokens() {
        let extractor = KeywordExtractor::new();
        let keywords = extractor.extract("BIG-BOX (Mart), online");
        assert_eq!(texts(&keywords), vec!["big-box", "mart", "online"]);
    }

    #[test]
    fn drops_purely_numeric_and_short_tokens() {
        let extractor = KeywordExtractor::new();
        let keywords = extractor.extract("ref 12345 ab acme");
        assert_eq!(texts(&keywords), vec!["ref", "acme"]);
    }

    #[test]
    fn deduplicates_case_insensitively_keeping_first() {
        let extractor = KeywordExtractor::new();
        let keywords = extractor.extract("Walmart WALMART walmart grocery");
        assert_eq!(texts(&keywords), vec!["walmart", "grocery"]);
    }

    #[test]
    fn empty_and_noise_input_yield_nothing() {
        let extractor = KeywordExtractor::new();
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("  !!! ... 42 ").is_empty());
    }

    #[test]
    fn extract_strings_yields_plain_text() {
        let extractor = KeywordExtractor::new();
        assert_eq!(
            extractor.extract_strings("Walmart Grocery"),
            vec!["walmart", "grocery"]
        );
    }

    #[test]
    fn check_reports_rejection_reasons() {
        let extractor = KeywordExtractor::new();
        assert!(matches!(
            extractor.check("the"),
            Err(KeywordRejection::Stopword(_))
        ));
        assert!(matches!(
            extractor.check("ab"),
            Err(KeywordRejection::BelowMinLength { len: 2, min: 3, .. })
        ));
        assert!(matches!(
            extractor.check("1234"),
            Err(KeywordRejection::Invalid(KeywordError::PurelyNumeric(_)))
        ));
        assert!(extractor.check("walmart").is_ok());
    }

    #[test]
    fn is_valid_mirrors_check() {
        let extractor = KeywordExtractor::new();
        assert!(extractor.is_valid("walmart"));
        assert!(!extractor.is_valid("the"));
        assert!(!extractor.is_valid("42"));
    }

    #[test]
    fn added_stopwords_are_honored() {
        let mut extractor = KeywordExtractor::new();
        extractor.add_stopword("Payment");
        assert_eq!(
            extractor.extract_strings("payment received acme"),
            vec!["received", "acme"]
        );
    }

    #[test]
    fn min_length_is_tunable() {
        let mut extractor = KeywordExtractor::new();
        extractor.set_min_keyword_length(2).unwrap();
        assert_eq!(extractor.extract_strings("ab acme"), vec!["ab", "acme"]);
        assert!(matches!(
            extractor.set_min_keyword_length(0),
            Err(ConfigError::MinKeywordLength(0))
        ));
    }

    #[test]
    fn from_config_applies_overrides() {
        let config = EngineConfig {
            min_keyword_length: 4,
            extra_stopwords: vec!["giro".to_string()],
            ..EngineConfig::default()
        };
        let extractor = KeywordExtractor::from_config(&config).unwrap();
        assert_eq!(extractor.min_keyword_length(), 4);
        assert_eq!(extractor.extract_strings("giro ref acme"), vec!["acme"]);
    }

    #[test]
    fn from_config_rejects_invalid_config() {
        let config = EngineConfig {
            min_keyword_length: 0,
            ..EngineConfig::default()
        };
        assert!(KeywordExtractor::from_config(&config).is_err());
    }
}
