//! Built-in English stopword table used by the keyword extractor.

/// Function words that carry no signal for partner matching. Hosts can
/// layer additional words on top through the extractor configuration.
pub(crate) const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how",
    "if", "in", "into", "is", "it", "its", "just", "me", "more", "most", "my", "no", "nor", "not",
    "now", "of", "off", "on", "once", "only", "or", "other", "our", "out", "over", "own", "same",
    "she", "so", "some", "such", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "those", "through", "to", "too", "under", "until", "up", "very", "was", "we",
    "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with",
    "you", "your",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_function_words_are_present() {
        for word in ["the", "to", "and", "of"] {
            assert!(DEFAULT_STOPWORDS.contains(&word), "missing stopword {word}");
        }
    }

    #[test]
    fn table_is_lowercase_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for word in DEFAULT_STOPWORDS {
            assert_eq!(*word, word.to_lowercase());
            assert!(seen.insert(*word), "duplicate stopword {word}");
        }
    }
}
