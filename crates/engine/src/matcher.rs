use std::cmp::Ordering;

use socius_core::confidence::MatchConfidence;
use socius_core::keyword::Keyword;
use socius_core::keyword_match::KeywordMatch;

use crate::config::{ConfigError, EngineConfig};
use crate::extractor::KeywordExtractor;
use crate::repository::{PartnerDataRepository, RawMatch, RepositoryError};

/// Score bonus per extra distinct matched keyword.
pub const DEFAULT_CLUSTERING_FACTOR: f64 = 0.2;
/// Matches below this confidence percentage are discarded.
pub const DEFAULT_MIN_CONFIDENCE_THRESHOLD: f64 = 30.0;
/// Result list length when the caller does not pass a limit.
pub const DEFAULT_MAX_SUGGESTIONS: u32 = 5;

/// Candidate rows are over-fetched by this factor so that confidence
/// filtering still leaves enough rows to fill the requested limit.
const OVERFETCH_FACTOR: u32 = 2;

/// End-to-end partner search: free text in, ranked confidence-scored
/// candidates out.
pub struct KeywordMatcher<R> {
    extractor: KeywordExtractor,
    repository: R,
    clustering_factor: f64,
    min_confidence_threshold: f64,
    max_suggestions: u32,
}

impl<R: PartnerDataRepository> KeywordMatcher<R> {
    pub fn new(extractor: KeywordExtractor, repository: R) -> Self {
        Self {
            extractor,
            repository,
            clustering_factor: DEFAULT_CLUSTERING_FACTOR,
            min_confidence_threshold: DEFAULT_MIN_CONFIDENCE_THRESHOLD,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }

    /// Builds a matcher (and its extractor) from a validated config.
    pub fn from_config(repository: R, config: &EngineConfig) -> Result<Self, ConfigError> {
        let extractor = KeywordExtractor::from_config(config)?;
        Ok(Self {
            clustering_factor: config.clustering_factor,
            min_confidence_threshold: config.min_confidence_threshold,
            max_suggestions: config.max_suggestions,
            ..Self::new(extractor, repository)
        })
    }

    pub fn clustering_factor(&self) -> f64 {
        self.clustering_factor
    }

    pub fn min_confidence_threshold(&self) -> f64 {
        self.min_confidence_threshold
    }

    pub fn max_suggestions(&self) -> u32 {
        self.max_suggestions
    }

    /// Searches the keyword index for partners matching `text`.
    ///
    /// Degenerate inputs are normal outcomes, not errors: text with no
    /// usable keywords, or an index with no hits, both yield an empty
    /// list.
    pub async fn search(
        &self,
        text: &str,
        partner_type: Option<i32>,
        limit: Option<u32>,
    ) -> Result<Vec<KeywordMatch>, RepositoryError> {
        let keywords = self.extractor.extract_strings(text);
        if keywords.is_empty() {
            tracing::debug!("no usable keywords in search text");
            return Ok(Vec::new());
        }

        let effective_limit = limit.unwrap_or(self.max_suggestions);
        let rows = self
            .repository
            .search_by_keywords(
                &keywords,
                partner_type,
                effective_limit.saturating_mul(OVERFETCH_FACTOR),
            )
            .await?;

        let mut matches = self.build_matches(rows, keywords.len());
        matches.retain(|m| m.meets_confidence_threshold(self.min_confidence_threshold));
        matches.sort_by(rank_order);
        matches.truncate(effective_limit as usize);
        tracing::debug!(candidates = matches.len(), "keyword search complete");
        Ok(matches)
    }

    /// Returns only the strongest candidate, if any clears the threshold.
    pub async fn top_match(
        &self,
        text: &str,
        partner_type: Option<i32>,
    ) -> Result<Option<KeywordMatch>, RepositoryError> {
        let matches = self.search(text, partner_type, Some(1)).await?;
        Ok(matches.into_iter().next())
    }

    /// Applies the clustering bonus. A partner matched by several distinct
    /// keywords beats one matched by a single keyword seen many times, so
    /// the bonus grows with distinct-keyword breadth rather than raw
    /// frequency.
    pub fn calculate_score(&self, raw_score: i64, keyword_count: u32) -> f64 {
        if raw_score <= 0 || keyword_count == 0 {
            return 0.0;
        }
        raw_score as f64 * (1.0 + f64::from(keyword_count - 1) * self.clustering_factor)
    }

    fn build_matches(&self, rows: Vec<RawMatch>, total_search_keywords: usize) -> Vec<KeywordMatch> {
        // Confidence compares each candidate to the best score in the set,
        // so every row is scored before any match is built.
        let scored: Vec<(RawMatch, f64)> = rows
            .into_iter()
            .map(|row| {
                let final_score = self.calculate_score(row.total_score, row.keyword_count);
                (row, final_score)
            })
            .collect();
        let top_score = scored.iter().map(|(_, s)| *s).fold(0.0_f64, f64::max);

        scored
            .into_iter()
            .filter_map(|(row, final_score)| {
                self.build_match(row, final_score, total_search_keywords, top_score)
            })
            .collect()
    }

    /// Turns one aggregate row into a ranked match. Rows that violate the
    /// repository contract are dropped with a warning rather than failing
    /// the whole search.
    fn build_match(
        &self,
        row: RawMatch,
        final_score: f64,
        total_search_keywords: usize,
        top_score: f64,
    ) -> Option<KeywordMatch> {
        let matched: Vec<Keyword> = row
            .matched_keywords
            .split(',')
            .filter_map(|part| Keyword::new(part).ok())
            .collect();
        if matched.is_empty() {
            tracing::warn!(
                partner_id = row.partner_id,
                "dropping candidate row with no parseable matched keywords"
            );
            return None;
        }

        let confidence = match MatchConfidence::from_match_statistics(
            row.keyword_count as usize,
            total_search_keywords,
            final_score,
            top_score,
        ) {
            Ok(confidence) => confidence,
            Err(err) => {
                tracing::warn!(
                    partner_id = row.partner_id,
                    error = %err,
                    "dropping candidate row with inconsistent statistics"
                );
                return None;
            }
        };

        let partner_name = row
            .partner_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Partner #{}", row.partner_id));

        match KeywordMatch::new(
            row.partner_id,
            row.partner_type,
            row.partner_detail_id,
            &partner_name,
            matched,
            row.total_score,
            final_score,
            confidence,
        ) {
            Ok(keyword_match) => Some(keyword_match),
            Err(err) => {
                tracing::warn!(
                    partner_id = row.partner_id,
                    error = %err,
                    "dropping unconstructible candidate row"
                );
                None
            }
        }
    }
}

/// Ranking policy: breadth first (more distinct matched keywords wins),
/// final score as the tie-break.
fn rank_order(a: &KeywordMatch, b: &KeywordMatch) -> Ordering {
    b.matched_keyword_count()
        .cmp(&a.matched_keyword_count())
        .then_with(|| {
            b.final_score()
                .partial_cmp(&a.final_score())
                .unwrap_or(Ordering::Equal)
        })
}
