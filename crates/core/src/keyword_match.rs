use serde::Serialize;
use thiserror::Error;

use crate::confidence::MatchConfidence;
use crate::keyword::Keyword;

/// Tolerance when checking that scoring never lowered a raw score.
const SCORE_EPSILON: f64 = 0.01;

#[derive(Debug, Error)]
pub enum KeywordMatchError {
    #[error("partner id must be positive, got {0}")]
    InvalidPartnerId(i64),
    #[error("partner name is empty")]
    EmptyPartnerName,
    #[error("a match needs at least one matched keyword")]
    NoMatchedKeywords,
    #[error("raw score must not be negative, got {0}")]
    NegativeRawScore(i64),
    #[error("final score {final_score} fell below raw score {raw_score}")]
    FinalScoreBelowRaw { raw_score: i64, final_score: f64 },
}

/// One ranked candidate produced by a search: which partner, which of the
/// search keywords hit, and how trustworthy the hit looks.
///
/// Matches are a query-time projection and are never stored. The final
/// score carries the clustering bonus, so it can exceed the raw score but
/// never undercut it.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordMatch {
    partner_id: i64,
    partner_type: i32,
    partner_detail_id: i64,
    partner_name: String,
    matched_keywords: Vec<Keyword>,
    raw_score: i64,
    final_score: f64,
    confidence: MatchConfidence,
}

impl KeywordMatch {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        partner_name: &str,
        matched_keywords: Vec<Keyword>,
        raw_score: i64,
        final_score: f64,
        confidence: MatchConfidence,
    ) -> Result<Self, KeywordMatchError> {
        if partner_id <= 0 {
            return Err(KeywordMatchError::InvalidPartnerId(partner_id));
        }
        let partner_name = partner_name.trim();
        if partner_name.is_empty() {
            return Err(KeywordMatchError::EmptyPartnerName);
        }
        if matched_keywords.is_empty() {
            return Err(KeywordMatchError::NoMatchedKeywords);
        }
        if raw_score < 0 {
            return Err(KeywordMatchError::NegativeRawScore(raw_score));
        }
        if final_score.is_nan() || final_score < raw_score as f64 - SCORE_EPSILON {
            return Err(KeywordMatchError::FinalScoreBelowRaw {
                raw_score,
                final_score,
            });
        }
        Ok(KeywordMatch {
            partner_id,
            partner_type,
            partner_detail_id,
            partner_name: partner_name.to_string(),
            matched_keywords,
            raw_score,
            final_score,
            confidence,
        })
    }

    pub fn partner_id(&self) -> i64 {
        self.partner_id
    }

    pub fn partner_type(&self) -> i32 {
        self.partner_type
    }

    pub fn partner_detail_id(&self) -> i64 {
        self.partner_detail_id
    }

    pub fn partner_name(&self) -> &str {
        &self.partner_name
    }

    pub fn matched_keywords(&self) -> &[Keyword] {
        &self.matched_keywords
    }

    pub fn matched_keyword_count(&self) -> usize {
        self.matched_keywords.len()
    }

    pub fn raw_score(&self) -> i64 {
        self.raw_score
    }

    pub fn final_score(&self) -> f64 {
        self.final_score
    }

    pub fn confidence(&self) -> &MatchConfidence {
        &self.confidence
    }

    pub fn confidence_percentage(&self) -> f64 {
        self.confidence.percentage()
    }

    /// Multiplier the clustering bonus applied to the raw score, or 0 when
    /// the raw score itself is 0.
    pub fn clustering_bonus(&self) -> f64 {
        if self.raw_score == 0 {
            0.0
        } else {
            self.final_score / self.raw_score as f64
        }
    }

    pub fn meets_confidence_threshold(&self, threshold: f64) -> bool {
        self.confidence.percentage() >= threshold
    }
}
