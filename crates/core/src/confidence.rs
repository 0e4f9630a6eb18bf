use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Weight of keyword coverage in the blended percentage.
const COVERAGE_WEIGHT: f64 = 0.6;
/// Weight of relative score strength in the blended percentage.
const STRENGTH_WEIGHT: f64 = 0.4;

/// Percentage at or above which a match counts as high confidence.
pub const HIGH_CONFIDENCE: f64 = 70.0;
/// Percentage at or above which a match counts as medium confidence.
pub const MEDIUM_CONFIDENCE: f64 = 40.0;

#[derive(Debug, Error)]
pub enum ConfidenceError {
    #[error("keyword coverage must be within [0, 100], got {0}")]
    CoverageOutOfRange(f64),
    #[error("score strength must be within [0, 100], got {0}")]
    StrengthOutOfRange(f64),
    #[error("total search keyword count must be positive")]
    NoSearchKeywords,
    #[error("matched {matched} keywords out of {total} searched")]
    MatchedAboveTotal { matched: usize, total: usize },
    #[error("scores must not be negative, got {0}")]
    NegativeScore(f64),
}

/// How strongly the engine believes a candidate is the right partner.
///
/// Blends breadth (how many of the search keywords the partner matched)
/// with relative strength (how the partner's score compares to the best
/// score in the same candidate set) into a single 0-100 percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchConfidence {
    keyword_coverage: f64,
    score_strength: f64,
    percentage: f64,
}

impl MatchConfidence {
    pub fn new(keyword_coverage: f64, score_strength: f64) -> Result<Self, ConfidenceError> {
        if !(0.0..=100.0).contains(&keyword_coverage) {
            return Err(ConfidenceError::CoverageOutOfRange(keyword_coverage));
        }
        if !(0.0..=100.0).contains(&score_strength) {
            return Err(ConfidenceError::StrengthOutOfRange(score_strength));
        }
        Ok(MatchConfidence {
            keyword_coverage,
            score_strength,
            percentage: keyword_coverage * COVERAGE_WEIGHT + score_strength * STRENGTH_WEIGHT,
        })
    }

    /// Derives confidence from raw match statistics: coverage from the
    /// matched share of the search keywords, strength from the partner's
    /// score relative to the best one. A `top_score` of 0 yields zero
    /// strength rather than a division error.
    pub fn from_match_statistics(
        matched_keyword_count: usize,
        total_search_keywords: usize,
        partner_score: f64,
        top_score: f64,
    ) -> Result<Self, ConfidenceError> {
        if total_search_keywords == 0 {
            return Err(ConfidenceError::NoSearchKeywords);
        }
        if matched_keyword_count > total_search_keywords {
            return Err(ConfidenceError::MatchedAboveTotal {
                matched: matched_keyword_count,
                total: total_search_keywords,
            });
        }
        if partner_score < 0.0 || partner_score.is_nan() {
            return Err(ConfidenceError::NegativeScore(partner_score));
        }
        if top_score < 0.0 || top_score.is_nan() {
            return Err(ConfidenceError::NegativeScore(top_score));
        }

        let coverage = matched_keyword_count as f64 / total_search_keywords as f64 * 100.0;
        let strength = if top_score > 0.0 {
            partner_score / top_score * 100.0
        } else {
            0.0
        };
        Self::new(coverage, strength)
    }

    pub fn keyword_coverage(&self) -> f64 {
        self.keyword_coverage
    }

    pub fn score_strength(&self) -> f64 {
        self.score_strength
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_percentage(self.percentage)
    }
}

/// Coarse bucketing of a confidence percentage for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= HIGH_CONFIDENCE {
            ConfidenceLevel::High
        } else if percentage >= MEDIUM_CONFIDENCE {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "high"),
            ConfidenceLevel::Medium => write!(f, "medium"),
            ConfidenceLevel::Low => write!(f, "low"),
        }
    }
}
