pub mod confidence;
pub mod keyword;
pub mod keyword_match;
pub mod partner;

pub use confidence::{ConfidenceError, ConfidenceLevel, MatchConfidence};
pub use keyword::{normalize, Keyword, KeywordError};
pub use keyword_match::{KeywordMatch, KeywordMatchError};
pub use partner::{PartnerData, PartnerDataError};
