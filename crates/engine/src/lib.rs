pub mod config;
pub mod extractor;
pub mod indexer;
pub mod matcher;
pub mod memory;
pub mod repository;
pub(crate) mod stopwords;

pub use config::{ConfigError, EngineConfig};
pub use extractor::{KeywordExtractor, KeywordRejection};
pub use indexer::{IndexError, PartnerIndexer};
pub use matcher::KeywordMatcher;
pub use memory::MemoryRepository;
pub use repository::{PartnerDataRepository, RawMatch, RepositoryError, TopKeyword};

pub mod matching {
    use crate::*;

    pub fn create_extractor(config: &EngineConfig) -> Result<KeywordExtractor, ConfigError> {
        KeywordExtractor::from_config(config)
    }

    pub fn create_matcher<R: PartnerDataRepository>(
        repository: R,
        config: &EngineConfig,
    ) -> Result<KeywordMatcher<R>, ConfigError> {
        KeywordMatcher::from_config(repository, config)
    }

    pub fn create_indexer<R: PartnerDataRepository>(
        repository: R,
        config: &EngineConfig,
    ) -> Result<PartnerIndexer<R>, ConfigError> {
        PartnerIndexer::from_config(repository, config)
    }
}
