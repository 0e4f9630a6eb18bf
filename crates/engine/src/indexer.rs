use thiserror::Error;

use socius_core::partner::{PartnerData, PartnerDataError};

use crate::config::{ConfigError, EngineConfig};
use crate::extractor::{KeywordExtractor, KeywordRejection};
use crate::repository::{PartnerDataRepository, RepositoryError, TopKeyword};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("invalid keyword '{keyword}': {source}")]
    InvalidKeyword {
        keyword: String,
        #[source]
        source: KeywordRejection,
    },
    #[error("invalid index row: {0}")]
    Partner(#[from] PartnerDataError),
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Write side of the keyword index: validated saves, bulk indexing from
/// free text, and maintenance queries.
pub struct PartnerIndexer<R> {
    extractor: KeywordExtractor,
    repository: R,
}

impl<R: PartnerDataRepository> PartnerIndexer<R> {
    pub fn new(extractor: KeywordExtractor, repository: R) -> Self {
        Self {
            extractor,
            repository,
        }
    }

    /// Builds an indexer (and its extractor) from a validated config.
    pub fn from_config(repository: R, config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(KeywordExtractor::from_config(config)?, repository))
    }

    /// Stores a pre-built row as-is (upsert).
    pub async fn save(&self, row: &PartnerData) -> Result<(), RepositoryError> {
        self.repository.save(row).await
    }

    /// Validates `keyword` against the extraction rules, then indexes it
    /// for the partner. A caller-driven save fails fast on an invalid
    /// keyword instead of guessing at intent.
    pub async fn save_keyword(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
        occurrence_count: i64,
    ) -> Result<(), IndexError> {
        let keyword = self
            .extractor
            .check(keyword)
            .map_err(|source| IndexError::InvalidKeyword {
                keyword: keyword.to_string(),
                source,
            })?;
        let row = PartnerData::with_count(
            partner_id,
            partner_type,
            partner_detail_id,
            keyword.text(),
            occurrence_count,
        )?;
        self.repository.save(&row).await?;
        Ok(())
    }

    /// Extracts every usable keyword from `text` and indexes each with an
    /// occurrence count of 1, returning how many were saved. Keywords the
    /// validator refuses are skipped; storage failures still propagate.
    pub async fn save_keywords_from_text(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        text: &str,
    ) -> Result<usize, IndexError> {
        let mut saved = 0;
        for word in self.extractor.extract_strings(text) {
            match self
                .save_keyword(partner_id, partner_type, partner_detail_id, &word, 1)
                .await
            {
                Ok(()) => saved += 1,
                Err(IndexError::InvalidKeyword { keyword, source }) => {
                    tracing::debug!(keyword, reason = %source, "skipping keyword during bulk indexing");
                }
                Err(other) => return Err(other),
            }
        }
        tracing::debug!(partner_id, saved, "indexed keywords from text");
        Ok(saved)
    }

    /// Atomically bumps a keyword's occurrence count, creating the row on
    /// first sight.
    pub async fn increment_keyword_occurrence(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
        increment: u32,
    ) -> Result<(), RepositoryError> {
        self.repository
            .increment_occurrence(partner_id, partner_type, partner_detail_id, keyword, increment)
            .await
    }

    pub async fn find(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
    ) -> Result<Option<PartnerData>, RepositoryError> {
        self.repository
            .find(partner_id, partner_type, partner_detail_id, keyword)
            .await
    }

    pub async fn partner_keywords(
        &self,
        partner_id: i64,
        partner_type: Option<i32>,
    ) -> Result<Vec<PartnerData>, RepositoryError> {
        self.repository.find_by_partner(partner_id, partner_type).await
    }

    pub async fn delete(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
    ) -> Result<bool, RepositoryError> {
        self.repository
            .delete(partner_id, partner_type, partner_detail_id, keyword)
            .await
    }

    /// Drops a partner's whole slice of the index, for when the partner is
    /// removed from the host application.
    pub async fn delete_partner_keywords(
        &self,
        partner_id: i64,
        partner_type: Option<i32>,
    ) -> Result<u64, RepositoryError> {
        let removed = self.repository.delete_by_partner(partner_id, partner_type).await?;
        tracing::debug!(partner_id, removed, "deleted partner keywords");
        Ok(removed)
    }

    pub async fn exists(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
    ) -> Result<bool, RepositoryError> {
        self.repository
            .exists(partner_id, partner_type, partner_detail_id, keyword)
            .await
    }

    pub async fn count(&self, partner_type: Option<i32>) -> Result<u64, RepositoryError> {
        self.repository.count(partner_type).await
    }

    pub async fn top_keywords(
        &self,
        limit: u32,
        partner_type: Option<i32>,
    ) -> Result<Vec<TopKeyword>, RepositoryError> {
        self.repository.top_keywords(limit, partner_type).await
    }
}
