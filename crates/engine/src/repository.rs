use std::future::Future;

use serde::Serialize;
use thiserror::Error;

use socius_core::partner::PartnerData;

/// Errors surfaced by a keyword index backend.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("query failed: {0}")]
    Query(String),
}

/// One per-partner aggregate row returned by a keyword search, before any
/// scoring or confidence calculation.
///
/// `matched_keywords` is the comma-joined list of index entries that hit;
/// `total_score` sums their occurrence counts and `keyword_count` counts
/// how many distinct entries contributed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatch {
    pub partner_id: i64,
    pub partner_type: i32,
    pub partner_detail_id: i64,
    pub partner_name: Option<String>,
    pub matched_keywords: String,
    pub total_score: i64,
    pub keyword_count: u32,
}

/// One row of the most-indexed-keywords report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopKeyword {
    pub data: String,
    pub total_occurrences: i64,
}

/// Persistence contract for the partner keyword index.
///
/// All durable state crosses this seam. Implementations must make
/// `increment_occurrence` (and the upsert inside `save`) a single atomic
/// read-modify-write: concurrent increments of one row must never lose an
/// update. Keyword comparisons are case-insensitive throughout.
pub trait PartnerDataRepository: Send + Sync {
    /// Aggregates matching index rows per partner identity for the given
    /// normalized keywords. Rows come back in descending
    /// `(keyword_count, total_score)` order so a limited fetch keeps the
    /// strongest candidates.
    fn search_by_keywords(
        &self,
        keywords: &[String],
        partner_type: Option<i32>,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<RawMatch>, RepositoryError>> + Send;

    /// Upserts a row keyed by `(partner_id, partner_type,
    /// partner_detail_id, data)`. On conflict the stored occurrence count
    /// is replaced by the incoming one.
    fn save(&self, row: &PartnerData) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn find(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
    ) -> impl Future<Output = Result<Option<PartnerData>, RepositoryError>> + Send;

    fn find_by_partner(
        &self,
        partner_id: i64,
        partner_type: Option<i32>,
    ) -> impl Future<Output = Result<Vec<PartnerData>, RepositoryError>> + Send;

    /// Returns true when a row was actually removed.
    fn delete(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Removes every keyword row for a partner, returning how many went.
    fn delete_by_partner(
        &self,
        partner_id: i64,
        partner_type: Option<i32>,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    fn exists(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    fn count(
        &self,
        partner_type: Option<i32>,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// Adds `increment` to a row's occurrence count, creating the row at
    /// `occurrence_count = increment` when absent.
    fn increment_occurrence(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
        increment: u32,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Most-indexed keywords across all partners, descending by aggregate
    /// occurrence count.
    fn top_keywords(
        &self,
        limit: u32,
        partner_type: Option<i32>,
    ) -> impl Future<Output = Result<Vec<TopKeyword>, RepositoryError>> + Send;
}
