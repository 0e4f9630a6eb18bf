//! In-memory keyword index, used in tests and as a zero-setup backend.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use socius_core::partner::PartnerData;

use crate::repository::{PartnerDataRepository, RawMatch, RepositoryError, TopKeyword};

/// Row identity; `data` is folded to ASCII lowercase to mirror the
/// case-insensitive collation of the SQLite backend.
type RowKey = (i64, i32, i64, String);

#[derive(Debug, Default)]
struct MemoryState {
    rows: BTreeMap<RowKey, PartnerData>,
    names: HashMap<(i64, i32), String>,
}

/// Map-backed [`PartnerDataRepository`] with the same observable behavior
/// as the SQLite implementation. Cloning shares the underlying index.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the display name search results should carry for a
    /// partner. Names are host-application master data, kept beside the
    /// index rather than inside it.
    pub fn set_partner_name(&self, partner_id: i64, partner_type: i32, name: &str) {
        self.lock()
            .names
            .insert((partner_id, partner_type), name.trim().to_string());
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory repository lock poisoned")
    }

    fn key(partner_id: i64, partner_type: i32, partner_detail_id: i64, data: &str) -> RowKey {
        (
            partner_id,
            partner_type,
            partner_detail_id,
            data.trim().to_ascii_lowercase(),
        )
    }
}

impl PartnerDataRepository for MemoryRepository {
    async fn search_by_keywords(
        &self,
        keywords: &[String],
        partner_type: Option<i32>,
        limit: u32,
    ) -> Result<Vec<RawMatch>, RepositoryError> {
        let wanted: HashSet<String> = keywords
            .iter()
            .map(|k| k.trim().to_ascii_lowercase())
            .collect();
        let state = self.lock();

        // Aggregate matching rows per partner identity. BTreeMap iteration
        // keeps grouping and tie order deterministic.
        let mut grouped: BTreeMap<(i64, i32, i64), (Vec<String>, i64, u32)> = BTreeMap::new();
        for ((pid, ptype, pdetail, data_key), row) in &state.rows {
            if !wanted.contains(data_key) {
                continue;
            }
            if partner_type.is_some_and(|t| t != *ptype) {
                continue;
            }
            let entry = grouped.entry((*pid, *ptype, *pdetail)).or_default();
            entry.0.push(row.data().to_string());
            entry.1 += row.occurrence_count();
            entry.2 += 1;
        }

        let mut matches: Vec<RawMatch> = grouped
            .into_iter()
            .map(|((partner_id, partner_type, partner_detail_id), (matched, total, count))| {
                RawMatch {
                    partner_id,
                    partner_type,
                    partner_detail_id,
                    partner_name: state.names.get(&(partner_id, partner_type)).cloned(),
                    matched_keywords: matched.join(","),
                    total_score: total,
                    keyword_count: count,
                }
            })
            .collect();

        matches.sort_by(|a, b| {
            b.keyword_count
                .cmp(&a.keyword_count)
                .then_with(|| b.total_score.cmp(&a.total_score))
        });
        matches.truncate(limit as usize);
        Ok(matches)
    }

    async fn save(&self, row: &PartnerData) -> Result<(), RepositoryError> {
        let key = Self::key(
            row.partner_id(),
            row.partner_type(),
            row.partner_detail_id(),
            row.data(),
        );
        let mut state = self.lock();
        // On conflict only the occurrence count is replaced; the stored
        // spelling of `data` stays, as it does in SQLite.
        let updated = match state.rows.get(&key) {
            Some(existing) => PartnerData::with_count(
                existing.partner_id(),
                existing.partner_type(),
                existing.partner_detail_id(),
                existing.data(),
                row.occurrence_count(),
            )
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
            None => row.clone(),
        };
        state.rows.insert(key, updated);
        Ok(())
    }

    async fn find(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
    ) -> Result<Option<PartnerData>, RepositoryError> {
        let key = Self::key(partner_id, partner_type, partner_detail_id, keyword);
        Ok(self.lock().rows.get(&key).cloned())
    }

    async fn find_by_partner(
        &self,
        partner_id: i64,
        partner_type: Option<i32>,
    ) -> Result<Vec<PartnerData>, RepositoryError> {
        let state = self.lock();
        Ok(state
            .rows
            .iter()
            .filter(|((pid, ptype, _, _), _)| {
                *pid == partner_id && partner_type.is_none_or(|t| t == *ptype)
            })
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn delete(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
    ) -> Result<bool, RepositoryError> {
        let key = Self::key(partner_id, partner_type, partner_detail_id, keyword);
        Ok(self.lock().rows.remove(&key).is_some())
    }

    async fn delete_by_partner(
        &self,
        partner_id: i64,
        partner_type: Option<i32>,
    ) -> Result<u64, RepositoryError> {
        let mut state = self.lock();
        let before = state.rows.len();
        state.rows.retain(|(pid, ptype, _, _), _| {
            !(*pid == partner_id && partner_type.is_none_or(|t| t == *ptype))
        });
        Ok((before - state.rows.len()) as u64)
    }

    async fn exists(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
    ) -> Result<bool, RepositoryError> {
        let key = Self::key(partner_id, partner_type, partner_detail_id, keyword);
        Ok(self.lock().rows.contains_key(&key))
    }

    async fn count(&self, partner_type: Option<i32>) -> Result<u64, RepositoryError> {
        let state = self.lock();
        Ok(state
            .rows
            .keys()
            .filter(|(_, ptype, _, _)| partner_type.is_none_or(|t| t == *ptype))
            .count() as u64)
    }

    async fn increment_occurrence(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
        increment: u32,
    ) -> Result<(), RepositoryError> {
        let key = Self::key(partner_id, partner_type, partner_detail_id, keyword);
        let mut state = self.lock();
        let updated = match state.rows.get(&key) {
            Some(existing) => existing.with_incremented_count(increment),
            None => PartnerData::with_count(
                partner_id,
                partner_type,
                partner_detail_id,
                keyword,
                i64::from(increment),
            )
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        };
        state.rows.insert(key, updated);
        Ok(())
    }

    async fn top_keywords(
        &self,
        limit: u32,
        partner_type: Option<i32>,
    ) -> Result<Vec<TopKeyword>, RepositoryError> {
        let state = self.lock();
        let mut totals: BTreeMap<String, (String, i64)> = BTreeMap::new();
        for ((_, ptype, _, data_key), row) in &state.rows {
            if partner_type.is_some_and(|t| t != *ptype) {
                continue;
            }
            let entry = totals
                .entry(data_key.clone())
                .or_insert_with(|| (row.data().to_string(), 0));
            entry.1 += row.occurrence_count();
        }

        let mut report: Vec<TopKeyword> = totals
            .into_values()
            .map(|(data, total_occurrences)| TopKeyword {
                data,
                total_occurrences,
            })
            .collect();
        report.sort_by(|a, b| {
            b.total_occurrences
                .cmp(&a.total_occurrences)
                .then_with(|| a.data.cmp(&b.data))
        });
        report.truncate(limit as usize);
        Ok(report)
    }
}
