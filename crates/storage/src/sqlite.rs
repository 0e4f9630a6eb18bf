use socius_core::partner::PartnerData;
use socius_engine::repository::{PartnerDataRepository, RawMatch, RepositoryError, TopKeyword};

use crate::db::DbPool;

/// SQLite-backed keyword index. The pool is cheap to clone, so the
/// repository is too.
#[derive(Clone)]
pub struct SqlitePartnerRepository {
    pool: DbPool,
}

impl SqlitePartnerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Registers the display name search results should carry for a
    /// partner. Names are host-application master data, kept in a side
    /// table beside the index.
    pub async fn set_partner_name(
        &self,
        partner_id: i64,
        partner_type: i32,
        name: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO partner_names (partner_id, partner_type, display_name) \
             VALUES (?, ?, ?) \
             ON CONFLICT (partner_id, partner_type) \
             DO UPDATE SET display_name = excluded.display_name",
        )
        .bind(partner_id)
        .bind(partner_type)
        .bind(name.trim())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }
}

fn storage_err(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            RepositoryError::Connection(err.to_string())
        }
        _ => RepositoryError::Query(err.to_string()),
    }
}

type KeywordRow = (i64, i32, i64, String, i64);

fn to_partner_data(row: KeywordRow) -> Result<PartnerData, RepositoryError> {
    let (partner_id, partner_type, partner_detail_id, data, occurrence_count) = row;
    PartnerData::with_count(partner_id, partner_type, partner_detail_id, &data, occurrence_count)
        .map_err(|e| RepositoryError::Query(format!("corrupt index row: {e}")))
}

impl PartnerDataRepository for SqlitePartnerRepository {
    async fn search_by_keywords(
        &self,
        keywords: &[String],
        partner_type: Option<i32>,
        limit: u32,
    ) -> Result<Vec<RawMatch>, RepositoryError> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; keywords.len()].join(", ");
        let mut sql = format!(
            "SELECT pk.partner_id, pk.partner_type, pk.partner_detail_id, pn.display_name, \
                    GROUP_CONCAT(pk.data) AS matched_keywords, \
                    SUM(pk.occurrence_count) AS total_score, \
                    COUNT(pk.data) AS keyword_count \
             FROM partner_keywords pk \
             LEFT JOIN partner_names pn \
               ON pn.partner_id = pk.partner_id AND pn.partner_type = pk.partner_type \
             WHERE pk.data IN ({placeholders})"
        );
        if partner_type.is_some() {
            sql.push_str(" AND pk.partner_type = ?");
        }
        sql.push_str(
            " GROUP BY pk.partner_id, pk.partner_type, pk.partner_detail_id \
             ORDER BY keyword_count DESC, total_score DESC \
             LIMIT ?",
        );

        let mut query =
            sqlx::query_as::<_, (i64, i32, i64, Option<String>, String, i64, i64)>(&sql);
        for keyword in keywords {
            query = query.bind(keyword.trim());
        }
        if let Some(partner_type) = partner_type {
            query = query.bind(partner_type);
        }
        let rows = query
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(rows
            .into_iter()
            .map(
                |(partner_id, partner_type, partner_detail_id, name, matched, total, count)| {
                    RawMatch {
                        partner_id,
                        partner_type,
                        partner_detail_id,
                        partner_name: name,
                        matched_keywords: matched,
                        total_score: total,
                        keyword_count: count.max(0) as u32,
                    }
                },
            )
            .collect())
    }

    async fn save(&self, row: &PartnerData) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO partner_keywords \
                 (partner_id, partner_type, partner_detail_id, data, occurrence_count) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (partner_id, partner_type, partner_detail_id, data) \
             DO UPDATE SET occurrence_count = excluded.occurrence_count",
        )
        .bind(row.partner_id())
        .bind(row.partner_type())
        .bind(row.partner_detail_id())
        .bind(row.data())
        .bind(row.occurrence_count())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn find(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
    ) -> Result<Option<PartnerData>, RepositoryError> {
        let row = sqlx::query_as::<_, KeywordRow>(
            "SELECT partner_id, partner_type, partner_detail_id, data, occurrence_count \
             FROM partner_keywords \
             WHERE partner_id = ? AND partner_type = ? AND partner_detail_id = ? AND data = ?",
        )
        .bind(partner_id)
        .bind(partner_type)
        .bind(partner_detail_id)
        .bind(keyword.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(to_partner_data).transpose()
    }

    async fn find_by_partner(
        &self,
        partner_id: i64,
        partner_type: Option<i32>,
    ) -> Result<Vec<PartnerData>, RepositoryError> {
        let mut sql = String::from(
            "SELECT partner_id, partner_type, partner_detail_id, data, occurrence_count \
             FROM partner_keywords WHERE partner_id = ?",
        );
        if partner_type.is_some() {
            sql.push_str(" AND partner_type = ?");
        }
        sql.push_str(" ORDER BY partner_type, partner_detail_id, data");

        let mut query = sqlx::query_as::<_, KeywordRow>(&sql).bind(partner_id);
        if let Some(partner_type) = partner_type {
            query = query.bind(partner_type);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(storage_err)?;

        rows.into_iter().map(to_partner_data).collect()
    }

    async fn delete(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM partner_keywords \
             WHERE partner_id = ? AND partner_type = ? AND partner_detail_id = ? AND data = ?",
        )
        .bind(partner_id)
        .bind(partner_type)
        .bind(partner_detail_id)
        .bind(keyword.trim())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_partner(
        &self,
        partner_id: i64,
        partner_type: Option<i32>,
    ) -> Result<u64, RepositoryError> {
        let mut sql = String::from("DELETE FROM partner_keywords WHERE partner_id = ?");
        if partner_type.is_some() {
            sql.push_str(" AND partner_type = ?");
        }

        let mut query = sqlx::query(&sql).bind(partner_id);
        if let Some(partner_type) = partner_type {
            query = query.bind(partner_type);
        }
        let result = query.execute(&self.pool).await.map_err(storage_err)?;

        Ok(result.rows_affected())
    }

    async fn exists(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
    ) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM partner_keywords \
             WHERE partner_id = ? AND partner_type = ? AND partner_detail_id = ? AND data = ?",
        )
        .bind(partner_id)
        .bind(partner_type)
        .bind(partner_detail_id)
        .bind(keyword.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(count > 0)
    }

    async fn count(&self, partner_type: Option<i32>) -> Result<u64, RepositoryError> {
        let count: i64 = match partner_type {
            Some(partner_type) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM partner_keywords WHERE partner_type = ?")
                    .bind(partner_type)
                    .fetch_one(&self.pool)
                    .await
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM partner_keywords")
                    .fetch_one(&self.pool)
                    .await
            }
        }
        .map_err(storage_err)?;

        Ok(count.max(0) as u64)
    }

    async fn increment_occurrence(
        &self,
        partner_id: i64,
        partner_type: i32,
        partner_detail_id: i64,
        keyword: &str,
        increment: u32,
    ) -> Result<(), RepositoryError> {
        // Single upsert statement, so concurrent increments serialize
        // inside SQLite and none is lost.
        sqlx::query(
            "INSERT INTO partner_keywords \
                 (partner_id, partner_type, partner_detail_id, data, occurrence_count) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (partner_id, partner_type, partner_detail_id, data) \
             DO UPDATE SET occurrence_count = occurrence_count + excluded.occurrence_count",
        )
        .bind(partner_id)
        .bind(partner_type)
        .bind(partner_detail_id)
        .bind(keyword.trim())
        .bind(i64::from(increment))
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn top_keywords(
        &self,
        limit: u32,
        partner_type: Option<i32>,
    ) -> Result<Vec<TopKeyword>, RepositoryError> {
        let mut sql = String::from(
            "SELECT data, SUM(occurrence_count) AS total_occurrences FROM partner_keywords",
        );
        if partner_type.is_some() {
            sql.push_str(" WHERE partner_type = ?");
        }
        sql.push_str(" GROUP BY data ORDER BY total_occurrences DESC, data ASC LIMIT ?");

        let mut query = sqlx::query_as::<_, (String, i64)>(&sql);
        if let Some(partner_type) = partner_type {
            query = query.bind(partner_type);
        }
        let rows = query
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(rows
            .into_iter()
            .map(|(data, total_occurrences)| TopKeyword {
                data,
                total_occurrences,
            })
            .collect())
    }
}
