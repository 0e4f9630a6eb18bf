use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;

pub type DbPool = Pool<Sqlite>;

/// Opens the keyword index database, creating file and schema on first
/// use.
pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA cache_size = -32000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    // NOCASE makes every keyword comparison (lookups, joins, grouping and
    // the unique index) case-insensitive at the storage layer.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS partner_keywords (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            partner_id INTEGER NOT NULL,
            partner_type INTEGER NOT NULL,
            partner_detail_id INTEGER NOT NULL DEFAULT 0,
            data TEXT NOT NULL COLLATE NOCASE,
            occurrence_count INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE (partner_id, partner_type, partner_detail_id, data)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_partner_keywords_data ON partner_keywords(data)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_partner_keywords_partner ON partner_keywords(partner_id, partner_type)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS partner_names (
            partner_id INTEGER NOT NULL,
            partner_type INTEGER NOT NULL,
            display_name TEXT NOT NULL,
            PRIMARY KEY (partner_id, partner_type)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_db_builds_schema() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_db(&dir.path().join("index.db")).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert!(names.contains(&"partner_keywords"));
        assert!(names.contains(&"partner_names"));
    }

    #[tokio::test]
    async fn create_db_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db");
        let pool = create_db(&path).await.unwrap();
        drop(pool);
        create_db(&path).await.unwrap();
    }

    #[tokio::test]
    async fn unique_index_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_db(&dir.path().join("index.db")).await.unwrap();

        sqlx::query(
            "INSERT INTO partner_keywords (partner_id, partner_type, partner_detail_id, data) VALUES (1, 1, 0, 'Walmart')",
        )
        .execute(&pool)
        .await
        .unwrap();
        let duplicate = sqlx::query(
            "INSERT INTO partner_keywords (partner_id, partner_type, partner_detail_id, data) VALUES (1, 1, 0, 'WALMART')",
        )
        .execute(&pool)
        .await;
        assert!(duplicate.is_err());
    }
}
