use crate::config::TrackerConfig;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, SqlxSqliteConnector, Statement};
use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const CREATE_UPLOADS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS uploads (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        file_name TEXT NOT NULL,
        bucket_name TEXT NOT NULL,
        s3_prefix TEXT NOT NULL,
        s3_key TEXT NOT NULL UNIQUE,
        file_hash TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        allowed_users TEXT NOT NULL DEFAULT ''
    )";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "file_name",
    "bucket_name",
    "s3_prefix",
    "s3_key",
    "file_hash",
    "timestamp",
    "allowed_users",
];

/// Opens the SQLite pool in WAL mode and makes sure the `uploads` table exists.
pub async fn setup_database(config: &TrackerConfig) -> anyhow::Result<DatabaseConnection> {
    info!("📂 Database: {}", config.database_url);

    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(config.db_busy_timeout_secs))
        .log_statements(log::LevelFilter::Debug);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;

    let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

/// Creates the `uploads` table if missing and checks that an existing one
/// has every column the entity maps. Safe to run any number of times.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();

    db.execute(Statement::from_string(backend, CREATE_UPLOADS_TABLE))
        .await?;

    let rows = db
        .query_all(Statement::from_string(backend, "PRAGMA table_info(uploads)"))
        .await?;
    let mut present = Vec::with_capacity(rows.len());
    for row in rows {
        present.push(row.try_get::<String>("", "name")?);
    }

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !present.iter().any(|p| p == col))
        .collect();
    if !missing.is_empty() {
        return Err(DbErr::Custom(format!(
            "uploads table schema mismatch, missing columns: {}",
            missing.join(", ")
        )));
    }

    tracing::debug!("   - Table 'uploads' checked/created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(dir: &tempfile::TempDir) -> TrackerConfig {
        TrackerConfig {
            database_url: format!("sqlite://{}", dir.path().join("uploads.db").display()),
            ..TrackerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup_database(&config_for(&dir)).await.unwrap();
        run_migrations(&db).await.unwrap();
        run_migrations(&db).await.unwrap();
    }

    #[tokio::test]
    async fn test_database_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup_database(&config_for(&dir)).await.unwrap();
        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                "PRAGMA journal_mode",
            ))
            .await
            .unwrap()
            .unwrap();
        let mode: String = row.try_get_by_index(0).unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_foreign_table_layout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup_database(&config_for(&dir)).await.unwrap();
        let backend = db.get_database_backend();
        db.execute(Statement::from_string(backend, "DROP TABLE uploads"))
            .await
            .unwrap();
        db.execute(Statement::from_string(
            backend,
            "CREATE TABLE uploads (id INTEGER PRIMARY KEY, s3_key TEXT)",
        ))
        .await
        .unwrap();

        let err = run_migrations(&db).await.unwrap_err();
        assert!(err.to_string().contains("file_hash"));
    }
}
