use crate::entities::{UploadRecord, prelude::*, uploads};
use crate::error::TrackerError;
use crate::infrastructure::database::run_migrations;
use crate::models::NewUploadRecord;
use crate::utils::keyed_mutex::KeyedMutex;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Durable table of upload records, keyed by remote key.
///
/// Cloning is cheap; clones share the connection pool, the per-key locks and
/// the schema check.
#[derive(Clone)]
pub struct MetadataStore {
    db: DatabaseConnection,
    key_locks: KeyedMutex,
    schema_ready: Arc<OnceCell<()>>,
}

impl MetadataStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            key_locks: KeyedMutex::new(),
            schema_ready: Arc::new(OnceCell::new()),
        }
    }

    /// Creates the table on first use. Concurrent callers wait on the same
    /// initialization; a failed attempt is retried by the next caller.
    pub async fn ensure_schema(&self) -> Result<(), DbErr> {
        self.schema_ready
            .get_or_try_init(|| run_migrations(&self.db))
            .await?;
        Ok(())
    }

    /// Inserts a record for an unseen key, or refreshes `content_hash` and
    /// `uploaded_at` of the existing one. Every other column of an existing
    /// row is left as it was.
    pub async fn upsert(&self, record: NewUploadRecord) -> Result<UploadRecord, TrackerError> {
        self.ensure_schema().await?;

        let _guard = self.key_locks.lock(&record.remote_key).await;
        let remote_key = record.remote_key.clone();

        let active = uploads::ActiveModel {
            file_name: Set(record.file_name),
            bucket_name: Set(record.bucket_name),
            s3_prefix: Set(record.s3_prefix),
            remote_key: Set(record.remote_key),
            content_hash: Set(record.content_hash),
            uploaded_at: Set(record.uploaded_at),
            ..Default::default()
        };

        // Hash and timestamp change in one statement, so readers never see
        // one without the other.
        Uploads::insert(active)
            .on_conflict(
                OnConflict::column(uploads::Column::RemoteKey)
                    .update_columns([uploads::Column::ContentHash, uploads::Column::UploadedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        let stored = self
            .find_by_remote_key(&remote_key)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("upload record for {}", remote_key)))?;

        tracing::debug!(
            "📝 Recorded {} (id={}, hash={})",
            stored.remote_key,
            stored.id,
            stored.content_hash
        );
        Ok(stored)
    }

    pub async fn find_by_remote_key(
        &self,
        remote_key: &str,
    ) -> Result<Option<UploadRecord>, DbErr> {
        self.ensure_schema().await?;
        Uploads::find()
            .filter(uploads::Column::RemoteKey.eq(remote_key))
            .one(&self.db)
            .await
    }

    /// All records in insertion order.
    pub async fn list(&self) -> Result<Vec<UploadRecord>, DbErr> {
        self.ensure_schema().await?;
        Uploads::find()
            .order_by_asc(uploads::Column::Id)
            .all(&self.db)
            .await
    }

    /// Replaces the principals allowed to access `remote_key`.
    ///
    /// Returns `false` when no record exists for the key. Names containing a
    /// comma are rejected before the database is touched. The upload path
    /// never calls this.
    pub async fn set_allowed_users(
        &self,
        remote_key: &str,
        users: &[String],
    ) -> Result<bool, TrackerError> {
        if let Some(bad) = users.iter().find(|u| u.contains(',')) {
            return Err(TrackerError::InvalidInput(format!(
                "principal '{}' must not contain a comma",
                bad
            )));
        }
        let joined = users
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .collect::<Vec<_>>()
            .join(",");

        self.ensure_schema().await?;
        let _guard = self.key_locks.lock(remote_key).await;

        let res = Uploads::update_many()
            .col_expr(uploads::Column::AllowedUsers, Expr::value(joined))
            .filter(uploads::Column::RemoteKey.eq(remote_key))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    /// Forgets per-key locks nobody holds. Call between batches.
    pub fn release_idle_locks(&self) {
        self.key_locks.cleanup();
    }
}
