use crate::entities::UploadRecord;
use crate::error::TrackerError;
use crate::models::NewUploadRecord;
use crate::services::metadata_store::MetadataStore;
use crate::services::storage::{ObjectStore, PutOptions};
use crate::utils::hash::calculate_file_hash;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// `prefix/file_name`, or just `file_name` when the prefix is empty.
pub fn derive_remote_key(prefix: &str, file_name: &str) -> String {
    if prefix.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", prefix, file_name)
    }
}

/// Runs one file through hash, remote write and metadata upsert.
pub struct ObjectUploader {
    storage: Arc<dyn ObjectStore>,
    metadata: MetadataStore,
    put_options: PutOptions,
    hash_chunk_size: usize,
}

impl ObjectUploader {
    pub fn new(
        storage: Arc<dyn ObjectStore>,
        metadata: MetadataStore,
        hash_chunk_size: usize,
    ) -> Self {
        Self {
            storage,
            metadata,
            put_options: PutOptions::private_encrypted(),
            hash_chunk_size,
        }
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub async fn upload(
        &self,
        path: &Path,
        bucket: &str,
        prefix: &str,
    ) -> Result<UploadRecord, TrackerError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                TrackerError::io(
                    path,
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
                )
            })?;
        let remote_key = derive_remote_key(prefix, &file_name);

        let content_hash = calculate_file_hash(path, self.hash_chunk_size)
            .await
            .map_err(|e| TrackerError::io(path, e))?;

        self.storage
            .put_object(bucket, &remote_key, path, &self.put_options)
            .await?;

        let record = self
            .metadata
            .upsert(NewUploadRecord {
                file_name: file_name.clone(),
                bucket_name: bucket.to_string(),
                s3_prefix: prefix.to_string(),
                remote_key: remote_key.clone(),
                content_hash,
                uploaded_at: Utc::now(),
            })
            .await?;

        info!("✅ Uploaded {} to s3://{}/{}", file_name, bucket, remote_key);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_key_with_prefix() {
        assert_eq!(derive_remote_key("backups", "a.txt"), "backups/a.txt");
    }

    #[test]
    fn test_remote_key_without_prefix() {
        assert_eq!(derive_remote_key("", "a.txt"), "a.txt");
    }

    #[test]
    fn test_remote_key_keeps_nested_prefix() {
        assert_eq!(derive_remote_key("2024/q1", "data.csv"), "2024/q1/data.csv");
    }
}
