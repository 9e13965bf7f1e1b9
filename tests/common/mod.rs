#![allow(dead_code)]

use async_trait::async_trait;
use s3_upload_tracker::TrackerError;
use s3_upload_tracker::config::TrackerConfig;
use s3_upload_tracker::infrastructure::database;
use s3_upload_tracker::services::metadata_store::MetadataStore;
use s3_upload_tracker::services::storage::{ObjectStore, PutOptions};
use s3_upload_tracker::services::uploader::ObjectUploader;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub options: PutOptions,
}

/// In-memory object store that can be told to fail specific keys.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    failing_keys: Mutex<HashSet<String>>,
    reject_credentials: Mutex<bool>,
    attempts: Mutex<Vec<String>>,
}

impl MemoryObjectStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_key(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn reject_credentials(&self) {
        *self.reject_credentials.lock().unwrap() = true;
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        options: &PutOptions,
    ) -> Result<(), TrackerError> {
        self.attempts.lock().unwrap().push(key.to_string());

        if *self.reject_credentials.lock().unwrap() {
            return Err(TrackerError::Auth(
                "InvalidAccessKeyId: The AWS Access Key Id you provided does not exist".to_string(),
            ));
        }
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(TrackerError::Upload {
                key: key.to_string(),
                reason: "simulated transport error".to_string(),
            });
        }

        let body = tokio::fs::read(path)
            .await
            .map_err(|e| TrackerError::io(path, e))?;
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                options: options.clone(),
            },
        );
        Ok(())
    }
}

/// A temp directory holding both the SQLite file and the input files.
pub struct TestEnv {
    pub dir: TempDir,
    pub metadata: MetadataStore,
    pub storage: Arc<MemoryObjectStore>,
    pub uploader: Arc<ObjectUploader>,
}

impl TestEnv {
    pub fn write_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }
}

pub async fn setup_test_env() -> TestEnv {
    let _ = tracing_subscriber::fmt::try_init();
    let dir = tempfile::tempdir().unwrap();

    let config = TrackerConfig {
        database_url: format!("sqlite://{}", dir.path().join("uploads.db").display()),
        db_max_connections: 16,
        ..TrackerConfig::default()
    };
    let db = database::setup_database(&config).await.unwrap();
    let metadata = MetadataStore::new(db);
    let storage = MemoryObjectStore::new();
    let uploader = Arc::new(ObjectUploader::new(
        storage.clone(),
        metadata.clone(),
        config.hash_chunk_size,
    ));

    TestEnv {
        dir,
        metadata,
        storage,
        uploader,
    }
}
