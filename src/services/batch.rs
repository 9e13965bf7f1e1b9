use crate::entities::UploadRecord;
use crate::services::uploader::ObjectUploader;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug)]
pub struct FailedUpload {
    pub path: PathBuf,
    /// Error label, e.g. "IOError".
    pub kind: &'static str,
    pub reason: String,
}

/// Per-file outcomes of one batch. Order follows completion, not input.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub uploaded: Vec<UploadRecord>,
    pub failed: Vec<FailedUpload>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.uploaded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }
}

/// Fans a file list out over at most `max_concurrent` uploads at a time.
pub struct BatchCoordinator {
    uploader: Arc<ObjectUploader>,
    max_concurrent: usize,
}

impl BatchCoordinator {
    pub fn new(uploader: Arc<ObjectUploader>, max_concurrent: usize) -> Self {
        Self {
            uploader,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Uploads every path. A failing file is reported and skipped; it never
    /// stops the others.
    pub async fn run(&self, paths: Vec<PathBuf>, bucket: &str, prefix: &str) -> BatchReport {
        info!(
            "📦 Uploading {} file(s) to s3://{}/{} with {} worker(s)",
            paths.len(),
            bucket,
            prefix,
            self.max_concurrent
        );

        // Each item is spawned so pipelines run in parallel on the runtime;
        // the stream only starts a new one when a slot frees up.
        let outcomes: Vec<Result<UploadRecord, FailedUpload>> =
            futures::stream::iter(paths.into_iter().map(|path| {
                let uploader = self.uploader.clone();
                let bucket = bucket.to_string();
                let prefix = prefix.to_string();
                let task_path = path.clone();
                let handle = tokio::spawn(async move {
                    uploader.upload(&task_path, &bucket, &prefix).await
                });
                async move {
                    match handle.await {
                        Ok(Ok(record)) => Ok(record),
                        Ok(Err(e)) => {
                            error!("❌ Error uploading {}: {}", path.display(), e);
                            Err(FailedUpload {
                                path,
                                kind: e.kind(),
                                reason: e.to_string(),
                            })
                        }
                        Err(join_err) => {
                            error!("❌ Upload task for {} aborted: {}", path.display(), join_err);
                            Err(FailedUpload {
                                path,
                                kind: "UploadError",
                                reason: join_err.to_string(),
                            })
                        }
                    }
                }
            }))
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut report = BatchReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(record) => report.uploaded.push(record),
                Err(failed) => report.failed.push(failed),
            }
        }

        self.uploader.metadata().release_idle_locks();
        report
    }
}
