use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single file's upload pipeline.
///
/// Every variant is caught at the per-file boundary and reported; none of
/// them aborts the rest of a batch.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Credentials missing or rejected: {0}")]
    Auth(String),

    #[error("Upload of {key} failed: {reason}")]
    Upload { key: String, reason: String },

    #[error("Metadata store error: {0}")]
    Store(#[from] sea_orm::DbErr),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl TrackerError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TrackerError::Io {
            path: path.into(),
            source,
        }
    }

    /// Short label used in console output.
    pub fn kind(&self) -> &'static str {
        match self {
            TrackerError::Io { .. } => "IOError",
            TrackerError::Auth(_) => "AuthError",
            TrackerError::Upload { .. } => "UploadError",
            TrackerError::Store(_) => "StoreError",
            TrackerError::InvalidInput(_) => "InvalidInput",
        }
    }
}
