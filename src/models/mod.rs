use chrono::{DateTime, Utc};

/// Values handed to the metadata store after a successful remote write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUploadRecord {
    pub file_name: String,
    pub bucket_name: String,
    pub s3_prefix: String,
    pub remote_key: String,
    pub content_hash: String,
    pub uploaded_at: DateTime<Utc>,
}
