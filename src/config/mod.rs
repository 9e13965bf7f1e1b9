use std::env;

/// Runtime configuration for the uploader.
///
/// Built once at startup and handed to the components that need it.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// SQLite database URL (default: "sqlite://uploads.db?mode=rwc")
    pub database_url: String,

    /// Maximum pooled database connections (default: 8)
    pub db_max_connections: u32,

    /// Seconds a writer waits on a locked database before failing (default: 30)
    pub db_busy_timeout_secs: u64,

    /// AWS region (default: "us-east-1")
    pub s3_region: String,

    /// Custom endpoint for S3-compatible stores, e.g. MinIO
    pub s3_endpoint: Option<String>,

    /// Static access key for S3-compatible stores; the SDK default chain is
    /// used when either half is missing
    pub s3_access_key: Option<String>,
    pub s3_secret_key: Option<String>,

    /// Upper bound on files processed at once (default: 8)
    pub max_concurrent_uploads: usize,

    /// Read size used while hashing in bytes (default: 64 KB)
    pub hash_chunk_size: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://uploads.db?mode=rwc".to_string(),
            db_max_connections: 8,
            db_busy_timeout_secs: 30,
            s3_region: "us-east-1".to_string(),
            s3_endpoint: None,
            s3_access_key: None,
            s3_secret_key: None,
            max_concurrent_uploads: 8,
            hash_chunk_size: 64 * 1024,
        }
    }
}

impl TrackerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(default.db_max_connections),

            db_busy_timeout_secs: env::var("DB_BUSY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.db_busy_timeout_secs),

            s3_region: env::var("AWS_REGION").unwrap_or(default.s3_region),

            s3_endpoint: env::var("S3_ENDPOINT_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),

            s3_access_key: env::var("S3_ACCESS_KEY_ID").ok().filter(|v| !v.is_empty()),

            s3_secret_key: env::var("S3_SECRET_ACCESS_KEY")
                .ok()
                .filter(|v| !v.is_empty()),

            max_concurrent_uploads: env::var("MAX_CONCURRENT_UPLOADS")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(default.max_concurrent_uploads),

            hash_chunk_size: env::var("HASH_CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(default.hash_chunk_size),
        }
    }
}
