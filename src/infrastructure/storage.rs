use crate::config::TrackerConfig;
use crate::services::storage::S3ObjectStore;
use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use aws_sdk_s3::config::{Credentials, Region};
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the S3 client once.
///
/// Static keys from the config win; otherwise credentials come from the SDK
/// default chain. Retries are off so each put is a single attempt.
pub async fn setup_storage(config: &TrackerConfig) -> Arc<S3ObjectStore> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.s3_region.clone()))
        .retry_config(RetryConfig::disabled());
    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    if let (Some(access_key), Some(secret_key)) = (&config.s3_access_key, &config.s3_secret_key) {
        let creds = Credentials::new(access_key, secret_key, None, None, "static");
        loader = loader.credentials_provider(creds);
    }
    let aws_config = loader.load().await;

    if aws_config.credentials_provider().is_none() {
        warn!("🔑 No AWS credentials provider configured, uploads will fail");
    }

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.s3_endpoint.is_some())
        .build();

    match &config.s3_endpoint {
        Some(endpoint) => info!("☁️  S3 Storage: {} (Region: {})", endpoint, config.s3_region),
        None => info!("☁️  S3 Storage: AWS (Region: {})", config.s3_region),
    }

    Arc::new(S3ObjectStore::new(aws_sdk_s3::Client::from_conf(s3_config)))
}
