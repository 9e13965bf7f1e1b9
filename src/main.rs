use clap::Parser;
use dotenvy::dotenv;
use s3_upload_tracker::config::TrackerConfig;
use s3_upload_tracker::infrastructure::{database, storage};
use s3_upload_tracker::services::batch::BatchCoordinator;
use s3_upload_tracker::services::metadata_store::MetadataStore;
use s3_upload_tracker::services::uploader::ObjectUploader;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "upload",
    author,
    version,
    about = "Upload files to S3 with a specified prefix.",
    long_about = None
)]
struct Args {
    /// Destination bucket
    #[arg(long = "bucket_name")]
    bucket_name: String,

    /// S3 prefix to organize files
    #[arg(long)]
    prefix: String,

    /// Files to upload
    #[arg(required = true, num_args = 1..)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "s3_upload_tracker=info,upload=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = TrackerConfig::from_env();
    info!(
        "🚀 Starting upload: bucket={}, prefix='{}', files={}, workers={}",
        args.bucket_name,
        args.prefix,
        args.files.len(),
        config.max_concurrent_uploads
    );

    let db = database::setup_database(&config).await?;
    let storage_service = storage::setup_storage(&config).await;

    let metadata = MetadataStore::new(db);
    let uploader = Arc::new(ObjectUploader::new(
        storage_service,
        metadata,
        config.hash_chunk_size,
    ));
    let coordinator = BatchCoordinator::new(uploader, config.max_concurrent_uploads);

    let report = coordinator
        .run(args.files, &args.bucket_name, &args.prefix)
        .await;

    if report.failure_count() > 0 {
        warn!(
            "⚠️  Finished with {} uploaded, {} failed",
            report.success_count(),
            report.failure_count()
        );
    } else {
        info!("👋 Finished: {} file(s) uploaded", report.success_count());
    }

    Ok(())
}
