use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Folds a reader into a SHA-256 digest, `chunk_size` bytes at a time.
pub async fn calculate_hash_from_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    chunk_size: usize,
) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];
    loop {
        let n = reader.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Hex SHA-256 of a file's full content. Memory use is bounded by `chunk_size`.
pub async fn calculate_file_hash(path: &Path, chunk_size: usize) -> std::io::Result<String> {
    let file = tokio::fs::File::open(path).await?;
    calculate_hash_from_reader(file, chunk_size).await
}
