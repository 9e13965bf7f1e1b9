use crate::error::TrackerError;
use async_trait::async_trait;
use aws_credential_types::provider::error::CredentialsError;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{ObjectCannedAcl, ServerSideEncryption};
use std::path::Path;

/// Service error codes that mean the request was not authenticated.
const AUTH_ERROR_CODES: &[&str] = &[
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
    "InvalidClientTokenId",
    "MissingAuthenticationToken",
    "AuthorizationHeaderMalformed",
];

/// Write-time options applied to every object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    pub server_side_encryption: String,
    pub acl: String,
}

impl PutOptions {
    /// AES256 at rest, private canned ACL.
    pub fn private_encrypted() -> Self {
        Self {
            server_side_encryption: "AES256".to_string(),
            acl: "private".to_string(),
        }
    }
}

impl Default for PutOptions {
    fn default() -> Self {
        Self::private_encrypted()
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes the file at `path` to `bucket/key`. One attempt, no retry.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        options: &PutOptions,
    ) -> Result<(), TrackerError>;
}

pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        options: &PutOptions,
    ) -> Result<(), TrackerError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| TrackerError::io(path, std::io::Error::other(e)))?;

        let res = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .server_side_encryption(ServerSideEncryption::from(
                options.server_side_encryption.as_str(),
            ))
            .acl(ObjectCannedAcl::from(options.acl.as_str()))
            .send()
            .await;

        if let Err(e) = res {
            tracing::debug!(
                "S3 put_object failed: bucket={}, key={}, error={:?}",
                bucket,
                key,
                e
            );
            return Err(classify_sdk_error(key, e));
        }
        Ok(())
    }
}

/// Maps an SDK failure onto the auth / upload split.
fn classify_sdk_error<E, R>(key: &str, err: SdkError<E, R>) -> TrackerError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    if let Some(service_err) = err.as_service_error() {
        let code = service_err.code().unwrap_or("Unknown");
        let message = service_err.message().unwrap_or("No message");
        if is_auth_error_code(code) {
            return TrackerError::Auth(format!("{}: {}", code, message));
        }
        return TrackerError::Upload {
            key: key.to_string(),
            reason: format!("{}: {}", code, message),
        };
    }

    let reason = DisplayErrorContext(&err).to_string();
    if credentials_error_in_chain(&err).is_some() {
        TrackerError::Auth(reason)
    } else {
        TrackerError::Upload {
            key: key.to_string(),
            reason,
        }
    }
}

pub fn is_auth_error_code(code: &str) -> bool {
    AUTH_ERROR_CODES.contains(&code)
}

/// Credential provider failures never reach the service; the request fails
/// before dispatch with the provider's error somewhere in the source chain.
fn credentials_error_in_chain<'a>(
    err: &'a (dyn std::error::Error + 'static),
) -> Option<&'a CredentialsError> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(creds) = e.downcast_ref::<CredentialsError>() {
            return Some(creds);
        }
        current = e.source();
    }
    None
}
