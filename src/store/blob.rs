use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use chrono::{DateTime, Utc};

use super::StoreError;

/// A time-limited fetch URL for a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchUrl {
    pub url: String,
    /// When the URL stops working, if the store knows.
    pub valid_until: Option<DateTime<Utc>>,
}

/// Storage for image files, addressed by opaque path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the bytes at the given path, replacing any existing object.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// A fetch URL for the object at the given path.
    async fn get_url(&self, path: &str) -> Result<FetchUrl, StoreError>;

    /// Remove the object at the given path. Removing a missing object is
    /// a no-op.
    async fn remove(&self, path: &str) -> Result<(), StoreError>;
}

/// S3-backed blob store. Fetch URLs are presigned GET requests; presigning
/// does not check that the object exists.
pub struct S3BlobStore {
    client: S3Client,
    bucket_name: String,
    url_ttl: Duration,
}

impl S3BlobStore {
    pub fn new(client: S3Client, bucket_name: impl Into<String>, url_ttl: Duration) -> Self {
        S3BlobStore {
            client,
            bucket_name: bucket_name.into(),
            url_ttl,
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(path)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StoreError::Service(format!("S3 put_object error: {}", e)))?;

        Ok(())
    }

    async fn get_url(&self, path: &str) -> Result<FetchUrl, StoreError> {
        let config = PresigningConfig::expires_in(self.url_ttl)
            .map_err(|e| StoreError::Service(format!("S3 presigning config error: {}", e)))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(path)
            .presigned(config)
            .await
            .map_err(|e| StoreError::Service(format!("S3 presign error: {}", e)))?;

        let ttl = chrono::Duration::seconds(self.url_ttl.as_secs() as i64);
        Ok(FetchUrl {
            url: presigned.uri().to_string(),
            valid_until: Some(Utc::now() + ttl),
        })
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(path)
            .send()
            .await
            .map_err(|e| StoreError::Service(format!("S3 delete_object error: {}", e)))?;

        Ok(())
    }
}
