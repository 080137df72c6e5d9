//! Blob Store
//!
//! Object storage addressed by bucket and path. An upload returns the
//! object's public URL.

use async_trait::async_trait;
use reqwest::Method;

use super::http::RestClient;
use crate::ClientResult;

/// Bucket names
pub mod buckets {
    /// Sale and field visit photos
    pub const WARRANTY_IMAGES: &str = "warranty-images";
    pub const COMPLAINT_IMAGES: &str = "complaint-images";
    /// Printable warranty card templates
    pub const WARRANTY_TEMPLATES: &str = "warranty-templates";
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `bucket/path`, returning the public URL
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ClientResult<String>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Storage bucket client of the remote project
#[derive(Debug, Clone)]
pub struct StorageBucketClient {
    rest: RestClient,
}

impl StorageBucketClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl BlobStore for StorageBucketClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ClientResult<String> {
        let size = bytes.len();
        let request = self
            .rest
            .request(Method::POST, &self.rest.remote().object_url(bucket, path))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);
        self.rest.send_empty(request).await?;
        tracing::debug!(bucket, path, size, "Object uploaded");
        Ok(self.public_url(bucket, path))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.rest.remote().public_url(bucket, path)
    }
}
