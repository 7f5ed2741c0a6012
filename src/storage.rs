use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;

#[async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    /// Writes `bytes` under `key`, replacing any object already stored there.
    async fn put_object(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: Option<String>,
    ) -> Result<()>;

    async fn delete_object(&self, key: &str) -> Result<()>;

    /// Public URL the object is served from once uploaded.
    fn object_url(&self, key: &str) -> String;
}

pub struct S3Storage {
    client: S3Client,
    bucket: String,
    public_url: String,
}

impl S3Storage {
    pub fn new(
        client: S3Client,
        bucket: impl Into<String>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            public_url: public_url.into(),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put_object(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: Option<String>,
    ) -> Result<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes));

        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .context("failed to upload object to S3")?;

        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("failed to delete object from S3")?;
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        public_object_url(&self.public_url, &self.bucket, key)
    }
}

pub fn public_object_url(base: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), bucket, key)
}
