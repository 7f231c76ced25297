use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::storage::{object_key, FileStore, StoredFile, UploadKind};

/// S3-backed file store (MinIO locally, AWS in production).
#[derive(Clone)]
pub struct S3FileStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3FileStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        S3FileStore {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl FileStore for S3FileStore {
    async fn store(
        &self,
        kind: UploadKind,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<StoredFile, AppError> {
        let ext = crate::storage::extension_for(content_type)
            .ok_or_else(|| AppError::Storage(format!("unmapped content type {content_type}")))?;
        let key = object_key(kind, ext);
        let size = bytes.len() as u64;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Stored upload at s3://{}/{}", self.bucket, key);

        let filename = key.rsplit('/').next().unwrap_or(&key).to_string();
        Ok(StoredFile {
            filename,
            path: key,
            size,
        })
    }
}
