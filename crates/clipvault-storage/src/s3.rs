use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::{Attribute, Attributes, ObjectStore, PutMultipartOpts, WriteMultipart};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncReadExt;

/// Chunk size for multipart uploads. Keeps memory bounded regardless of
/// payload size.
const UPLOAD_CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// Maximum number of chunks in flight per upload.
const MAX_CONCURRENT_CHUNKS: usize = 4;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Build AmazonS3 object store from environment and explicit settings.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }
}

/// Public URL for an S3 object.
///
/// AWS buckets use the virtual-hosted-style format; S3-compatible providers
/// with a custom endpoint use path-style for compatibility.
fn format_public_url(
    bucket: &str,
    region: &str,
    endpoint_url: Option<&str>,
    key: &str,
) -> String {
    match endpoint_url {
        Some(endpoint) => {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, bucket, key)
        }
        None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key),
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload_file(
        &self,
        key: &str,
        local_path: &Path,
        content_type: &str,
    ) -> StorageResult<()> {
        let location = ObjectPath::from(key);
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let opts = PutMultipartOpts {
            attributes,
            ..Default::default()
        };

        let upload = self
            .store
            .put_multipart_opts(&location, opts)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        let mut writer = WriteMultipart::new_with_chunk_size(upload, UPLOAD_CHUNK_SIZE);

        let mut file = tokio::fs::File::open(local_path).await?;
        let mut buffer = vec![0u8; 64 * 1024];
        let mut size_bytes = 0u64;

        loop {
            let read = file.read(&mut buffer).await?;
            if read == 0 {
                break;
            }
            size_bytes += read as u64;
            writer
                .wait_for_capacity(MAX_CONCURRENT_CHUNKS)
                .await
                .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
            writer.write(&buffer[..read]);
        }

        writer.finish().await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn presigned_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let location = ObjectPath::from(key);
        let url = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(url.to_string())
    }

    fn public_url(&self, key: &str) -> String {
        format_public_url(
            &self.bucket,
            &self.region,
            self.endpoint_url.as_deref(),
            key,
        )
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let location = ObjectPath::from(key);

        self.store.delete(&location).await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(bucket = %self.bucket, key = %key, "S3 delete successful");

        Ok(())
    }
}
