//! S3-compatible blob store (MinIO in development, S3 in production).

use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::{ObjectStore, StorageError};

/// Configuration for the S3/MinIO object store, loaded from environment
/// variables.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Endpoint host:port, e.g. `localhost:9000`.
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Use https when constructing the endpoint and public URLs.
    pub secure: bool,
}

impl StorageConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var             | Default          |
    /// |---------------------|------------------|
    /// | `MINIO_ENDPOINT`    | `localhost:9000` |
    /// | `MINIO_ACCESS_KEY`  | `minioadmin`     |
    /// | `MINIO_SECRET_KEY`  | `minioadmin`     |
    /// | `MINIO_BUCKET`      | `mural-files`    |
    /// | `MINIO_SECURE`      | `false`          |
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "localhost:9000".into()),
            access_key: std::env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".into()),
            secret_key: std::env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".into()),
            bucket: std::env::var("MINIO_BUCKET").unwrap_or_else(|_| "mural-files".into()),
            secure: std::env::var("MINIO_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }
}

/// Blob store backed by an S3-compatible service.
pub struct S3Store {
    client: Client,
    config: StorageConfig,
}

impl S3Store {
    /// Build a client for the configured endpoint and ensure the bucket
    /// exists (MinIO does not auto-create buckets).
    pub async fn connect(config: StorageConfig) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "muralis-static",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .endpoint_url(format!("{}://{}", config.scheme(), config.endpoint))
            .credentials_provider(credentials)
            .region(Region::new("us-east-1"))
            // MinIO serves buckets under the path, not as subdomains.
            .force_path_style(true)
            .behavior_version_latest()
            .build();

        let client = Client::from_conf(s3_config);
        let store = Self { client, config };
        store.ensure_bucket().await?;
        Ok(store)
    }

    async fn ensure_bucket(&self) -> Result<(), StorageError> {
        let exists = self
            .client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .is_ok();
        if !exists {
            self.client
                .create_bucket()
                .bucket(&self.config.bucket)
                .send()
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            tracing::info!(bucket = %self.config.bucket, "Created storage bucket");
        }
        Ok(())
    }

    /// Public URL for an object key.
    fn object_url(&self, key: &str) -> String {
        format!(
            "{}://{}/{}/{}",
            self.config.scheme(),
            self.config.endpoint,
            self.config.bucket,
            key
        )
    }

    /// Extract the object key from a URL produced by [`Self::object_url`].
    fn key_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let marker = format!("/{}/", self.config.bucket);
        url.split_once(&marker).map(|(_, key)| key)
    }
}

/// Build a fresh object key: date-partitioned, UUID-prefixed, original
/// extension preserved so content types survive a re-serve.
fn make_object_key(filename: &str, now: chrono::DateTime<chrono::Utc>) -> String {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    format!(
        "{}/{}{}",
        now.format("%Y/%m/%d"),
        uuid::Uuid::new_v4(),
        ext
    )
}

#[async_trait::async_trait]
impl ObjectStore for S3Store {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let key = make_object_key(filename, chrono::Utc::now());
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        tracing::debug!(key = %key, size, "Uploaded object");
        Ok(self.object_url(&key))
    }

    async fn delete(&self, url: &str) -> Result<bool, StorageError> {
        let Some(key) = self.key_from_url(url) else {
            return Ok(false);
        };
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(true)
    }
}
