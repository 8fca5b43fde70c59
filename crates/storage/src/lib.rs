//! Blob storage for uploaded restoration images and attachments.
//!
//! The workflow system treats file storage as a content-addressable blob
//! store: `upload(bytes) -> url`, `delete(url) -> bool`. [`ObjectStore`] is
//! the seam; [`S3Store`] talks to any S3-compatible endpoint (MinIO in dev),
//! and [`MemoryStore`] backs tests without network access.

pub mod memory;
pub mod s3;

pub use memory::MemoryStore;
pub use s3::{S3Store, StorageConfig};

/// Error type for blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The underlying S3/MinIO call failed.
    #[error("Object storage error: {0}")]
    Backend(String),

    /// The given URL does not point into this store's bucket.
    #[error("URL does not belong to this store: {0}")]
    ForeignUrl(String),
}

/// Abstract blob store consumed by the API layer.
///
/// Uploads happen *before* any database write; a failed upload must abort the
/// whole operation. A blob orphaned by a later failed commit is never
/// referenced and is eligible for out-of-band cleanup.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under a fresh object key, returning the public URL.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Delete the object behind `url`. Returns `false` if the URL did not
    /// resolve to an object (already gone, or foreign).
    async fn delete(&self, url: &str) -> Result<bool, StorageError>;
}
