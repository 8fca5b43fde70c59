//! In-memory blob store for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::{ObjectStore, StorageError};

/// Test double keeping uploaded blobs in a map keyed by generated URL.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    counter: AtomicU64,
    /// When set, every upload fails — used to exercise the abort-before-DB
    /// guarantee.
    pub fail_uploads: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose uploads always fail.
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.objects.lock().expect("store lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a stored blob by its URL.
    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        self.objects.lock().expect("store lock").get(url).cloned()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        if self.fail_uploads {
            return Err(StorageError::Backend("simulated upload failure".into()));
        }
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let url = format!("memory://bucket/{n}/{filename}");
        self.objects
            .lock()
            .expect("store lock")
            .insert(url.clone(), bytes);
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<bool, StorageError> {
        Ok(self
            .objects
            .lock()
            .expect("store lock")
            .remove(url)
            .is_some())
    }
}
