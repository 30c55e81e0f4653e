//! In-memory blob store and bundle cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use storage::{BlobStore, BundleCache, CacheRecord};
use truth_common::{TruthError, TruthResult};

/// HashMap-backed blob store.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Bytes>>,
    fail_puts: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent put fail with a storage error.
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, path: &str, data: Bytes) -> TruthResult<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(TruthError::Storage(format!(
                "Failed to write {}: injected failure",
                path
            )));
        }
        self.objects.lock().unwrap().insert(path.to_string(), data);
        Ok(())
    }

    async fn get(&self, path: &str) -> TruthResult<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| TruthError::Storage(format!("Failed to read {}: not found", path)))
    }

    async fn exists(&self, path: &str) -> TruthResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(path))
    }
}

/// HashMap-backed bundle cache with first-writer-wins puts.
#[derive(Default)]
pub struct MemoryBundleCache {
    entries: Mutex<HashMap<String, CacheRecord>>,
}

impl MemoryBundleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, request_id: &str) -> bool {
        self.entries.lock().unwrap().contains_key(request_id)
    }

    /// Direct snapshot of a stored record, for assertions.
    pub fn record(&self, request_id: &str) -> Option<CacheRecord> {
        self.entries.lock().unwrap().get(request_id).cloned()
    }
}

#[async_trait]
impl BundleCache for MemoryBundleCache {
    async fn get(&self, request_id: &str) -> TruthResult<Option<CacheRecord>> {
        Ok(self.entries.lock().unwrap().get(request_id).cloned())
    }

    async fn put(&self, request_id: &str, record: &CacheRecord) -> TruthResult<()> {
        self.entries
            .lock()
            .unwrap()
            .entry(request_id.to_string())
            .or_insert_with(|| record.clone());
        Ok(())
    }
}
