//! Content-addressed dataset cache.
//!
//! Parsed datasets are keyed by the SHA-256 of the file bytes, so a renamed
//! or copied file with identical content is a hit and an edited file is
//! always a miss. The cache is owned by the caller; the analytics core knows
//! nothing about it.

use anyhow::{Context, Result};
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::{fingerprint, Dataset};

/// Default number of datasets kept in memory.
pub const DEFAULT_CAPACITY: usize = 8;

/// Hit/miss counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

/// Bounded LRU of parsed datasets.
pub struct DatasetCache {
    inner: Mutex<LruCache<String, Arc<Dataset>>>,
    stats: Mutex<CacheStats>,
}

impl DatasetCache {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(cap)),
            stats: Mutex::new(CacheStats {
                capacity: cap.get(),
                ..Default::default()
            }),
        }
    }

    /// Return the cached parse of this file's content, parsing on a miss.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<Dataset>> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let key = fingerprint(&bytes);

        let cached = self.inner.lock().get(&key).cloned();
        if let Some(hit) = cached {
            self.stats.lock().hits += 1;
            debug!(path = %path.display(), fingerprint = %key, "Dataset cache hit");
            return Ok(hit);
        }

        let dataset = Arc::new(
            Dataset::from_bytes(&bytes)
                .with_context(|| format!("Failed to parse {}", path.display()))?,
        );
        let mut inner = self.inner.lock();
        inner.put(key, dataset.clone());

        let mut stats = self.stats.lock();
        stats.misses += 1;
        stats.entries = inner.len();
        debug!(path = %path.display(), entries = stats.entries, "Dataset cache miss");
        Ok(dataset)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
        self.stats.lock().entries = 0;
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_identical_content_hits() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.csv", "Source,Target\nx,y\n");
        let b = write(dir.path(), "b.csv", "Source,Target\nx,y\n");

        let cache = DatasetCache::new(4);
        let first = cache.get_or_load(&a).unwrap();
        let second = cache.get_or_load(&b).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[test]
    fn test_changed_content_misses() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "edges.csv", "Source,Target\nx,y\n");
        let cache = DatasetCache::default();
        let before = cache.get_or_load(&path).unwrap();

        std::fs::write(&path, "Source,Target\nx,z\n").unwrap();
        let after = cache.get_or_load(&path).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_capacity_evicts_least_recent() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.csv", "Source,Target\na,b\n");
        let b = write(dir.path(), "b.csv", "Source,Target\nc,d\n");

        let cache = DatasetCache::new(1);
        cache.get_or_load(&a).unwrap();
        cache.get_or_load(&b).unwrap();
        cache.get_or_load(&a).unwrap();
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (0, 3, 1));

        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        assert_eq!(DatasetCache::new(0).stats().capacity, 1);
    }
}
