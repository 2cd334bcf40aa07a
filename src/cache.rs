//! Persistent route cache keyed by segment content address.
//!
//! Entries are never evicted. Every write persists the whole map as one JSON
//! blob through a [`CacheStore`]; storage problems are logged and otherwise
//! ignored, the in-memory map stays authoritative for the session.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::CacheError;
use crate::key::SegmentKey;
use crate::segment::ResolvedSegment;
use crate::traits::CacheStore;

/// Storage namespace of the cache blob.
pub const CACHE_NAMESPACE: &str = "osrm_route_cache";

pub struct RouteCache {
    entries: HashMap<SegmentKey, ResolvedSegment>,
    store: Box<dyn CacheStore>,
}

impl RouteCache {
    /// Rebuilds the cache from `store`, starting empty if the blob is
    /// missing, unreadable or corrupt.
    pub fn load(store: impl CacheStore + 'static) -> Self {
        let entries = match store.load() {
            Ok(Some(blob)) => match serde_json::from_str(&blob) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(error = %err, "route cache blob is corrupt, starting empty");
                    HashMap::new()
                }
            },
            Ok(None) => HashMap::new(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read route cache, starting empty");
                HashMap::new()
            }
        };
        tracing::debug!(entries = entries.len(), "route cache loaded");

        Self {
            entries,
            store: Box::new(store),
        }
    }

    pub fn get(&self, key: &SegmentKey) -> Option<&ResolvedSegment> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &SegmentKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or replaces the entry for `key`, then persists the full map.
    pub fn put(&mut self, key: SegmentKey, segment: ResolvedSegment) {
        self.entries.insert(key, segment);
        self.persist();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(CacheError::from)
            .and_then(|blob| self.store.save(&blob));
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to persist route cache");
        }
    }
}

/// Stores the cache blob in a JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/osrm_route_cache.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", CACHE_NAMESPACE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for FileStore {
    fn load(&self) -> Result<Option<String>, CacheError> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    fn save(&self, blob: &str) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, blob)?;
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }
}

/// Keeps the blob in memory only; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded with an existing blob.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
        }
    }

    pub fn blob(&self) -> Option<String> {
        self.blob.lock().clone()
    }
}

impl CacheStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, CacheError> {
        Ok(self.blob.lock().clone())
    }

    fn save(&self, blob: &str) -> Result<(), CacheError> {
        *self.blob.lock() = Some(blob.to_string());
        Ok(())
    }
}

impl<T: CacheStore + ?Sized> CacheStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<String>, CacheError> {
        (**self).load()
    }

    fn save(&self, blob: &str) -> Result<(), CacheError> {
        (**self).save(blob)
    }
}
