//! File-system cache backend.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::adapter::CacheAdapter;
use crate::clock::{Clock, SystemClock};
use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::path::{key_to_cache_path, lock_path};

/// Get the default cache directory.
///
/// Override with `$APIMETA_CACHE_DIR`.
pub fn default_cache_dir() -> PathBuf {
    std::env::var("APIMETA_CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            directories::ProjectDirs::from("dev", "apimeta", "apimeta")
                .map(|p| p.cache_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".cache/apimeta"))
                .join("documents")
        })
}

/// On-disk layout of one entry.
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    /// Full key, checked on read
    key: String,
    stored_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    evict_at: Option<DateTime<Utc>>,
    entry: CacheEntry,
}

/// File-system based cache: one JSON file per key.
pub struct FsCache {
    cache_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FsCache {
    /// Create a new FsCache with the given cache directory.
    pub fn new(cache_dir: PathBuf) -> Self {
        Self::with_clock(cache_dir, Arc::new(SystemClock))
    }

    pub fn with_clock(cache_dir: PathBuf, clock: Arc<dyn Clock>) -> Self {
        Self { cache_dir, clock }
    }

    /// Get the cache directory path.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Acquire an exclusive lock on a cache entry.
    fn lock(&self, cache_path: &Path) -> Result<FileLock, CacheError> {
        let lock_file_path = lock_path(cache_path);

        if let Some(parent) = lock_file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_file = File::create(&lock_file_path)?;
        if lock_file.try_lock_exclusive().is_err() {
            tracing::debug!(path = %lock_file_path.display(), "waiting for cache lock");
            lock_file.lock_exclusive()?;
        }

        Ok(FileLock {
            _file: lock_file,
            path: lock_file_path,
        })
    }

    /// Keys of all stored entries.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys = Vec::new();
        if !self.cache_dir.exists() {
            return Ok(keys);
        }

        for entry in walkdir::WalkDir::new(&self.cache_dir)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            // Unreadable files are skipped; `get` reports them per key
            if let Ok(content) = fs::read_to_string(path)
                && let Ok(stored) = serde_json::from_str::<StoredEntry>(&content)
            {
                keys.push(stored.key);
            }
        }

        keys.sort();
        Ok(keys)
    }

    /// Remove all cached entries.
    pub fn clean(&self) -> Result<(), CacheError> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }
}

/// RAII guard for file lock.
struct FileLock {
    _file: File,
    path: PathBuf,
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Lock is released when the file is dropped
        let _ = fs::remove_file(&self.path);
    }
}

impl CacheAdapter for FsCache {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let cache_path = key_to_cache_path(key, &self.cache_dir);

        let content = match fs::read_to_string(&cache_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredEntry =
            serde_json::from_str(&content).map_err(|e| CacheError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        if stored.key != key {
            return Err(CacheError::Corrupt {
                key: key.to_string(),
                reason: format!("file holds key {}", stored.key),
            });
        }

        if stored.evict_at.is_some_and(|at| self.clock.now() >= at) {
            self.invalidate(key)?;
            return Ok(None);
        }

        Ok(Some(stored.entry))
    }

    fn set(&self, key: &str, entry: CacheEntry, ttl: Option<Duration>) -> Result<(), CacheError> {
        let cache_path = key_to_cache_path(key, &self.cache_dir);
        let _lock = self.lock(&cache_path)?;

        let now = self.clock.now();
        let stored = StoredEntry {
            key: key.to_string(),
            stored_at: now,
            evict_at: ttl
                .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
                .and_then(|ttl| now.checked_add_signed(ttl)),
            entry,
        };

        // `lock` created the parent directory
        let dir = cache_path.parent().unwrap_or(&self.cache_dir);
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut temp, &stored)?;
        temp.flush()?;
        temp.persist(&cache_path)?;

        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let cache_path = key_to_cache_path(key, &self.cache_dir);
        if !cache_path.exists() {
            return Ok(());
        }

        let _lock = self.lock(&cache_path)?;
        match fs::remove_file(&cache_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
