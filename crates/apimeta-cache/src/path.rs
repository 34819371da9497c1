//! Cache path computation.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// SHA256 of a cache key as lowercase hex.
pub fn key_hash(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Convert a cache key to its file path.
///
/// Keys contain `:` and `/`, so the file is named after the key hash, with
/// 2-level directory sharding to prevent directory overcrowding:
/// `{hash[0:2]}/{hash[2:4]}/{hash}.json`
pub fn key_to_cache_path(key: &str, cache_dir: &Path) -> PathBuf {
    let hash = key_hash(key);
    cache_dir
        .join(&hash[0..2])
        .join(&hash[2..4])
        .join(format!("{hash}.json"))
}

/// Get the lock file path for a cache file.
pub fn lock_path(cache_path: &Path) -> PathBuf {
    let mut lock = cache_path.as_os_str().to_owned();
    lock.push(".lock");
    PathBuf::from(lock)
}
