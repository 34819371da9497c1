//! Caching for API description documents.
//!
//! This crate provides the storage seam ([`CacheAdapter`]) and the pure
//! freshness logic ([`evaluate`]) used by the apimeta registry.
//!
//! # Module Organization
//!
//! - **Core types** (always available): [`CacheEntry`], [`ResponseHeaders`],
//!   [`FreshnessPolicy`], [`CacheAction`], [`MemoryCache`], [`NoCache`]
//! - **Native I/O** (requires `native` feature): [`FsCache`]
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use apimeta_cache::{CacheAction, CacheEntry, FreshnessPolicy, SystemClock, Clock, evaluate};
//!
//! let now = SystemClock.now();
//! let policy = FreshnessPolicy::from_seconds(Some(300));
//! assert_eq!(evaluate(&CacheEntry::empty(), &policy, now), CacheAction::Fetch);
//! assert_eq!(policy.ttl(), Some(Duration::from_secs(300)));
//! ```

// Core types (pure computation, always available)
mod adapter;
mod clock;
mod entry;
mod error;
mod freshness;
mod headers;

pub use adapter::{CacheAdapter, MemoryCache, NoCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use error::CacheError;
pub use freshness::{CacheAction, DEFAULT_CACHE_SECONDS, FreshnessPolicy, evaluate};
pub use headers::{ResponseHeaders, http_date};

// Native I/O (requires filesystem)
#[cfg(feature = "native")]
mod fs;
#[cfg(feature = "native")]
mod path;

#[cfg(feature = "native")]
pub use fs::{FsCache, default_cache_dir};
#[cfg(feature = "native")]
pub use path::{key_hash, key_to_cache_path, lock_path};
