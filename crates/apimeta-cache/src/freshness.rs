//! Freshness evaluation for cached documents.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::CacheEntry;

/// Cache time used when a negative value is configured (1 day).
pub const DEFAULT_CACHE_SECONDS: u64 = 86400;

/// How long a cached document may be served without asking the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "seconds", rename_all = "snake_case")]
pub enum FreshnessPolicy {
    /// Trust the server's `Expires` header.
    Headers,
    /// Never serve from cache without a round trip. A known entity tag can
    /// still turn that round trip into a 304.
    Disabled,
    /// Serve from cache for a fixed number of seconds, ignoring headers.
    Fixed(u64),
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        FreshnessPolicy::Fixed(DEFAULT_CACHE_SECONDS)
    }
}

impl FreshnessPolicy {
    /// Map a configured cache time: `None` trusts headers, `0` disables,
    /// positive is a fixed time and negative falls back to the default.
    pub fn from_seconds(seconds: Option<i64>) -> Self {
        match seconds {
            None => FreshnessPolicy::Headers,
            Some(0) => FreshnessPolicy::Disabled,
            Some(s) if s > 0 => FreshnessPolicy::Fixed(s.unsigned_abs()),
            Some(_) => FreshnessPolicy::default(),
        }
    }

    /// The fixed cache time, if this policy has one.
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            FreshnessPolicy::Fixed(s) => Some(Duration::from_secs(*s)),
            _ => None,
        }
    }

    /// Deadline to record for an entry stored at `now`.
    pub fn expiry_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.ttl()?.as_secs()).ok()?;
        now.checked_add_signed(chrono::TimeDelta::try_seconds(secs)?)
    }
}

/// What to do with a cached entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action")]
pub enum CacheAction {
    /// No usable cache, fetch fresh.
    #[serde(rename = "fetch")]
    Fetch,
    /// Cache is fresh, use it directly.
    #[serde(rename = "use_cached")]
    UseCached,
    /// Cache is stale but carries an entity tag, try a conditional request.
    #[serde(rename = "revalidate")]
    Revalidate {
        /// If-None-Match header value (ETag).
        if_none_match: String,
    },
}

impl CacheAction {
    pub fn is_cached(&self) -> bool {
        matches!(self, CacheAction::UseCached)
    }
}

/// Decide how to treat `entry` at time `now`.
pub fn evaluate(entry: &CacheEntry, policy: &FreshnessPolicy, now: DateTime<Utc>) -> CacheAction {
    let (Some(_), Some(headers)) = (&entry.document, &entry.headers) else {
        return CacheAction::Fetch;
    };

    let fresh = match policy {
        FreshnessPolicy::Headers => headers.expires().is_some_and(|expires| expires >= now),
        FreshnessPolicy::Disabled => false,
        FreshnessPolicy::Fixed(_) => entry.expires_at.is_some_and(|deadline| now < deadline),
    };
    if fresh {
        return CacheAction::UseCached;
    }

    match headers.etag() {
        Some(etag) => CacheAction::Revalidate {
            if_none_match: etag.to_string(),
        },
        None => CacheAction::Fetch,
    }
}
