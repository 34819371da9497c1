//! Two-tier registry of description documents.
//!
//! A [`Registry`] keeps the last entry it resolved for every cache key in
//! process memory and falls back to its [`CacheAdapter`] only on an
//! in-process miss. Both tiers change together, through [`Registry::resolve`],
//! [`Registry::invalidate`] and [`Registry::invalidate_all`].
//!
//! Resolutions of the same key are not serialized: concurrent callers that
//! both find the entry stale each fetch it, and the last write wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use apimeta_cache::{
    CacheAction, CacheAdapter, CacheEntry, Clock, FreshnessPolicy, MemoryCache, ResponseHeaders,
    SystemClock, evaluate,
};
use apimeta_document::{Document, OperationProxy};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::RegistryConfig;
use crate::error::{ConfigError, Error, LookupError};
use crate::fetch::{Cached, DocumentFetcher};
use crate::lookup::{NestedDocument, Resolved};
use crate::transport::Transport;

/// Key suffix of the root document.
const META_KEY: &str = "meta_swagger_url";

/// Cache key of the root document for `prefix`.
pub fn root_key(prefix: &str) -> String {
    format!("{prefix}:app:{META_KEY}")
}

/// Cache key of a nested document referenced by `path`.
pub fn nested_key(prefix: &str, path: &str) -> String {
    format!("{prefix}:app:{path}")
}

/// Builder for [`Registry`].
pub struct RegistryBuilder {
    config: RegistryConfig,
    cache: Option<Arc<dyn CacheAdapter>>,
    transport: Option<Arc<dyn Transport>>,
    clock: Option<Arc<dyn Clock>>,
}

impl RegistryBuilder {
    pub fn cache(mut self, cache: Arc<dyn CacheAdapter>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the registry. Nothing is fetched until first use.
    ///
    /// Defaults: an in-memory cache, the system clock and, with the `http`
    /// feature, a `reqwest` transport.
    pub fn build(self) -> Result<Registry, ConfigError> {
        self.config.validate()?;
        let meta_url = self.config.meta_url()?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryCache::with_clock(Arc::clone(&clock))));
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport()?,
        };

        Ok(Registry {
            policy: self.config.policy(),
            root_key: root_key(&self.config.cache_prefix),
            fetcher: DocumentFetcher::new(transport, self.config.fallback_base_url.clone()),
            meta_url,
            config: self.config,
            cache,
            clock,
            state: Mutex::new(HashMap::new()),
        })
    }
}

#[cfg(feature = "http")]
fn default_transport() -> Result<Arc<dyn Transport>, ConfigError> {
    Ok(Arc::new(crate::http::HttpTransport::new()?))
}

#[cfg(not(feature = "http"))]
fn default_transport() -> Result<Arc<dyn Transport>, ConfigError> {
    Err(ConfigError::MissingTransport)
}

/// Resolves description documents through the cache, fetching when needed.
pub struct Registry {
    config: RegistryConfig,
    policy: FreshnessPolicy,
    meta_url: Url,
    root_key: String,
    cache: Arc<dyn CacheAdapter>,
    fetcher: DocumentFetcher,
    clock: Arc<dyn Clock>,
    /// In-process tier: last entry resolved per key
    state: Mutex<HashMap<String, CacheEntry>>,
}

impl Registry {
    pub fn builder(config: RegistryConfig) -> RegistryBuilder {
        RegistryBuilder {
            config,
            cache: None,
            transport: None,
            clock: None,
        }
    }

    /// Registry with default cache, clock and transport.
    pub fn new(config: RegistryConfig) -> Result<Self, ConfigError> {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn policy(&self) -> FreshnessPolicy {
        self.policy
    }

    pub fn root_key(&self) -> &str {
        &self.root_key
    }

    /// The root ("meta") document.
    pub fn root(&self) -> Result<Arc<Document>, Error> {
        self.resolve(&self.root_key, &self.meta_url)
    }

    /// Get an up-to-date document for `key`, fetching from `url` if needed.
    ///
    /// The configured datasource is appended to `url`.
    pub fn resolve(&self, key: &str, url: &Url) -> Result<Arc<Document>, Error> {
        let url = self.fetch_url(url);
        let entry = self.cached_entry(key);
        let action = evaluate(&entry, &self.policy, self.clock.now());
        debug!(key, ?action, "evaluated cached description");

        let etag = match action {
            CacheAction::UseCached => {
                if let Some(document) = &entry.document {
                    return Ok(Arc::clone(document));
                }
                None
            }
            CacheAction::Revalidate { if_none_match } => Some(if_none_match),
            CacheAction::Fetch => {
                if entry.document.is_some() {
                    // Neither expiry nor an etag can make this entry usable again
                    self.state().remove(key);
                    self.invalidate_backend(key);
                }
                None
            }
        };

        let cached = entry.document.as_ref().map(|document| Cached {
            document,
            etag: etag.as_deref(),
        });
        let fetched = self.fetcher.fetch(&url, cached)?;

        let stored_at = self.clock.now();
        let ttl = self.backend_ttl(&fetched.headers, stored_at);
        let document = Arc::clone(&fetched.document);
        self.store(
            key,
            CacheEntry::new(fetched.document, fetched.headers, self.policy.expiry_from(stored_at)),
            ttl,
        );
        Ok(document)
    }

    /// Look `name` up in the root document.
    ///
    /// Operations whose path contains the reference marker are resolved as
    /// nested documents under their own cache key.
    pub fn lookup(&self, name: &str) -> Result<Resolved, Error> {
        let root = self.root()?;
        let Some(op) = root.operation(name) else {
            return Err(LookupError::UnknownOperation(name.to_string()).into());
        };

        if !op.is_document_reference(&self.config.reference_marker) {
            return Ok(Resolved::Operation(OperationProxy::new(Arc::clone(&root), name)?));
        }

        let url = self.nested_url(&op.path).map_err(|e| LookupError::InvalidReference {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        let key = nested_key(&self.config.cache_prefix, &op.path);
        let document = self.resolve(&key, &url)?;
        Ok(Resolved::Document(NestedDocument {
            name: name.to_string(),
            key,
            url,
            document,
        }))
    }

    /// Callable proxy for an operation of the root document.
    pub fn operation(&self, name: &str) -> Result<OperationProxy, Error> {
        Ok(self.lookup(name)?.into_operation()?)
    }

    /// The nested document referenced by `name` in the root document.
    pub fn document(&self, name: &str) -> Result<NestedDocument, Error> {
        Ok(self.lookup(name)?.into_document()?)
    }

    /// Forget one key in both tiers.
    pub fn invalidate(&self, key: &str) {
        self.state().remove(key);
        self.invalidate_backend(key);
        info!(key, "invalidated description");
    }

    /// Invalidate the root and every document it references.
    ///
    /// One key is derived per operation of the root document currently known
    /// (in memory, else in the cache) under `prefix`, default the configured one. Nothing
    /// is fetched: with no known root only the root key is dropped. Returns
    /// the number of keys invalidated.
    pub fn invalidate_all(&self, prefix: Option<&str>) -> usize {
        let prefix = prefix.unwrap_or(&self.config.cache_prefix);
        let root = self.known_root();

        let mut count = 0;
        for op in root.iter().flat_map(|doc| doc.operations()) {
            self.invalidate_backend(&nested_key(prefix, &op.path));
            count += 1;
        }
        self.invalidate_backend(&self.root_key);
        self.state().clear();

        info!(prefix, keys = count + 1, "invalidated all descriptions");
        count + 1
    }

    /// URL of a nested document referenced by an operation path.
    ///
    /// Protocol-relative paths (`//host/...`) take the root URL's scheme,
    /// absolute URLs are used as is and anything else is joined onto the root URL.
    pub fn nested_url(&self, path: &str) -> Result<Url, url::ParseError> {
        if path.starts_with("//") {
            return Url::parse(&format!("{}:{}", self.meta_url.scheme(), path));
        }
        match Url::parse(path) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self.meta_url.join(path),
            Err(e) => Err(e),
        }
    }

    fn fetch_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        let datasource = &self.config.datasource;
        if !datasource.is_empty() && !url.query_pairs().any(|(k, _)| k == "datasource") {
            url.query_pairs_mut().append_pair("datasource", datasource);
        }
        url
    }

    fn state(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Entry for `key` from memory, else from the backend. Unreadable
    /// backend entries are dropped and reported as empty.
    fn cached_entry(&self, key: &str) -> CacheEntry {
        if let Some(entry) = self.state().get(key) {
            return entry.clone();
        }

        match self.cache.get(key) {
            Ok(Some(entry)) if entry.is_well_formed() => {
                if entry.document.is_some() {
                    self.state().insert(key.to_string(), entry.clone());
                }
                entry
            }
            Ok(Some(_)) => {
                warn!(key, "cached description has headers missing, dropping it");
                self.invalidate_backend(key);
                CacheEntry::empty()
            }
            Ok(None) => CacheEntry::empty(),
            Err(error) if error.is_corrupt() => {
                warn!(key, %error, "dropping corrupt cached description");
                self.invalidate_backend(key);
                CacheEntry::empty()
            }
            Err(error) => {
                warn!(key, %error, "cache read failed, treating as a miss");
                CacheEntry::empty()
            }
        }
    }

    /// Root document already known, without touching the network.
    fn known_root(&self) -> Option<Arc<Document>> {
        if let Some(entry) = self.state().get(&self.root_key) {
            return entry.document.clone();
        }
        self.cache
            .get(&self.root_key)
            .ok()
            .flatten()
            .and_then(|entry| entry.document)
    }

    fn store(&self, key: &str, entry: CacheEntry, ttl: Option<Duration>) {
        self.state().insert(key.to_string(), entry.clone());
        if let Err(error) = self.cache.set(key, entry, ttl) {
            warn!(key, %error, "failed to cache description");
        }
    }

    fn invalidate_backend(&self, key: &str) {
        if let Err(error) = self.cache.invalidate(key) {
            warn!(key, %error, "failed to invalidate cached description");
        }
    }

    /// Backend TTL for a freshly stored entry.
    ///
    /// Entries with an etag are kept until invalidated so they can be
    /// revalidated after going stale.
    fn backend_ttl(&self, headers: &ResponseHeaders, now: DateTime<Utc>) -> Option<Duration> {
        if headers.etag().is_some() {
            return None;
        }
        match self.policy.ttl() {
            Some(ttl) => Some(ttl),
            None => headers
                .time_left(now)
                .filter(|secs| *secs > 0)
                .map(|secs| Duration::from_secs(secs.unsigned_abs())),
        }
    }
}
