use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use apimeta::cache::{CacheAdapter, FsCache, MemoryCache, NoCache, default_cache_dir};
use apimeta::{OperationProxy, Registry, RegistryConfig};
use clap::ValueEnum;
use tracing::debug;

/// Where resolved descriptions are kept between calls.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// On disk, shared across invocations
    Fs,
    /// For this invocation only
    Memory,
    /// Never stored; every lookup hits the network
    None,
}

#[derive(clap::Args)]
pub struct GlobalArgs {
    /// Configuration file (default: apimeta.toml in the current or a parent directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// URL of the root description
    #[arg(long, global = true, env = "APIMETA_META_URL")]
    pub meta_url: Option<String>,

    /// Seconds to trust a description, 0 to disable, or "headers" to use Expires
    #[arg(long, global = true, value_parser = parse_cache_time)]
    pub cache_time: Option<CacheTime>,

    /// Prefix of cache keys
    #[arg(long, global = true)]
    pub cache_prefix: Option<String>,

    /// Cache backend
    #[arg(long, global = true, value_enum, default_value_t = Backend::Fs)]
    pub cache: Backend,

    /// Directory of the fs backend
    #[arg(long, global = true, env = "APIMETA_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parsed `--cache-time`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheTime(pub Option<i64>);

pub fn parse_cache_time(s: &str) -> Result<CacheTime, String> {
    if s.eq_ignore_ascii_case("headers") {
        return Ok(CacheTime(None));
    }
    s.parse::<i64>()
        .map(|secs| CacheTime(Some(secs)))
        .map_err(|_| format!("expected seconds or \"headers\", found \"{s}\""))
}

/// Parse a `key=value` request parameter.
pub fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, found \"{s}\"")),
    }
}

impl GlobalArgs {
    /// Configuration file merged with flag and environment overrides.
    pub fn load_config(&self) -> anyhow::Result<RegistryConfig> {
        let path = match &self.config {
            Some(path) => Some(path.clone()),
            None => {
                let current_dir = std::env::current_dir().context("Failed to get current directory")?;
                RegistryConfig::find_config_file(&current_dir)
            }
        };

        let mut config = match path {
            Some(path) => RegistryConfig::load(&path)
                .with_context(|| format!("Error loading {}", path.display()))?,
            None => RegistryConfig::default(),
        };

        if let Some(meta_url) = &self.meta_url {
            config.meta_url = meta_url.clone();
        }
        if let Some(CacheTime(cache_time)) = self.cache_time {
            config.cache_time = cache_time;
        }
        if let Some(prefix) = &self.cache_prefix {
            config.cache_prefix = prefix.clone();
        }
        Ok(config)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(default_cache_dir)
    }

    pub fn cache_adapter(&self) -> Arc<dyn CacheAdapter> {
        match self.cache {
            Backend::Fs => Arc::new(FsCache::new(self.cache_dir())),
            Backend::Memory => Arc::new(MemoryCache::new()),
            Backend::None => Arc::new(NoCache),
        }
    }

    pub fn registry(&self) -> anyhow::Result<Registry> {
        let config = self.load_config()?;
        debug!(meta_url = %config.meta_url, backend = ?self.cache, "building registry");
        Ok(Registry::builder(config).cache(self.cache_adapter()).build()?)
    }
}

/// Proxy for `operation`, in the root description or in the nested one named `document`.
pub fn find_operation(
    registry: &Registry,
    operation: &str,
    document: Option<&str>,
) -> anyhow::Result<OperationProxy> {
    match document {
        Some(document) => Ok(registry.document(document)?.operation(operation)?),
        None => Ok(registry.operation(operation)?),
    }
}
