//! Registry configuration.

use std::path::{Path, PathBuf};

use apimeta_cache::FreshnessPolicy;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::error::ConfigError;

/// The standard configuration filename.
pub const CONFIG_FILENAME: &str = "apimeta.toml";

pub const DEFAULT_META_URL: &str = "https://esi.evetech.net/swagger.json";
pub const DEFAULT_BASE_URL: &str = "https://esi.evetech.net";

/// Settings consumed by [`Registry`](crate::Registry).
///
/// ```toml
/// meta_url = "https://esi.evetech.net/swagger.json"
/// cache_prefix = "esipy"
/// cache_time = 86400     # or 0 to disable, or "headers"
/// datasource = "tranquility"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// URL of the root ("meta") description.
    pub meta_url: String,
    /// Prefix of every cache key.
    pub cache_prefix: String,
    /// `None` trusts the server's `Expires`, `0` disables caching, positive
    /// is a fixed number of seconds, negative falls back to one day.
    #[serde(deserialize_with = "deserialize_cache_time")]
    pub cache_time: Option<i64>,
    /// Appended as `?datasource=...` to every description URL. Empty to omit.
    pub datasource: String,
    /// Operation paths containing this marker reference nested documents.
    pub reference_marker: String,
    /// Base URL for documents that declare no server.
    pub fallback_base_url: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            meta_url: DEFAULT_META_URL.to_string(),
            cache_prefix: "esipy".to_string(),
            cache_time: Some(apimeta_cache::DEFAULT_CACHE_SECONDS as i64),
            datasource: "tranquility".to_string(),
            reference_marker: "swagger.json".to_string(),
            fallback_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl RegistryConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Find the configuration file by searching upward from the given directory.
    pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
        let mut current = start_dir.to_path_buf();
        loop {
            let config_path = current.join(CONFIG_FILENAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    pub fn policy(&self) -> FreshnessPolicy {
        FreshnessPolicy::from_seconds(self.cache_time)
    }

    pub fn meta_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.meta_url).map_err(|source| ConfigError::InvalidUrl {
            field: "meta_url",
            source,
        })
    }

    /// Check the URLs without building a registry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.meta_url()?;
        Url::parse(&self.fallback_base_url).map_err(|source| ConfigError::InvalidUrl {
            field: "fallback_base_url",
            source,
        })?;
        Ok(())
    }
}

/// `cache_time` is an integer or the string `"headers"` (TOML has no null).
fn deserialize_cache_time<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Seconds(i64),
        Keyword(String),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Repr::Seconds(s)) => Ok(Some(s)),
        Some(Repr::Keyword(k)) if k == "headers" => Ok(None),
        Some(Repr::Keyword(k)) => Err(serde::de::Error::custom(format!(
            "expected seconds or \"headers\", found \"{k}\""
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::from_toml_str("").unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(config.policy(), FreshnessPolicy::Fixed(86400));
        config.validate().unwrap();
    }

    #[test]
    fn test_cache_time_values() {
        let config = RegistryConfig::from_toml_str("cache_time = \"headers\"").unwrap();
        assert_eq!(config.cache_time, None);
        assert_eq!(config.policy(), FreshnessPolicy::Headers);

        let config = RegistryConfig::from_toml_str("cache_time = 0").unwrap();
        assert_eq!(config.policy(), FreshnessPolicy::Disabled);

        let config = RegistryConfig::from_toml_str("cache_time = -10").unwrap();
        assert_eq!(config.policy(), FreshnessPolicy::Fixed(86400));

        assert!(RegistryConfig::from_toml_str("cache_time = \"forever\"").is_err());
    }

    #[test]
    fn test_overrides_and_unknown_fields() {
        let config = RegistryConfig::from_toml_str(
            "meta_url = \"https://api.example.com/meta.json\"\ncache_prefix = \"app\"\ndatasource = \"\"",
        )
        .unwrap();
        assert_eq!(config.cache_prefix, "app");
        assert_eq!(config.meta_url().unwrap().host_str(), Some("api.example.com"));
        assert!(config.datasource.is_empty());

        assert!(RegistryConfig::from_toml_str("cache_dir = \"/tmp\"").is_err());
    }

    #[test]
    fn test_invalid_url() {
        let config = RegistryConfig {
            meta_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { field: "meta_url", .. })
        ));
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        let found = RegistryConfig::find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILENAME));
    }
}
