//! Console configuration.
//!
//! Stored at `~/.config/fleetdesk/config.json`. Every field has a default, so
//! a missing or partial file is fine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::cache::{CacheScope, CacheTtl, SystemClock, DEFAULT_FRESH_SECS, DEFAULT_MAX_AGE_SECS};
use crate::resource::ClientOptions;

/// Application name used for config directory paths
const APP_NAME: &str = "fleetdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding `api_base_url`
pub const API_URL_ENV: &str = "FLEETDESK_API_URL";

/// Environment variable supplying the bearer token
pub const TOKEN_ENV: &str = "FLEETDESK_TOKEN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub fresh_secs: i64,
    pub max_age_secs: i64,
    pub scope: CacheScope,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fresh_secs: DEFAULT_FRESH_SECS,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            scope: CacheScope::default(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> CacheTtl {
        CacheTtl::from_secs(self.fresh_secs, self.max_age_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub cache: CacheConfig,
    pub last_email: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cache: CacheConfig::default(),
            last_email: None,
            log_dir: None,
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply environment overrides (`FLEETDESK_API_URL`).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
        self
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            ttl: self.cache.ttl(),
            scope: self.cache.scope,
            clock: Arc::new(SystemClock),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ListDefaults, QueryKey, ResourceCache};
    use chrono::Duration;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"last_email": "ops@example.com"}"#).expect("parse");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.cache, CacheConfig::default());
        assert_eq!(config.last_email.as_deref(), Some("ops@example.com"));
    }

    #[test]
    fn test_keyed_scope_and_ttl() {
        let config: Config = serde_json::from_str(
            r#"{"cache": {"fresh_secs": 60, "max_age_secs": 30, "scope": {"mode": "keyed", "capacity": 16}}}"#,
        )
        .expect("parse");
        assert_eq!(config.cache.scope, CacheScope::Keyed { capacity: 16 });

        let options = config.client_options();
        assert_eq!(options.ttl.fresh_for(), Duration::seconds(60));
        // max age never drops below the freshness window
        assert_eq!(options.ttl.max_age(), Duration::seconds(60));
    }

    #[test]
    fn test_huge_ttl_does_not_overflow_on_store() {
        let config: Config =
            serde_json::from_str(r#"{"cache": {"fresh_secs": 10000000000000}}"#).expect("parse");
        let options = config.client_options();
        let cache = ResourceCache::new("vehicles", options.ttl, options.scope);
        let key = QueryKey::canonical(&ListDefaults::none());
        cache.store(key.clone(), 1u32);
        assert!(cache.is_fresh(&key));
    }

    #[test]
    fn test_save_to_chosen_path_round_trips() {
        let dir = std::env::temp_dir().join(format!("fleetdesk-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.json");
        let config = Config {
            last_email: Some("ops@example.com".into()),
            ..Config::default()
        };
        config.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.last_email.as_deref(), Some("ops@example.com"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("fleetdesk-missing-config.json");
        let config = Config::load_from(&path).expect("load");
        assert_eq!(config.cache.fresh_secs, 300);
        assert_eq!(config.cache.max_age_secs, 600);
    }
}
