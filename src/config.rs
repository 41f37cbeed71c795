//! Configuration with embedded defaults
//!
//! Every tunable lives in a `config_struct!` definition so the field, its
//! type and its default are declared once. The on-disk format is pretty
//! JSON; a missing file is created with defaults on first load.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default config file path, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "coinfeed.json";

/// Define a configuration struct with embedded defaults
///
/// Generates the struct with public fields, a `Default` implementation with
/// the declared values, and serde support with `#[serde(default)]` so
/// partial config files deserialize cleanly.
///
/// ```rust,ignore
/// config_struct! {
///     pub struct GatewayConfig {
///         cache_ttl_secs: u64 = 30,
///         enabled: bool = true,
///     }
/// }
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }
    };
}

config_struct! {
    /// Gateway tunables
    ///
    /// The pacing, TTL and retry defaults are sized for a free-tier upstream
    /// allowing roughly one request per second.
    pub struct GatewayConfig {
        /// Upstream market-data API root
        base_url: String = "https://api.coingecko.com/api/v3".to_string(),
        /// Demo/pro API key, sent as x-cg-demo-api-key when non-empty
        api_key: String = String::new(),
        /// Quote currency for prices and history
        vs_currency: String = "usd".to_string(),
        /// Seconds a cached response stays servable
        cache_ttl_secs: u64 = 30,
        /// Minimum gap between two upstream dispatches (milliseconds)
        min_request_interval_ms: u64 = 1100,
        /// Attempts per request before giving up
        max_attempts: u32 = 3,
        /// Base delay for exponential backoff (milliseconds)
        retry_base_delay_ms: u64 = 2000,
        /// Per-request HTTP timeout (seconds)
        request_timeout_secs: u64 = 20,
        /// Master switch; a disabled gateway rejects every operation
        enabled: bool = true,
    }
}

impl GatewayConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
}

impl Config {
    /// Load from a JSON file; a missing file is created with defaults
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            let default_config = Self::default();
            default_config.save(path)?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.gateway.base_url.is_empty() {
            return Err(anyhow::anyhow!("gateway.base_url must not be empty"));
        }
        if self.gateway.max_attempts == 0 {
            return Err(anyhow::anyhow!("gateway.max_attempts must be at least 1"));
        }
        if self.gateway.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "gateway.request_timeout_secs must be greater than zero"
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.gateway.cache_ttl_secs, 30);
        assert_eq!(config.gateway.min_request_interval_ms, 1100);
        assert_eq!(config.gateway.max_attempts, 3);
        assert_eq!(config.gateway.retry_base_delay_ms, 2000);
        assert!(config.gateway.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coinfeed.json");
        let path_str = path.to_str().unwrap();

        let config = Config::load(path_str).unwrap();
        assert!(path.exists());
        assert_eq!(config.gateway.max_attempts, 3);

        // Second load reads the file that was just written
        let reloaded = Config::load(path_str).unwrap();
        assert_eq!(reloaded.gateway.base_url, config.gateway.base_url);
    }

    #[test]
    fn partial_file_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(
            &path,
            r#"{ "gateway": { "cache_ttl_secs": 5, "api_key": "test-key" } }"#,
        )
        .unwrap();

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.gateway.cache_ttl_secs, 5);
        assert_eq!(config.gateway.api_key, "test-key");
        assert_eq!(config.gateway.min_request_interval_ms, 1100);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = Config::default();
        config.gateway.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gateway.base_url = String::new();
        assert!(config.validate().is_err());
    }
}
