//! Configuration management for the scraper.
//!
//! Settings come from built-in defaults, an optional TOML file, and finally
//! environment variables (highest precedence).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::{PricePolicy, DEFAULT_OPERATOR};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "busplus.toml";

/// Default checkout site.
pub const DEFAULT_BASE_URL: &str = "https://checkout.busplus.com.ar";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Error types for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Outbound fetch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub base_url: String,
    /// None = default browser UA, "impersonate" = random browser UA, else custom.
    pub user_agent: Option<String>,
    pub accept_language: String,
    pub timeout_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: None,
            accept_language: "es-AR,es;q=0.9".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Result cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub capacity: usize,
    /// Serialize concurrent identical queries instead of fetching for each.
    pub dedupe_in_flight: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            capacity: 50,
            dedupe_in_flight: false,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    /// Allowed CORS origins; `*` allows any.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            allowed_origins: vec!["*".to_string()],
        }
    }
}

impl ServerSettings {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fetch: FetchSettings,
    pub cache: CacheSettings,
    pub price: PricePolicy,
    pub server: ServerSettings,
    /// Operator name used when a record does not name one.
    pub fallback_operator: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            cache: CacheSettings::default(),
            price: PricePolicy::default(),
            server: ServerSettings::default(),
            fallback_operator: DEFAULT_OPERATOR.to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text; missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file, the default file if present, or defaults.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILENAME);
                default.exists().then_some(default)
            }
        };

        let mut settings = match path {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                let text = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Io { path, source })?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };

        settings.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply environment overrides using the given lookup.
    ///
    /// - `PORT`: bind to `0.0.0.0:{PORT}`
    /// - `ALLOWED_ORIGINS`: comma-separated CORS origins
    /// - `BUSPLUS_BASE_URL`, `BUSPLUS_USER_AGENT`, `BUSPLUS_TIMEOUT_SECS`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT") {
            let port: u16 = port.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                message: format!("not a port number: {}", port),
            })?;
            self.server.bind = format!("0.0.0.0:{}", port);
        }
        if let Some(origins) = get("ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(url) = get("BUSPLUS_BASE_URL") {
            self.fetch.base_url = url;
        }
        if let Some(ua) = get("BUSPLUS_USER_AGENT") {
            self.fetch.user_agent = Some(ua);
        }
        if let Some(timeout) = get("BUSPLUS_TIMEOUT_SECS") {
            self.fetch.timeout_secs = timeout.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "BUSPLUS_TIMEOUT_SECS",
                message: format!("not a number: {}", timeout),
            })?;
        }

        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "cache.capacity",
                message: "must be at least 1".to_string(),
            });
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "fetch.timeout_secs",
                message: "must be at least 1".to_string(),
            });
        }
        if !self.fetch.base_url.starts_with("http://") && !self.fetch.base_url.starts_with("https://")
        {
            return Err(ConfigError::Invalid {
                key: "fetch.base_url",
                message: format!("not an http(s) URL: {}", self.fetch.base_url),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.cache.ttl(), Duration::from_secs(300));
        assert_eq!(settings.cache.capacity, 50);
        assert!(!settings.cache.dedupe_in_flight);
        assert!(settings.price.minor_unit_heuristic);
        assert_eq!(settings.price.minor_unit_threshold, 1000.0);
        assert_eq!(settings.fetch.base_url, DEFAULT_BASE_URL);
        assert!(settings.server.allows_any_origin());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            fallback_operator = "Via Bariloche"

            [cache]
            ttl_secs = 60
            dedupe_in_flight = true

            [price]
            minor_unit_heuristic = false
            "#,
        )
        .unwrap();
        assert_eq!(settings.fallback_operator, "Via Bariloche");
        assert_eq!(settings.cache.ttl_secs, 60);
        assert_eq!(settings.cache.capacity, 50);
        assert!(settings.cache.dedupe_in_flight);
        assert!(!settings.price.minor_unit_heuristic);
        assert_eq!(settings.price.minor_unit_threshold, 1000.0);
        assert_eq!(settings.server, ServerSettings::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Settings::from_toml("[cache]\nttl_secs = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Settings::from_toml("[cache]\ncapacity = 0"),
            Err(ConfigError::Invalid { key: "cache.capacity", .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_env_overrides(env(&[
                ("PORT", "8080"),
                ("ALLOWED_ORIGINS", "https://viacomodoro.com.ar, https://www.viacomodoro.com.ar"),
                ("BUSPLUS_USER_AGENT", "impersonate"),
                ("BUSPLUS_TIMEOUT_SECS", "5"),
            ]))
            .unwrap();
        assert_eq!(settings.server.bind, "0.0.0.0:8080");
        assert_eq!(
            settings.server.allowed_origins,
            vec!["https://viacomodoro.com.ar", "https://www.viacomodoro.com.ar"]
        );
        assert!(!settings.server.allows_any_origin());
        assert_eq!(settings.fetch.user_agent.as_deref(), Some("impersonate"));
        assert_eq!(settings.fetch.timeout_secs, 5);
    }

    #[test]
    fn test_env_override_errors() {
        let mut settings = Settings::default();
        assert!(settings.apply_env_overrides(env(&[("PORT", "http")])).is_err());
        let mut settings = Settings::default();
        assert!(settings
            .apply_env_overrides(env(&[("BUSPLUS_BASE_URL", "checkout.busplus.com.ar")]))
            .is_err());
    }

    #[test]
    fn test_empty_env_values_ignored() {
        let mut settings = Settings::default();
        settings
            .apply_env_overrides(env(&[("PORT", ""), ("ALLOWED_ORIGINS", " ")]))
            .unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[fetch]\ntimeout_secs = 7\n").unwrap();
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.fetch.timeout_secs, 7);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load(Some(Path::new("/nonexistent/busplus.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
