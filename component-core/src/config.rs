//! Configuration for the component registry

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ComponentError, Result};

/// Environment variable selecting the registry backend
pub const BACKEND_ENV: &str = "COMPONENT_REGISTRY_BACKEND";

/// Environment variable switching the resolution cache on or off
pub const CACHE_ENV: &str = "COMPONENT_REGISTRY_CACHE";

/// Main registry configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Which backend stores registrations
    #[serde(default)]
    pub backend: BackendKind,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

impl RegistryConfig {
    /// Read the configuration from the process environment
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(backend) = lookup(BACKEND_ENV) {
            config.backend = backend.parse()?;
        }
        if let Some(cache) = lookup(CACHE_ENV) {
            config.cache.enabled = parse_switch(CACHE_ENV, &cache)?;
        }

        Ok(config)
    }

    /// Set the backend
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Set the cache configuration
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }
}

/// Available registry backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process store guarded by a read-write lock
    #[default]
    Basic,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Basic => "basic",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(BackendKind::Basic),
            other => Err(ComponentError::InvalidConfig {
                key: BACKEND_ENV.to_string(),
                reason: format!("unknown backend '{}', expected one of: basic", other),
            }),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether resolutions are memoized
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl CacheConfig {
    /// Enable or disable memoization
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

fn parse_switch(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => Err(ComponentError::InvalidConfig {
            key: key.to_string(),
            reason: format!("expected on/off, got '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(config.backend, BackendKind::Basic);
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_env_overrides() {
        let config = RegistryConfig::from_lookup(lookup(&[
            (BACKEND_ENV, " Basic "),
            (CACHE_ENV, "off"),
        ]))
        .unwrap();
        assert_eq!(config.backend, BackendKind::Basic);
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_unknown_backend_fails() {
        let err = RegistryConfig::from_lookup(lookup(&[(BACKEND_ENV, "redis")])).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
        assert!(err.to_string().contains("redis"));
    }

    #[test]
    fn test_malformed_switch_fails() {
        let err = RegistryConfig::from_lookup(lookup(&[(CACHE_ENV, "sometimes")])).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: RegistryConfig = serde_json::from_str(r#"{"cache": {}}"#).unwrap();
        assert!(config.cache.enabled);

        let config: RegistryConfig =
            serde_json::from_str(r#"{"backend": "basic", "cache": {"enabled": false}}"#).unwrap();
        assert!(!config.cache.enabled);
    }
}
