//! Engine configuration.
//!
//! Loaded from TOML, then overridden by `CUSTOS_*` environment variables.
//!
//! ```toml
//! fanout_timeout_ms = 5000
//!
//! [store]
//! backend = "file"
//! path = "/var/lib/custos/policies.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable overriding [`StoreConfig::backend`].
pub const ENV_STORE_BACKEND: &str = "CUSTOS_STORE_BACKEND";
/// Environment variable overriding [`StoreConfig::path`].
pub const ENV_STORE_PATH: &str = "CUSTOS_STORE_PATH";
/// Environment variable overriding [`AclConfig::fanout_timeout_ms`].
pub const ENV_FANOUT_TIMEOUT_MS: &str = "CUSTOS_FANOUT_TIMEOUT_MS";

/// Policy store selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend type: "memory" or "file".
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Path to the policy file (file backend only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn default_backend() -> String {
    "memory".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclConfig {
    /// Deadline for one fan-out across identities, in milliseconds.
    /// Zero disables the deadline.
    #[serde(default = "default_fanout_timeout_ms")]
    pub fanout_timeout_ms: u64,

    /// Policy store selection.
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_fanout_timeout_ms() -> u64 {
    5_000
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            fanout_timeout_ms: default_fanout_timeout_ms(),
            store: StoreConfig::default(),
        }
    }
}

impl AclConfig {
    /// Parses configuration from a TOML string and validates it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Self::from_toml_str(&content)
    }

    /// Applies `CUSTOS_*` environment overrides and re-validates.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup function.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup(ENV_STORE_BACKEND) {
            self.store.backend = backend;
        }
        if let Some(path) = lookup(ENV_STORE_PATH) {
            self.store.path = Some(path);
        }
        if let Some(timeout) = lookup(ENV_FANOUT_TIMEOUT_MS) {
            self.fanout_timeout_ms = timeout.parse().map_err(|e| {
                Error::config(format!("{ENV_FANOUT_TIMEOUT_MS}='{timeout}': {e}"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks backend name and required fields.
    pub fn validate(&self) -> Result<()> {
        match self.store.backend.as_str() {
            "memory" => Ok(()),
            "file" => match self.store.path.as_deref() {
                Some(p) if !p.trim().is_empty() => Ok(()),
                _ => Err(Error::config("file store backend requires store.path")),
            },
            other => Err(Error::config(format!(
                "unknown store backend '{other}' (expected memory or file)"
            ))),
        }
    }

    /// Fan-out deadline, or `None` when disabled.
    pub fn fanout_timeout(&self) -> Option<Duration> {
        (self.fanout_timeout_ms > 0).then(|| Duration::from_millis(self.fanout_timeout_ms))
    }

    /// Serializes back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
