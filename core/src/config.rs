//! Server configuration loading and validation
//!
//! This module parses a TOML configuration into a [`ServerConfig`], applies
//! sane defaults (via serde defaults), and performs strict validation with
//! field-path error messages.

use crate::{CoreError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default interval between zombie collection passes, in seconds
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 5;

/// Default time a worker child waits for request data, in seconds
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 5;

/// Runtime configuration for a kelpie server
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Host name or address to bind
    pub host: String,
    /// Port to listen on; 0 asks the OS for an ephemeral port
    pub port: u16,
    /// How long a worker child waits for request data, in seconds
    pub read_timeout_secs: u64,
    /// Interval between zombie collection passes, in seconds
    pub cleanup_interval_secs: u64,
    /// Consecutive accept failures tolerated before the server gives up
    pub max_accept_retries: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
            max_accept_retries: 10,
        }
    }
}

impl ServerConfig {
    /// Validate the configuration and return `Result<()>` with field-path errors
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "host: cannot be empty".to_string(),
            ));
        }
        if self.read_timeout_secs == 0 {
            return Err(CoreError::ValidationError(
                "readTimeoutSecs: must be > 0".to_string(),
            ));
        }
        if self.cleanup_interval_secs == 0 {
            return Err(CoreError::ValidationError(
                "cleanupIntervalSecs: must be > 0".to_string(),
            ));
        }
        if self.max_accept_retries == 0 {
            return Err(CoreError::ValidationError(
                "maxAcceptRetries: must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// The `host:port` string the listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load a server config from a TOML file path
pub fn load_config_from_toml_path(path: impl AsRef<Path>) -> Result<ServerConfig> {
    let data = fs::read_to_string(&path).map_err(|e| {
        CoreError::ConfigurationError(format!("Failed to read config {:?}: {}", path.as_ref(), e))
    })?;
    load_config_from_toml_str(&data)
}

/// Load a server config from a TOML string
pub fn load_config_from_toml_str(input: &str) -> Result<ServerConfig> {
    let config: ServerConfig = toml::from_str(input)
        .map_err(|e| CoreError::ConfigurationError(format!("TOML parse error: {}", e)))?;
    config.validate()?;
    Ok(config)
}
