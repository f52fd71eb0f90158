//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::relay::MAX_REQUEST_TIMEOUT;

/// Log levels accepted in `logging.level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Plugin bridge settings.
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;

        if self.bridge.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                message: "bridge.request_timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.bridge.request_timeout_secs > MAX_REQUEST_TIMEOUT.as_secs() {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "bridge.request_timeout_secs must be at most {}",
                    MAX_REQUEST_TIMEOUT.as_secs()
                ),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        Ok(())
    }

    /// Returns the address the plugin listener binds to.
    ///
    /// # Errors
    ///
    /// Returns an error if `bridge.host` is not an IP address.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr =
            self.bridge
                .host
                .parse()
                .map_err(|_| ConfigError::ValidationError {
                    message: format!(
                        "Invalid bridge host '{}'. Must be an IP address",
                        self.bridge.host
                    ),
                })?;
        Ok(SocketAddr::new(ip, self.bridge.port))
    }

    /// Returns how long a command waits for the plugin.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.bridge.request_timeout_secs)
    }

    /// Overrides `bridge.port` from a raw string, as found in the environment.
    ///
    /// `None` and blank values leave the port unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid port number.
    pub fn apply_port_override(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(());
        };

        self.bridge.port = value.parse().map_err(|_| ConfigError::ValidationError {
            message: format!("Invalid port '{value}'. Must be a number between 0 and 65535"),
        })?;
        Ok(())
    }
}

/// Settings for the WebSocket bridge to the Figma plugin.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Interface to listen on.
    /// Default: "127.0.0.1"
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the plugin connects to.
    /// Default: 3055
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds to wait for the plugin to answer a command.
    /// Default: 30
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    3055
}

const fn default_request_timeout_secs() -> u64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
