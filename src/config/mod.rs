//! Configuration file loading and parsing.
//!
//! This module handles loading the configuration file from disk and parsing
//! it into validated, type-safe structures.
//!
//! # Configuration File Locations
//!
//! The configuration file is searched in the following order:
//!
//! 1. Path given as the `CONFIG_FILE` CLI argument
//! 2. Default location:
//!    - **Linux/macOS:** `~/.figma-bridge-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.figma-bridge-mcp\config.json`
//!
//! The file is optional at the default location; an explicit path must exist.
//!
//! # Port Selection
//!
//! The `FIGMA_WS_PORT` environment variable overrides `bridge.port` from the
//! file. The `--port` CLI flag overrides both.

mod settings;

pub use settings::{BridgeConfig, Config, LoggingConfig};

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;

/// Environment variable selecting the plugin listener port.
pub const PORT_ENV_VAR: &str = "FIGMA_WS_PORT";

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.figma-bridge-mcp/`
/// - **Windows:** `%USERPROFILE%\.figma-bridge-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".figma-bridge-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads the configuration and applies the `FIGMA_WS_PORT` override.
///
/// If `path` is `None`, uses the platform-specific default location, falling
/// back to defaults when no file exists there.
///
/// # Errors
///
/// Returns an error if:
/// - An explicit configuration file cannot be found
/// - The file cannot be read
/// - The JSON is malformed
/// - `FIGMA_WS_PORT` is not a valid port
/// - A field is invalid
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let port = std::env::var(PORT_ENV_VAR).ok();
    load_config_with_port(path, port.as_deref())
}

/// Loads the configuration with an explicit port override.
///
/// Behaves like [`load_config`] but takes the override value directly
/// instead of reading the environment.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with_port(
    path: Option<&Path>,
    port_override: Option<&str>,
) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => read_config(p)?,
        None => match default_config_path() {
            Some(p) if p.exists() => read_config(&p)?,
            _ => {
                debug!("No configuration file found, using defaults");
                Config::default()
            }
        },
    };

    config.apply_port_override(port_override)?;
    config.validate()?;

    Ok(config)
}

fn read_config(config_path: &Path) -> Result<Config, ConfigError> {
    if !config_path.exists() {
        return Err(ConfigError::NotFound {
            path: config_path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    let config = serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    debug!(path = %config_path.display(), "Loaded configuration file");
    Ok(config)
}
