//! Configuration for the cosign service

use cosign_log::LogFormat;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),
    #[error("Failed to write configuration file: {0}")]
    WriteError(String),
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
    #[error("Home directory not found")]
    HomeDirectoryNotFound,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub log: LogConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the Coordination API listens on
    pub listen_address: String,
    /// Answer cross-origin requests from browser wallets
    pub cors: bool,
    /// Maximum request body in bytes
    pub max_request_size: usize,
    pub request_timeout_secs: u64,
    /// Mount `DELETE /api/proposals`
    pub enable_admin_reset: bool,
    /// Mount `GET /metrics`
    pub enable_metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:5000".to_string(),
            cors: true,
            max_request_size: 1024 * 1024,
            request_timeout_secs: 30,
            enable_admin_reset: true,
            enable_metrics: true,
        }
    }
}

/// Proposal store limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub max_signatures_per_proposal: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_signatures_per_proposal: 256,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl Config {
    /// Load configuration from `<home>/config/config.toml`, falling back to
    /// defaults when the file does not exist
    pub fn load(home: &Path) -> Result<Self, ConfigError> {
        let config_path = Self::config_path(home);

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::WriteError(format!("Failed to create config directory: {e}"))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::WriteError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Default home directory, `~/.cosign`
    pub fn default_home() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirectoryNotFound)?;
        Ok(home.join(".cosign"))
    }

    /// Location of the config file under a home directory
    pub fn config_path(home: &Path) -> PathBuf {
        home.join("config").join("config.toml")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_address()?;

        if self.server.max_request_size == 0 {
            return Err(ConfigError::InvalidValue(
                "server.max_request_size must be non-zero".to_string(),
            ));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "server.request_timeout_secs must be non-zero".to_string(),
            ));
        }

        if self.store.max_signatures_per_proposal == 0 {
            return Err(ConfigError::InvalidValue(
                "store.max_signatures_per_proposal must be non-zero".to_string(),
            ));
        }

        if !cosign_log::is_valid_level(&self.log.level) {
            return Err(ConfigError::InvalidValue(format!(
                "log.level '{}' is not one of {}",
                self.log.level,
                cosign_log::LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Parsed listen address
    pub fn listen_address(&self) -> Result<SocketAddr, ConfigError> {
        self.server.listen_address.parse().map_err(|e| {
            ConfigError::InvalidValue(format!(
                "server.listen_address '{}': {e}",
                self.server.listen_address
            ))
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}
