//! Configuration loading for the room host.
//!
//! Configuration is loaded from a TOML file (default: `rooms.toml`). Every
//! section and field is optional.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Room table configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Per-mutation limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Room table configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Maximum number of rooms held in memory (default: 1024).
    #[serde(default = "default_max_rooms")]
    pub max_rooms: usize,
}

/// Per-mutation limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum JSON-encoded argument size in bytes (default: 64KB).
    #[serde(default = "default_max_args_bytes")]
    pub max_args_bytes: usize,
    /// Maximum mutations per client per minute (default: 600).
    #[serde(default = "default_mutations_per_minute")]
    pub mutations_per_minute: u32,
    /// Evict fully recharged rate-limit entries every N accepted pushes
    /// (default: 1024, 0 disables).
    #[serde(default = "default_limiter_sweep_every")]
    pub limiter_sweep_every: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    /// (default: `info`).
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

// Default value functions
fn default_max_rooms() -> usize {
    1024
}

fn default_max_args_bytes() -> usize {
    64 * 1024 // 64KB
}

fn default_mutations_per_minute() -> u32 {
    600
}

fn default_limiter_sweep_every() -> u64 {
    1024
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_rooms: default_max_rooms(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_args_bytes: default_max_args_bytes(),
            mutations_per_minute: default_mutations_per_minute(),
            limiter_sweep_every: default_limiter_sweep_every(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds
    /// out-of-range values.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the host cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_rooms == 0 {
            return Err(ConfigError::Invalid {
                field: "server.max_rooms",
                reason: "must be > 0",
            });
        }
        if self.limits.mutations_per_minute == 0 {
            return Err(ConfigError::Invalid {
                field: "limits.mutations_per_minute",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid config value {field}: {reason}")]
    Invalid {
        /// Dotted path of the field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}
