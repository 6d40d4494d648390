//! Bootstrap configuration loading
//!
//! Config file resolution priority:
//! 1. Explicit path (command-line argument or `SSM_CONFIG` environment variable)
//! 2. `<platform config dir>/ssm/config.toml`
//! 3. Compiled defaults
//!
//! A missing file is never fatal: a warning is logged and defaults are used.
//! A file that exists but cannot be parsed or fails validation is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SSM_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Interface to bind the HTTP server to
    pub host: String,

    /// HTTP server port
    pub port: u16,

    /// Bulk import tuning
    pub import: ImportConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5730,
            import: ImportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Bulk import worker pool settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Number of concurrent workers classifying rows
    pub workers: usize,

    /// Capacity of the decoded-row work queue
    pub queue_capacity: usize,

    /// Capacity of the hand-off channel feeding the single collector
    pub handoff_capacity: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 64,
            handoff_capacity: 1,
        }
    }
}

impl ImportConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("import.workers", self.workers),
            ("import.queue_capacity", self.queue_capacity),
            ("import.handoff_capacity", self.handoff_capacity),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{} must be at least 1", name)));
            }
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Resolve and load configuration, falling back to defaults when no file exists
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match resolve_config_path(explicit_path) {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            Some(path) => {
                warn!(
                    "Config file not found at {}, using compiled defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                info!("No config file found, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("host must not be empty".to_string()));
        }
        self.import.validate()
    }
}

/// Pick the config file path by priority order
///
/// Returns `None` only when neither an explicit path nor a platform config
/// directory is available.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: explicit argument
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    // Priority 1b: environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 2: platform config directory
    dirs::config_dir().map(|d| d.join("ssm").join("config.toml"))
}
