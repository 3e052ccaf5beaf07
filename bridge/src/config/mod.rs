//! Configuration management
//!
//! This module handles loading and validation of the optional bridge
//! configuration. Configuration is stored in TOML format at
//! `<config dir>/beam-vm/config.toml` (e.g. `~/.config/beam-vm/config.toml`).
//! Mobile hosts normally run without a file and get the defaults.
//!
//! # Configuration Sections
//!
//! - **logging**: Log level and output format
//! - **runtime**: Optional shared runtime library to load instead of the linked one
//!
//! The runtime's startup arguments are fixed and cannot be configured.
//!
//! # Examples
//!
//! ```no_run
//! use beam_vm::config::BridgeConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BridgeConfig::load_or_default()?;
//! println!("Log level: {}", config.logging.level);
//! # Ok(())
//! # }
//! ```

use sdk::errors::BridgeError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Runtime backend settings
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Pretty in debug builds, JSON in release builds
    #[default]
    Auto,
    Pretty,
    Json,
}

impl LogFormat {
    /// Resolve `Auto` for the current build profile
    pub fn resolve(self) -> LogFormat {
        match self {
            LogFormat::Auto if cfg!(debug_assertions) => LogFormat::Pretty,
            LogFormat::Auto => LogFormat::Json,
            other => other,
        }
    }
}

/// Runtime backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Shared library exporting `erl_start` (supports ~ expansion)
    #[serde(default)]
    pub library: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl BridgeConfig {
    /// Load configuration from the default location
    ///
    /// Returns the defaults if no file exists there.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed or validated.
    pub fn load_or_default() -> Result<Self, BridgeError> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read (`BridgeError::Io`)
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, BridgeError> {
        let contents = fs::read_to_string(path)?;

        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, BridgeError> {
        let mut config: BridgeConfig = toml::from_str(contents)
            .map_err(|e| BridgeError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("beam-vm").join("config.toml"))
    }

    /// Validate fields and expand ~ in paths
    fn validate_and_process(&mut self) -> Result<(), BridgeError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(BridgeError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        if let Some(library) = &self.runtime.library {
            self.runtime.library = Some(expand_path(library)?);
        }

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, BridgeError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| BridgeError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| BridgeError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| BridgeError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Auto);
        assert!(config.runtime.library.is_none());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = BridgeConfig::from_toml("").unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_log_level() {
        let err = BridgeConfig::from_toml("[logging]\nlevel = \"loud\"\n").unwrap_err();
        assert!(err.to_string().contains("Invalid log level 'loud'"));
    }

    #[test]
    fn test_invalid_format() {
        let err = BridgeConfig::from_toml("[logging]\nformat = \"xml\"\n").unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/lib/liberlang.so");
        let expanded = expand_path(&path).unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(expanded, home.join("lib/liberlang.so"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = PathBuf::from("/opt/otp/liberlang.so");
        assert_eq!(expand_path(&path).unwrap(), path);
    }

    #[test]
    fn test_auto_format_resolution() {
        assert_eq!(LogFormat::Json.resolve(), LogFormat::Json);
        assert_eq!(LogFormat::Pretty.resolve(), LogFormat::Pretty);
        assert_ne!(LogFormat::Auto.resolve(), LogFormat::Auto);
    }

    #[test]
    fn test_config_serialization() {
        let config = BridgeConfig {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Json,
            },
            runtime: RuntimeConfig {
                library: Some(PathBuf::from("/opt/otp/liberlang.so")),
            },
        };
        let toml_string = toml::to_string(&config).unwrap();

        let deserialized = BridgeConfig::from_toml(&toml_string).unwrap();
        assert_eq!(deserialized.logging.level, "debug");
        assert_eq!(deserialized.logging.format, LogFormat::Json);
        assert_eq!(
            deserialized.runtime.library,
            Some(PathBuf::from("/opt/otp/liberlang.so"))
        );
    }
}
