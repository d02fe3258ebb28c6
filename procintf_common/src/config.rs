//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load the TOML configuration
//! of the procintf service.
//!
//! # Usage
//!
//! ```rust,no_run
//! use procintf_common::config::{ConfigError, ConfigLoader, IntfConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = IntfConfig::load(Path::new("procintf.toml"))?;
//!     config.validate()?;
//!     println!("Namespace: {}", config.procfs.dir_name);
//!     Ok(())
//! }
//! ```

use crate::consts::DEFAULT_DIR_NAME;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Per-call handler traces.
    Debug,
    /// Lifecycle events.
    #[default]
    Info,
    /// Rejected writes and registration problems.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Common configuration fields.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "procintf"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// How write handlers treat out-of-range debug levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Both write endpoints enforce the debug level range; a rejected
    /// debug level resets `config1` together with the debug level.
    #[default]
    Strict,
    /// Config writes skip the range check and a rejected debug level leaves
    /// `config1` at its previous value.
    Legacy,
}

/// Namespace settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcfsConfig {
    /// Directory holding the endpoints.
    #[serde(default = "default_dir_name")]
    pub dir_name: String,

    /// Range-check policy for write endpoints.
    #[serde(default)]
    pub validation: ValidationMode,
}

fn default_dir_name() -> String {
    DEFAULT_DIR_NAME.to_string()
}

impl Default for ProcfsConfig {
    fn default() -> Self {
        Self {
            dir_name: default_dir_name(),
            validation: ValidationMode::default(),
        }
    }
}

impl ProcfsConfig {
    /// Validate the namespace settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dir_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "dir_name cannot be empty".to_string(),
            ));
        }
        if self.dir_name.contains('/') {
            return Err(ConfigError::ValidationError(format!(
                "dir_name '{}' must be a single path component",
                self.dir_name
            )));
        }
        Ok(())
    }
}

/// Top-level service configuration.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// service_name = "procintf"
///
/// [procfs]
/// dir_name = "procfs_simple_intf"
/// validation = "legacy"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntfConfig {
    /// Shared settings.
    pub shared: SharedConfig,

    /// Namespace settings.
    #[serde(default)]
    pub procfs: ProcfsConfig,
}

impl IntfConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.procfs.validate()
    }
}

impl Default for IntfConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig {
                log_level: LogLevel::default(),
                service_name: "procintf".to_string(),
            },
            procfs: ProcfsConfig::default(),
        }
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Any serde-deserializable struct can use ConfigLoader.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
        assert_eq!(LogLevel::Warn.as_directive(), "warn");
    }

    #[test]
    fn test_shared_config_validation_empty_service_name() {
        let config = SharedConfig {
            log_level: LogLevel::Info,
            service_name: "".to_string(),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_procfs_dir_name_validation() {
        let mut procfs = ProcfsConfig::default();
        assert!(procfs.validate().is_ok());

        procfs.dir_name = "a/b".to_string();
        assert!(matches!(
            procfs.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        procfs.dir_name.clear();
        assert!(procfs.validate().is_err());
    }

    #[test]
    fn test_config_loader_file_not_found() {
        let result = IntfConfig::load(Path::new("/nonexistent/path/procintf.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }

    #[test]
    fn test_config_loader_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid toml {{{{").unwrap();

        let result = IntfConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_config_loader_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[shared]
service_name = "test-service"
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = IntfConfig::load(file.path()).unwrap();
        assert_eq!(config.shared.log_level, LogLevel::Info);
        assert_eq!(config.procfs.dir_name, DEFAULT_DIR_NAME);
        assert_eq!(config.procfs.validation, ValidationMode::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_loader_full() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[shared]
log_level = "debug"
service_name = "test-service"

[procfs]
dir_name = "my_intf"
validation = "legacy"
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = IntfConfig::load(file.path()).unwrap();
        assert_eq!(config.shared.log_level, LogLevel::Debug);
        assert_eq!(config.procfs.dir_name, "my_intf");
        assert_eq!(config.procfs.validation, ValidationMode::Legacy);
    }

    #[test]
    fn test_unknown_procfs_field_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[shared]
service_name = "s"

[procfs]
dirname = "typo"
"#
        )
        .unwrap();
        file.flush().unwrap();

        assert!(matches!(
            IntfConfig::load(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
