//! Stepwise Configuration System
//!
//! Provides configuration for the stepwise demonstration driver:
//! - Project configuration (stepwise.toml)
//! - Environment overrides (STEPWISE_*)
//! - Effective values with defaults
//!
//! # Configuration Hierarchy
//!
//! Values are resolved in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Project config (./stepwise.toml, found by walking up)
//! 3. Environment variables (STEPWISE_*)
//! 4. CLI flags (handled by the caller)
//!
//! # Example
//!
//! ```no_run
//! use stepwise_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("tick budget: {}", config.max_ticks());
//! ```

pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// File name looked up by [`ConfigLoader`].
pub const CONFIG_FILE_NAME: &str = "stepwise.toml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use loader::{Config, ConfigLoader, DemoSettings, DEFAULT_MAX_TICKS};
pub use project::{
    DemoConfig, DriverConfig, LogLevel, LoggingConfig, StepwiseConfig, StopMode, MAX_SIEVE_LIMIT,
};
