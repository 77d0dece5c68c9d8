//! Configuration Loader
//!
//! Handles loading stepwise.toml and applying environment overrides.

use crate::project::{DemoConfig, LogLevel, StepwiseConfig, StopMode};
use crate::{ConfigError, ConfigResult, CONFIG_FILE_NAME};
use std::env;
use std::path::{Path, PathBuf};

/// Default tick budget for a driver run
pub const DEFAULT_MAX_TICKS: u64 = 10_000;

/// Configuration loader
///
/// Reads stepwise.toml and applies overrides on top of it, in this order:
/// 1. Project config (stepwise.toml) - lowest priority
/// 2. Environment variables (STEPWISE_*) - overrides project
/// 3. CLI flags - highest priority (handled by caller)
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Skip STEPWISE_* variables
    ignore_env: bool,
}

/// Loaded configuration with its origin
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// File configuration with environment overrides applied
    pub project: StepwiseConfig,

    /// Directory where stepwise.toml was found
    pub config_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { ignore_env: false }
    }

    /// Loader that reads files only
    pub fn without_env() -> Self {
        Self { ignore_env: true }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find stepwise.toml. A missing file is
    /// not an error; defaults apply.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (config_root, project) = self.find_project_config(start_dir)?;
        let project = self.apply_env_overrides(project)?;

        Ok(Config {
            project,
            config_root,
        })
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let project = StepwiseConfig::load_from_file(config_path)?;
        let project = self.apply_env_overrides(project)?;

        Ok(Config {
            project,
            config_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    /// Find stepwise.toml by walking up the directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, StepwiseConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.exists() {
                let config = StepwiseConfig::load_from_file(&config_path)?;
                return Ok((Some(current), config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, StepwiseConfig::default())),
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// - STEPWISE_MAX_TICKS=<n>
    /// - STEPWISE_LOG=<level>
    /// - STEPWISE_TRACE=true|1|yes
    fn apply_env_overrides(&self, mut config: StepwiseConfig) -> ConfigResult<StepwiseConfig> {
        if self.ignore_env {
            return Ok(config);
        }

        if let Ok(value) = env::var("STEPWISE_MAX_TICKS") {
            let ticks: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "STEPWISE_MAX_TICKS".to_string(),
                reason: format!("'{}' is not a tick count", value),
            })?;
            config.driver_mut().max_ticks = Some(ticks);
        }

        if let Ok(value) = env::var("STEPWISE_LOG") {
            config.logging_mut().level = Some(value.parse()?);
        }

        if let Ok(value) = env::var("STEPWISE_TRACE") {
            let trace = matches!(value.to_lowercase().as_str(), "true" | "1" | "yes");
            config.driver_mut().trace = Some(trace);
        }

        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Effective tick budget
    pub fn max_ticks(&self) -> u64 {
        self.project
            .driver
            .as_ref()
            .and_then(|d| d.max_ticks)
            .unwrap_or(DEFAULT_MAX_TICKS)
    }

    /// Configured stop condition, if any
    pub fn stop(&self) -> Option<StopMode> {
        self.project.driver.as_ref().and_then(|d| d.stop)
    }

    /// Whether cursor transitions are printed
    pub fn trace(&self) -> bool {
        self.project
            .driver
            .as_ref()
            .and_then(|d| d.trace)
            .unwrap_or(false)
    }

    /// Configured log level, if any
    pub fn log_level(&self) -> Option<LogLevel> {
        self.project.logging.as_ref().and_then(|l| l.level)
    }

    /// Demo settings with defaults filled in
    pub fn demo(&self) -> DemoSettings {
        let demo = self.project.demo.clone().unwrap_or_default();
        DemoSettings::from(&demo)
    }

    /// Directory holding the loaded stepwise.toml
    pub fn config_root(&self) -> Option<&Path> {
        self.config_root.as_deref()
    }

    /// Check if a stepwise.toml was found
    pub fn has_file(&self) -> bool {
        self.config_root.is_some()
    }
}

/// Effective demo values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoSettings {
    pub x: i32,
    pub y: i32,
    pub timer: i64,
    pub sieve_limit: usize,
    pub sieve_chunk: usize,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            x: 1,
            y: 0,
            timer: 10,
            sieve_limit: 100,
            sieve_chunk: 10,
        }
    }
}

impl From<&DemoConfig> for DemoSettings {
    fn from(config: &DemoConfig) -> Self {
        let defaults = Self::default();
        Self {
            x: config.x.unwrap_or(defaults.x),
            y: config.y.unwrap_or(defaults.y),
            timer: config.timer.unwrap_or(defaults.timer),
            sieve_limit: config.sieve_limit.unwrap_or(defaults.sieve_limit),
            sieve_chunk: config.sieve_chunk.unwrap_or(defaults.sieve_chunk),
        }
    }
}
