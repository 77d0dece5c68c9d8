//! Project Configuration (stepwise.toml)
//!
//! Handles the configuration file read by the `stepwise` driver.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Largest accepted `demo.sieve_limit`; the sieve allocates one flag per candidate.
pub const MAX_SIEVE_LIMIT: usize = 10_000_000;

/// Configuration from stepwise.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct StepwiseConfig {
    /// Driver loop settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<DriverConfig>,

    /// Logging settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    /// Initial values for the demonstration routines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo: Option<DemoConfig>,
}

/// Driver loop configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// Upper bound on ticks before the run is abandoned (default: 10000)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ticks: Option<u64>,

    /// When the driver stops (default: chosen by the demo)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopMode>,

    /// Print every cursor transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<bool>,
}

/// Stop condition for the driver loop
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StopMode {
    /// Stop once every routine completed
    AllComplete,
    /// Stop once the first routine's end hook fired
    FirstEnded,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level written to stderr (default: warn)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
}

/// Log verbosity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Demonstration routine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct DemoConfig {
    /// Initial `x` of ExpensiveOperation (default: 1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,

    /// Initial `y` of ExpensiveOperation (default: 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,

    /// Initial `timer` of ExpensiveOperation (default: 10)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<i64>,

    /// Upper bound of the prime sieve (default: 100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sieve_limit: Option<usize>,

    /// Candidates crossed off per sieve call (default: 10)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sieve_chunk: Option<usize>,
}

impl StepwiseConfig {
    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(driver) = &self.driver {
            if driver.max_ticks == Some(0) {
                return Err(invalid("driver.max_ticks", "must be at least 1"));
            }
        }

        if let Some(demo) = &self.demo {
            if let Some(timer) = demo.timer {
                if timer <= 0 {
                    return Err(invalid(
                        "demo.timer",
                        "must be positive; the countdown only stops when it reaches zero",
                    ));
                }
            }
            if let Some(limit) = demo.sieve_limit {
                if limit < 2 {
                    return Err(invalid("demo.sieve_limit", "must be at least 2"));
                }
                if limit > MAX_SIEVE_LIMIT {
                    return Err(invalid(
                        "demo.sieve_limit",
                        &format!("must be at most {}", MAX_SIEVE_LIMIT),
                    ));
                }
            }
            if demo.sieve_chunk == Some(0) {
                return Err(invalid("demo.sieve_chunk", "must be at least 1"));
            }
        }

        Ok(())
    }

    pub fn driver_mut(&mut self) -> &mut DriverConfig {
        self.driver.get_or_insert_with(Default::default)
    }

    pub fn logging_mut(&mut self) -> &mut LoggingConfig {
        self.logging.get_or_insert_with(Default::default)
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("unknown level '{}'", other),
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(name)
    }
}

impl fmt::Display for StopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopMode::AllComplete => f.write_str("all-complete"),
            StopMode::FirstEnded => f.write_str("first-ended"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[driver]
max_ticks = 50
stop = "all-complete"
trace = true

[logging]
level = "debug"

[demo]
x = 3
y = 7
timer = 4
sieve_limit = 30
sieve_chunk = 5
"#;

        let config: StepwiseConfig = toml::from_str(toml).unwrap();
        config.validate().unwrap();

        let driver = config.driver.unwrap();
        assert_eq!(driver.max_ticks, Some(50));
        assert_eq!(driver.stop, Some(StopMode::AllComplete));
        assert_eq!(driver.trace, Some(true));
        assert_eq!(config.logging.unwrap().level, Some(LogLevel::Debug));

        let demo = config.demo.unwrap();
        assert_eq!(demo.timer, Some(4));
        assert_eq!(demo.sieve_chunk, Some(5));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: StepwiseConfig = toml::from_str("").unwrap();
        assert_eq!(config, StepwiseConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<StepwiseConfig, _> = toml::from_str("[driver]\nspeed = 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_stop_mode_rejected() {
        let result: Result<StepwiseConfig, _> = toml::from_str("[driver]\nstop = \"never\"\n");
        assert!(result.is_err());
    }

    #[rstest]
    #[case("[driver]\nmax_ticks = 0\n", "driver.max_ticks")]
    #[case("[demo]\ntimer = 0\n", "demo.timer")]
    #[case("[demo]\ntimer = -2\n", "demo.timer")]
    #[case("[demo]\nsieve_limit = 1\n", "demo.sieve_limit")]
    #[case("[demo]\nsieve_limit = 10000001\n", "demo.sieve_limit")]
    #[case("[demo]\nsieve_chunk = 0\n", "demo.sieve_chunk")]
    fn test_validation_rejects(#[case] toml: &str, #[case] field: &str) {
        let config: StepwiseConfig = toml::from_str(toml).unwrap();
        match config.validate() {
            Err(ConfigError::InvalidValue { field: got, .. }) => assert_eq!(got, field),
            other => panic!("expected InvalidValue for {}, got {:?}", field, other),
        }
    }

    #[rstest]
    #[case("off", LogLevel::Off)]
    #[case("ERROR", LogLevel::Error)]
    #[case("warning", LogLevel::Warn)]
    #[case(" info ", LogLevel::Info)]
    #[case("trace", LogLevel::Trace)]
    fn test_log_level_from_str(#[case] input: &str, #[case] expected: LogLevel) {
        assert_eq!(input.parse::<LogLevel>().unwrap(), expected);
    }

    #[test]
    fn test_log_level_from_str_unknown() {
        let err = "loud".parse::<LogLevel>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for 'logging.level': unknown level 'loud'"
        );
    }

    #[test]
    fn test_largest_sieve_limit_accepted() {
        let config: StepwiseConfig = toml::from_str("[demo]\nsieve_limit = 10000000\n").unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_serialize_skips_unset_sections() {
        let mut config = StepwiseConfig::default();
        config.logging_mut().level = Some(LogLevel::Info);
        let text = toml::to_string(&config).unwrap();
        assert_eq!(text.trim(), "[logging]\nlevel = \"info\"");
    }
}
