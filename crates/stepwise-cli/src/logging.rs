//! Log output for the driver
//!
//! Plain `LEVEL message` lines on stderr, no timestamps, no colors, so
//! stdout stays clean for routine output and JSON reports.

use stepwise_config::LogLevel;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

/// Pick the effective level: `-q` wins, then `-v`, then configuration.
pub fn resolve_level(verbose: u8, quiet: bool, configured: Option<LogLevel>) -> LogLevel {
    if quiet {
        return LogLevel::Off;
    }
    match verbose {
        0 => configured.unwrap_or(LogLevel::Warn),
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

pub fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

/// Install the stderr subscriber. Later calls are ignored.
pub fn init(level: LogLevel) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_ansi(false)
        .compact()
        .with_filter(level_filter(level));

    let _ = Registry::default().with(layer).try_init();
}
