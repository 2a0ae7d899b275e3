//! Process-wide log threshold.
//!
//! Library code logs through the `log` facade. The host installs a sink once
//! at startup (the `ale` binary uses `tracing-subscriber`); this module only
//! moves the global threshold. There is no teardown: the threshold stays in
//! effect until changed again, and it affects every session in the process.
//! Before the first `set_logger_mode` call the `log` facade's own default
//! applies (everything filtered), which reads back as [`LoggerMode::Error`].

use std::fmt;
use std::str::FromStr;

use log::LevelFilter;

/// Minimum severity that reaches the log sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum LoggerMode {
    Info = 0,
    Warning = 1,
    Error = 2,
}

impl LoggerMode {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(LoggerMode::Info),
            1 => Some(LoggerMode::Warning),
            2 => Some(LoggerMode::Error),
            _ => None,
        }
    }

    pub fn level_filter(self) -> LevelFilter {
        match self {
            LoggerMode::Info => LevelFilter::Info,
            LoggerMode::Warning => LevelFilter::Warn,
            LoggerMode::Error => LevelFilter::Error,
        }
    }

    fn from_level_filter(filter: LevelFilter) -> Self {
        match filter {
            LevelFilter::Trace | LevelFilter::Debug | LevelFilter::Info => LoggerMode::Info,
            LevelFilter::Warn => LoggerMode::Warning,
            LevelFilter::Error | LevelFilter::Off => LoggerMode::Error,
        }
    }
}

impl fmt::Display for LoggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoggerMode::Info => "info",
            LoggerMode::Warning => "warning",
            LoggerMode::Error => "error",
        })
    }
}

impl FromStr for LoggerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" | "0" => Ok(LoggerMode::Info),
            "warning" | "warn" | "1" => Ok(LoggerMode::Warning),
            "error" | "2" => Ok(LoggerMode::Error),
            other => Err(format!("unknown logger mode `{other}`")),
        }
    }
}

/// Set the process-wide threshold.
pub fn set_logger_mode(mode: LoggerMode) {
    log::set_max_level(mode.level_filter());
}

/// The threshold currently in effect.
pub fn logger_mode() -> LoggerMode {
    LoggerMode::from_level_filter(log::max_level())
}
