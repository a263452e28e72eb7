//! Logging configuration
//!
//! Read by the `sluice` binary when installing the tracing subscriber.
//! Library crates only emit events.

use serde::Deserialize;

/// Log level
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output (default)
    #[default]
    Console,
    /// One JSON object per line
    Json,
}

/// Log output destination
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Stderr keeps stdout free for sink output (default)
    #[default]
    Stderr,
    Stdout,
}

/// Logging configuration
///
/// ```toml
/// [log]
/// level = "debug"
/// format = "json"
/// directives = ["sluice_connectors=trace"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,

    /// Extra per-target `EnvFilter` directives appended after the level
    pub directives: Vec<String>,
}

impl LogConfig {
    /// Full filter string: level followed by any per-target directives
    pub fn filter_directive(&self) -> String {
        let mut parts = vec![self.level.as_str().to_string()];
        parts.extend(self.directives.iter().cloned());
        parts.join(",")
    }
}
