//! Sluice Configuration
//!
//! TOML-based configuration loading with sensible defaults. An empty file
//! is a valid configuration with no pipelines.
//!
//! # Parsing
//!
//! ```
//! use sluice_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str(
//!     "[[pipelines]]\nid = \"things\"\nevent_type = { pattern = \"^thing-\" }",
//! )
//! .unwrap();
//! assert_eq!(config.pipelines.len(), 1);
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [global]
//! batch_size_ceiling = 100
//! parallelism = 4
//!
//! [retry]
//! max_retries = 3
//! retry_base_delay_ms = 100
//!
//! [metrics]
//! step_metrics = ["*"]
//!
//! [[pipelines]]
//! id = "things"
//! event_type = { pattern = "^thing-" }
//! sink = { type = "stdout", batch_size = 25 }
//! ```

mod error;
mod global;
mod logging;
mod metrics;
mod pipelines;
mod retry;
mod stages;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use global::GlobalConfig;
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use metrics::{ALL_STEPS, MetricsConfig, MetricsFormat};
pub use pipelines::{ConditionConfig, EventTypeConfig, PipelineConfig};
pub use retry::{BackoffKind, RetryConfig};
pub use stages::{
    KNOWN_SINK_TYPES, KNOWN_STAGE_TYPES, SinkConfig, StageInstanceConfig, is_known_sink_type,
    is_known_stage_type,
};
pub use validation::{KEY_DELIMITER, KNOWN_OPERATORS, validate_pipeline_id};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Invocation-wide settings
    pub global: GlobalConfig,

    /// Partial-failure retry bounds for batch sinks
    pub retry: RetryConfig,

    /// Logging configuration
    pub log: LogConfig,

    /// Metrics output configuration
    pub metrics: MetricsConfig,

    /// Rule-selected pipelines
    pub pipelines: Vec<PipelineConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Pipelines with `enabled = true`, in declaration order
    pub fn enabled_pipelines(&self) -> impl Iterator<Item = &PipelineConfig> {
        self.pipelines.iter().filter(|p| p.enabled)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
