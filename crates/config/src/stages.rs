//! Stage and sink instance configuration
//!
//! Each pipeline lists stages by type with type-specific options. The
//! options map is handed to the matching factory in `sluice-transform`
//! (stages) or `sluice-connectors` (sinks).
//!
//! # Example
//!
//! ```toml
//! [[pipelines.stages]]
//! type = "set_fields"
//! fields = { source = "orders" }
//!
//! [[pipelines.stages]]
//! type = "tag"
//! tags = { team = "billing" }
//! ```

use serde::Deserialize;
use std::collections::HashMap;

/// Configuration for a single stage instance
#[derive(Debug, Clone, Deserialize)]
pub struct StageInstanceConfig {
    /// Stage type (e.g., "noop", "set_fields")
    #[serde(rename = "type")]
    pub stage_type: String,

    /// Whether this stage is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Type-specific options passed to the stage factory
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

/// Batch sink attached to the end of a pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// Sink type (e.g., "stdout", "memory")
    #[serde(rename = "type")]
    pub sink_type: String,

    /// Maximum siblings coalesced into one batched write
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Type-specific options
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

fn default_true() -> bool {
    true
}

fn default_batch_size() -> usize {
    25
}

impl StageInstanceConfig {
    /// Create an enabled stage config with no options
    pub fn new(stage_type: impl Into<String>) -> Self {
        Self {
            stage_type: stage_type.into(),
            enabled: true,
            options: HashMap::new(),
        }
    }

    /// Add an option
    pub fn with_option(mut self, key: impl Into<String>, value: toml::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Get an option as string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(|v| v.as_str())
    }

    /// Get an option as a TOML table
    pub fn get_table(&self, key: &str) -> Option<&toml::Table> {
        self.options.get(key).and_then(|v| v.as_table())
    }

    /// Get an option as bool
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.options.get(key).and_then(|v| v.as_bool())
    }
}

impl SinkConfig {
    /// Create a sink config with the default batch size
    pub fn new(sink_type: impl Into<String>) -> Self {
        Self {
            sink_type: sink_type.into(),
            batch_size: default_batch_size(),
            options: HashMap::new(),
        }
    }

    /// Get an option as string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(|v| v.as_str())
    }
}

/// Known stage types for validation
pub const KNOWN_STAGE_TYPES: &[&str] = &["noop", "set_fields", "tag"];

/// Known sink types for validation
pub const KNOWN_SINK_TYPES: &[&str] = &["stdout", "memory"];

/// Check if a stage type is known
pub fn is_known_stage_type(stage_type: &str) -> bool {
    KNOWN_STAGE_TYPES.contains(&stage_type)
}

/// Check if a sink type is known
pub fn is_known_sink_type(sink_type: &str) -> bool {
    KNOWN_SINK_TYPES.contains(&sink_type)
}
