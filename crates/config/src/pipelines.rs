//! Pipeline configuration
//!
//! Declares the rule-selected pipelines. Every rule is evaluated against
//! every unit of work; a UoW is forked once per matching pipeline.
//!
//! # Example
//!
//! ```toml
//! [[pipelines]]
//! id = "things"
//! event_type = { pattern = "^thing-" }
//!
//! [[pipelines.filters]]
//! field = "tags.region"
//! operator = "eq"
//! value = "eu"
//!
//! [[pipelines]]
//! id = "audit"
//! event_type = ["user-created", "user-deleted"]
//! sink = { type = "stdout", batch_size = 10 }
//! ```

use crate::stages::{SinkConfig, StageInstanceConfig};
use serde::Deserialize;

/// Event type selector for one pipeline
///
/// A bare string is an exact match, a list is a membership test and a
/// `{ pattern = "..." }` table is a regular expression. Any other shape
/// fails to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EventTypeConfig {
    Exact(String),
    AnyOf(Vec<String>),
    Pattern { pattern: String },
}

/// Content filter condition
///
/// `field` is a dot path into the event (`tags.region`, `fields.amount`,
/// or a bare payload field name).
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionConfig {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: Option<toml::Value>,
}

impl ConditionConfig {
    /// Comparison value rendered as a string
    ///
    /// Numbers and booleans are stringified so `value = 5` and
    /// `value = "5"` behave the same.
    pub fn value_string(&self) -> Option<String> {
        self.value.as_ref().map(|v| match v {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// A single pipeline definition
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Unique pipeline id, also the `pipeline` metrics dimension
    pub id: String,

    /// Disabled pipelines are skipped at build time
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Event type selector
    pub event_type: EventTypeConfig,

    /// Content filters, all of which must pass
    #[serde(default)]
    pub filters: Vec<ConditionConfig>,

    /// Per-UoW stages, applied in order
    #[serde(default)]
    pub stages: Vec<StageInstanceConfig>,

    /// Optional batched sink run after the stages
    #[serde(default)]
    pub sink: Option<SinkConfig>,

    /// Overrides `global.parallelism` for this pipeline
    #[serde(default)]
    pub parallelism: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl PipelineConfig {
    /// Whether a batch sink is attached
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Effective parallelism given the global default
    pub fn effective_parallelism(&self, global: usize) -> usize {
        self.parallelism.unwrap_or(global).max(1)
    }
}
