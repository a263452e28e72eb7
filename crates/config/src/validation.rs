//! Configuration validation
//!
//! Rejects everything that would otherwise surface per event:
//! - Duplicate, empty or `|`-containing pipeline ids
//! - Malformed event type patterns
//! - Unknown filter operators, stage types or sink types
//! - Zero-valued sizes and parallelism

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::pipelines::{EventTypeConfig, PipelineConfig};
use crate::stages::{is_known_sink_type, is_known_stage_type};
use std::collections::HashSet;

/// Delimiter joining metric key segments; forbidden inside names
pub const KEY_DELIMITER: char = '|';

/// Filter operators accepted in `[[pipelines.filters]]`
pub const KNOWN_OPERATORS: &[&str] = &[
    "eq",
    "ne",
    "contains",
    "starts_with",
    "ends_with",
    "regex",
    "exists",
    "gt",
    "lt",
    "gte",
    "lte",
];

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_global(config)?;
    validate_metrics(config)?;
    validate_pipelines(config)?;
    Ok(())
}

fn validate_global(config: &Config) -> Result<()> {
    if config.global.batch_size_ceiling == 0 {
        return Err(ConfigError::invalid_value(
            "global",
            "global",
            "batch_size_ceiling",
            "must be at least 1",
        ));
    }
    if config.global.parallelism == 0 {
        return Err(ConfigError::invalid_value(
            "global",
            "global",
            "parallelism",
            "must be at least 1",
        ));
    }
    Ok(())
}

fn validate_metrics(config: &Config) -> Result<()> {
    for step in &config.metrics.step_metrics {
        if step.contains(KEY_DELIMITER) {
            return Err(ConfigError::invalid_value(
                "metrics",
                step.as_str(),
                "step_metrics",
                "step names must not contain '|'",
            ));
        }
    }
    Ok(())
}

fn validate_pipelines(config: &Config) -> Result<()> {
    let mut seen = HashSet::new();

    for pipeline in &config.pipelines {
        validate_pipeline_id(&pipeline.id)?;
        if !seen.insert(pipeline.id.as_str()) {
            return Err(ConfigError::duplicate_pipeline(&pipeline.id));
        }
        validate_event_type(pipeline)?;
        validate_filters(pipeline)?;
        validate_stages(pipeline)?;

        if pipeline.parallelism == Some(0) {
            return Err(ConfigError::invalid_value(
                "pipeline",
                &pipeline.id,
                "parallelism",
                "must be at least 1",
            ));
        }
    }

    Ok(())
}

/// Check a pipeline id is usable as a metric key segment
pub fn validate_pipeline_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(ConfigError::missing_field("pipeline", id, "id"));
    }
    if id.contains(KEY_DELIMITER) {
        return Err(ConfigError::invalid_value(
            "pipeline",
            id,
            "id",
            "must not contain '|'",
        ));
    }
    Ok(())
}

fn validate_event_type(pipeline: &PipelineConfig) -> Result<()> {
    match &pipeline.event_type {
        EventTypeConfig::Exact(s) if s.is_empty() => Err(ConfigError::invalid_value(
            "pipeline",
            &pipeline.id,
            "event_type",
            "must not be empty",
        )),
        EventTypeConfig::AnyOf(types) if types.is_empty() => Err(ConfigError::invalid_value(
            "pipeline",
            &pipeline.id,
            "event_type",
            "list must not be empty",
        )),
        EventTypeConfig::Pattern { pattern } => regex::Regex::new(pattern)
            .map(|_| ())
            .map_err(|e| {
                ConfigError::invalid_value("pipeline", &pipeline.id, "event_type", e.to_string())
            }),
        _ => Ok(()),
    }
}

fn validate_filters(pipeline: &PipelineConfig) -> Result<()> {
    for filter in &pipeline.filters {
        if filter.field.is_empty() {
            return Err(ConfigError::missing_field("filter", &pipeline.id, "field"));
        }
        if !KNOWN_OPERATORS.contains(&filter.operator.as_str()) {
            return Err(ConfigError::invalid_value(
                "filter",
                &pipeline.id,
                "operator",
                format!(
                    "unknown operator '{}' (expected one of: {})",
                    filter.operator,
                    KNOWN_OPERATORS.join(", ")
                ),
            ));
        }
        if filter.operator != "exists" && filter.value.is_none() {
            return Err(ConfigError::missing_field("filter", &pipeline.id, "value"));
        }
        if filter.operator == "regex"
            && let Some(pattern) = filter.value_string()
            && let Err(e) = regex::Regex::new(&pattern)
        {
            return Err(ConfigError::invalid_value(
                "filter",
                &pipeline.id,
                "value",
                e.to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_stages(pipeline: &PipelineConfig) -> Result<()> {
    for stage in &pipeline.stages {
        if !is_known_stage_type(&stage.stage_type) {
            return Err(ConfigError::unknown_stage_type(
                &pipeline.id,
                &stage.stage_type,
            ));
        }
    }

    if let Some(sink) = &pipeline.sink {
        if !is_known_sink_type(&sink.sink_type) {
            return Err(ConfigError::unknown_sink_type(&pipeline.id, &sink.sink_type));
        }
        if sink.batch_size == 0 {
            return Err(ConfigError::invalid_value(
                "sink",
                &pipeline.id,
                "batch_size",
                "must be at least 1",
            ));
        }
    }

    Ok(())
}
