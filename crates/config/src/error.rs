//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Two pipelines share the same id
    #[error("pipeline id '{id}' is defined more than once")]
    DuplicatePipeline {
        /// The repeated id
        id: String,
    },

    /// Stage type is not registered
    #[error("pipeline '{pipeline}' uses unknown stage type '{stage_type}'")]
    UnknownStageType {
        /// Pipeline declaring the stage
        pipeline: String,
        /// Unrecognised type name
        stage_type: String,
    },

    /// Sink type is not registered
    #[error("pipeline '{pipeline}' uses unknown sink type '{sink_type}'")]
    UnknownSinkType {
        /// Pipeline declaring the sink
        pipeline: String,
        /// Unrecognised type name
        sink_type: String,
    },

    /// Validation error - required field missing
    #[error("{component} '{name}' is missing required field '{field}'")]
    MissingField {
        /// Component type (e.g., "pipeline", "filter")
        component: &'static str,
        /// Name of the component
        name: String,
        /// Missing field name
        field: &'static str,
    },

    /// Validation error - invalid value
    #[error("{component} '{name}' has invalid {field}: {message}")]
    InvalidValue {
        /// Component type
        component: &'static str,
        /// Name of the component
        name: String,
        /// Field name
        field: &'static str,
        /// Error message
        message: String,
    },
}

impl ConfigError {
    /// Create a DuplicatePipeline error
    pub fn duplicate_pipeline(id: impl Into<String>) -> Self {
        Self::DuplicatePipeline { id: id.into() }
    }

    /// Create an UnknownStageType error
    pub fn unknown_stage_type(pipeline: impl Into<String>, stage_type: impl Into<String>) -> Self {
        Self::UnknownStageType {
            pipeline: pipeline.into(),
            stage_type: stage_type.into(),
        }
    }

    /// Create an UnknownSinkType error
    pub fn unknown_sink_type(pipeline: impl Into<String>, sink_type: impl Into<String>) -> Self {
        Self::UnknownSinkType {
            pipeline: pipeline.into(),
            sink_type: sink_type.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(
        component: &'static str,
        name: impl Into<String>,
        field: &'static str,
    ) -> Self {
        Self::MissingField {
            component,
            name: name.into(),
            field,
        }
    }

    /// Create an InvalidValue error
    pub fn invalid_value(
        component: &'static str,
        name: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            component,
            name: name.into(),
            field,
            message: message.into(),
        }
    }
}
