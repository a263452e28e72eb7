//! Pipeline error types
//!
//! Everything here is raised while registering pipelines; running an
//! invocation never fails as a whole, only per UoW.

use sluice_config::ConfigError;
use sluice_connectors::ConnectorError;
use sluice_routing::RoutingError;
use sluice_transform::TransformError;
use thiserror::Error;

/// Pipeline registration errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration failed to load or validate
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Rule could not be registered
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// Stage chain could not be built
    #[error("pipeline '{pipeline}': {source}")]
    Transform {
        pipeline: String,
        source: TransformError,
    },

    /// Sink could not be built
    #[error("pipeline '{pipeline}': {source}")]
    Connector {
        pipeline: String,
        source: ConnectorError,
    },

    /// Stage name unusable as a metric key segment
    #[error("pipeline '{pipeline}': invalid stage name '{stage}': {reason}")]
    InvalidStageName {
        pipeline: String,
        stage: String,
        reason: &'static str,
    },
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    #[inline]
    pub fn transform(pipeline: impl Into<String>, source: TransformError) -> Self {
        Self::Transform {
            pipeline: pipeline.into(),
            source,
        }
    }

    #[inline]
    pub fn connector(pipeline: impl Into<String>, source: ConnectorError) -> Self {
        Self::Connector {
            pipeline: pipeline.into(),
            source,
        }
    }

    #[inline]
    pub fn invalid_stage_name(
        pipeline: impl Into<String>,
        stage: impl Into<String>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidStageName {
            pipeline: pipeline.into(),
            stage: stage.into(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::invalid_stage_name("p1", "a|b", "must not contain '|'");
        assert!(err.to_string().contains("p1"));
        assert!(err.to_string().contains("a|b"));

        let err = PipelineError::connector("p1", ConnectorError::UnknownSink("kinesis".into()));
        assert!(err.to_string().contains("kinesis"));

        let err = PipelineError::transform("p2", TransformError::config("bad option"));
        assert!(err.to_string().contains("p2"));
        assert!(err.to_string().contains("bad option"));
    }

    #[test]
    fn test_routing_error_converts() {
        let err: PipelineError = RoutingError::duplicate_rule("p1").into();
        assert!(matches!(err, PipelineError::Routing(_)));
    }
}
