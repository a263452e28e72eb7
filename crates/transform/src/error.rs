//! Transform error types
//!
//! Errors raised while building stages. Failures while processing a unit
//! of work are reported as a `Fault` instead, so the UoW is never lost.

use thiserror::Error;

/// Errors that can occur while building stages
#[derive(Debug, Error)]
pub enum TransformError {
    /// Invalid stage configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// No factory registered for a stage type
    #[error("unknown stage type '{stage_type}', available: [{available}]")]
    UnknownStageType {
        stage_type: String,
        available: String,
    },

    /// A factory is already registered under this type name
    #[error("stage factory '{0}' already registered")]
    DuplicateFactory(String),
}

impl TransformError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
