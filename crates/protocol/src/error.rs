//! Protocol error types
//!
//! Errors raised while decoding input records into units of work.

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A line of input is not a valid event record
    #[error("invalid record at line {line}: {source}")]
    InvalidRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Record decoded but a required field is empty
    #[error("record at line {line} is missing required field '{field}'")]
    MissingField { line: usize, field: &'static str },

    /// Reading the input failed
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    #[inline]
    pub fn invalid_record(line: usize, source: serde_json::Error) -> Self {
        Self::InvalidRecord { line, source }
    }

    #[inline]
    pub fn missing_field(line: usize, field: &'static str) -> Self {
        Self::MissingField { line, field }
    }

    /// Whether decoding can skip this record and continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidRecord { .. } | Self::MissingField { .. })
    }
}
