//! Error types for connectors

use thiserror::Error;

/// Errors raised by submitters and sink construction
///
/// Any error returned from [`BatchSubmitter::submit`](crate::BatchSubmitter::submit)
/// is treated as permanent by the retry engine. Per-record rejections are
/// reported in the response instead.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// Record could not be encoded
    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing to the destination failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Destination refused the whole request
    #[error("submission failed: {0}")]
    Unavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Unknown sink type
    #[error("Unknown sink type: {0}")]
    UnknownSink(String),
}

/// Result type for connector operations
pub type Result<T> = std::result::Result<T, ConnectorError>;

impl ConnectorError {
    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    #[inline]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
