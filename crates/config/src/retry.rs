//! Batch write retry configuration
//!
//! Bounds the partial-failure retry loop used by batch sinks.
//!
//! # Example
//!
//! ```toml
//! [retry]
//! max_retries = 3
//! retry_base_delay_ms = 100
//! max_delay = "5s"
//! backoff = "linear"
//! ```

use serde::Deserialize;
use std::time::Duration;

/// Backoff curve applied between attempts
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// `base * n`
    Linear,
    /// `base * 2^(n-1)` (default)
    #[default]
    Exponential,
}

/// Retry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt before the batch fails permanently
    /// Default: 3
    pub max_retries: u32,

    /// Base backoff delay in milliseconds
    /// Default: 100
    pub retry_base_delay_ms: u64,

    /// Upper bound on a single backoff delay
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,

    /// Backoff curve
    /// Default: exponential
    pub backoff: BackoffKind,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_base_delay_ms: 100,
            max_delay: Duration::from_secs(5),
            backoff: BackoffKind::Exponential,
        }
    }
}
