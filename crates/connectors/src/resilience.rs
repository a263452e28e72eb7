//! Partial-failure retry for batched writes
//!
//! A batched write may be partly rejected. Only the rejected records are
//! resubmitted, after a backoff delay, until every record is accepted or
//! the retry budget runs out.
//!
//! ```text
//! attempt 1: [a, b, c]  → [ok, err, err]
//! attempt 2: [b, c]     → [ok, err]
//! attempt 3: [c]        → [ok]
//! result:    [a:1, b:2, c:3]   (each position keeps its latest outcome)
//! ```

use crate::error::ConnectorError;
use crate::record::Record;
use crate::response::{Accepted, BatchResponse, ItemResult};
use crate::submitter::BatchSubmitter;
use sluice_config::{BackoffKind, RetryConfig};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Caller-supplied delay curve, indexed by attempt number
pub type DelayFn = Arc<dyn Fn(usize) -> Duration + Send + Sync>;

#[derive(Clone)]
enum Curve {
    Builtin(BackoffKind),
    Custom(DelayFn),
}

/// Delay schedule between attempts
#[derive(Clone)]
pub struct Backoff {
    curve: Curve,
    base: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(kind: BackoffKind, base: Duration, max: Duration) -> Self {
        Self {
            curve: Curve::Builtin(kind),
            base,
            max,
        }
    }

    /// Delay computed by `f` for every attempt after the first, capped at `max`
    pub fn custom<F>(max: Duration, f: F) -> Self
    where
        F: Fn(usize) -> Duration + Send + Sync + 'static,
    {
        Self {
            curve: Curve::Custom(Arc::new(f)),
            base: Duration::ZERO,
            max,
        }
    }

    /// No delay between attempts
    pub fn none() -> Self {
        Self::new(BackoffKind::Linear, Duration::ZERO, Duration::ZERO)
    }

    /// Delay before attempt number `attempt` (0-based)
    ///
    /// The first attempt never waits. Linear grows as `base * n`,
    /// exponential as `base * 2^(n-1)`; both are capped at `max`.
    pub fn delay(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let n = u32::try_from(attempt).unwrap_or(u32::MAX);
        let delay = match &self.curve {
            Curve::Builtin(BackoffKind::Linear) => self.base.saturating_mul(n),
            Curve::Builtin(BackoffKind::Exponential) => {
                self.base.saturating_mul(2u32.saturating_pow(n - 1))
            }
            Curve::Custom(f) => f(attempt),
        };
        delay.min(self.max)
    }
}

impl fmt::Debug for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let curve: &dyn fmt::Debug = match &self.curve {
            Curve::Builtin(kind) => kind,
            Curve::Custom(_) => &"custom",
        };
        f.debug_struct("Backoff")
            .field("curve", curve)
            .field("base", &self.base)
            .field("max", &self.max)
            .finish()
    }
}

impl From<&RetryConfig> for Backoff {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.backoff,
            Duration::from_millis(config.retry_base_delay_ms),
            config.max_delay,
        )
    }
}

/// Bounds for one retried write
#[derive(Debug, Clone)]
pub struct RetryOptions {
    /// Retries after the first attempt
    pub max_retries: usize,
    pub backoff: Backoff,
}

impl RetryOptions {
    pub fn new(max_retries: usize, backoff: Backoff) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }
}

impl From<&RetryConfig> for RetryOptions {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_retries as usize, Backoff::from(config))
    }
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

/// A write that ended without every record accepted
#[derive(Debug, Error)]
pub enum RetryError {
    /// Records were still rejected when the retry budget ran out
    #[error(
        "retries exceeded after {} attempt(s), {} record(s) still rejected",
        .attempts.len(),
        .attempts.last().map_or(0, |last| last.failed_count())
    )]
    RetriesExceeded {
        attempts: Vec<BatchResponse<Accepted>>,
    },

    /// The destination answered with a different number of items
    #[error("misaligned response on attempt {attempt}: sent {expected} record(s), got {actual}")]
    Misaligned {
        attempt: usize,
        expected: usize,
        actual: usize,
    },

    /// The destination failed the whole request
    #[error("connector error on attempt {attempt}: {source}")]
    Connector {
        attempt: usize,
        source: ConnectorError,
    },
}

impl RetryError {
    /// Submissions made before giving up
    pub fn attempts(&self) -> usize {
        match self {
            Self::RetriesExceeded { attempts } => attempts.len(),
            Self::Misaligned { attempt, .. } | Self::Connector { attempt, .. } => *attempt,
        }
    }
}

/// A write where every record was eventually accepted
#[derive(Debug, Clone)]
pub struct RetryOutcome {
    /// Latest outcome per original record, in request order
    pub items: Vec<ItemResult<Accepted>>,
    /// Every response, oldest first
    pub attempts: Vec<BatchResponse<Accepted>>,
}

impl RetryOutcome {
    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }
}

/// Submit `records`, resubmitting only rejected records until all succeed
///
/// An empty batch succeeds without calling the submitter. Errors returned
/// by the submitter are permanent and end the loop immediately.
pub async fn put_batch_with_retry<S>(
    submitter: &S,
    records: &[Record],
    options: &RetryOptions,
) -> Result<RetryOutcome, RetryError>
where
    S: BatchSubmitter + ?Sized,
{
    let mut attempts: Vec<BatchResponse<Accepted>> = Vec::new();
    // original positions submitted in each attempt
    let mut submitted: Vec<Vec<usize>> = Vec::new();
    let mut pending: Vec<usize> = (0..records.len()).collect();

    if records.is_empty() {
        return Ok(RetryOutcome {
            items: Vec::new(),
            attempts,
        });
    }

    loop {
        if attempts.len() > options.max_retries {
            warn!(
                submitter = submitter.name(),
                attempts = attempts.len(),
                rejected = pending.len(),
                "batch write failed permanently, retries exceeded"
            );
            return Err(RetryError::RetriesExceeded { attempts });
        }

        let attempt = attempts.len() + 1;
        if !attempts.is_empty() {
            let delay = options.backoff.delay(attempts.len());
            debug!(
                submitter = submitter.name(),
                attempt,
                pending = pending.len(),
                delay_ms = delay.as_millis() as u64,
                "retrying rejected records after delay"
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        let request: Vec<Record> = pending.iter().map(|&pos| records[pos].clone()).collect();
        let response = match submitter.submit(&request).await {
            Ok(response) => response,
            Err(source) => {
                warn!(
                    submitter = submitter.name(),
                    attempt,
                    error = %source,
                    "batch write failed permanently"
                );
                return Err(RetryError::Connector { attempt, source });
            }
        };

        if response.len() != request.len() {
            warn!(
                submitter = submitter.name(),
                attempt,
                expected = request.len(),
                actual = response.len(),
                "batch write response misaligned with request"
            );
            return Err(RetryError::Misaligned {
                attempt,
                expected: request.len(),
                actual: response.len(),
            });
        }

        let rejected: Vec<usize> = pending
            .iter()
            .zip(response.iter())
            .filter(|(_, item)| item.is_rejected())
            .map(|(&pos, _)| pos)
            .collect();

        attempts.push(response);
        submitted.push(std::mem::replace(&mut pending, rejected));

        if pending.is_empty() {
            let items = reassemble(records.len(), &attempts, &submitted);
            return Ok(RetryOutcome { items, attempts });
        }
    }
}

/// Walk attempts newest to oldest so each position keeps its latest outcome
fn reassemble(
    len: usize,
    attempts: &[BatchResponse<Accepted>],
    submitted: &[Vec<usize>],
) -> Vec<ItemResult<Accepted>> {
    let mut slots: Vec<Option<ItemResult<Accepted>>> = vec![None; len];

    for (response, positions) in attempts.iter().zip(submitted).rev() {
        for (item, &pos) in response.iter().zip(positions) {
            if slots[pos].is_none() {
                slots[pos] = Some(item.clone());
            }
        }
    }

    // the first attempt covers every position
    slots.into_iter().flatten().collect()
}

#[cfg(test)]
#[path = "resilience_test.rs"]
mod tests;
