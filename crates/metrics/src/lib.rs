//! Sluice - Metrics
//!
//! Per-unit-of-work timing and gauges, reduced into statistical summaries
//! at the end of an invocation.
//!
//! # Overview
//!
//! This crate provides:
//! - A checkpoint [`Timer`] reading time through a [`Clock`]
//! - [`MetricsContext`], carried by every unit of work and scoped to one
//!   pipeline
//! - [`FunctionMetrics`], the per-invocation accumulator
//! - [`StatsAggregator`], folding every context into [`AggregatedMetrics`]
//! - Formatters for embedded metric format, JSON and human output
//!
//! # Key Layout
//!
//! ```text
//! uow.count                    function scope
//! <pipeline>|pipeline.time     pipeline scope
//! <pipeline>|<step>|io.time    step scope
//! ```
//!
//! # Example
//!
//! ```
//! use sluice_metrics::{FunctionMetrics, ManualClock, StatsAggregator, StepFilter};
//!
//! let (clock, shared) = ManualClock::shared(1000);
//! let function = FunctionMetrics::start_for_batch(1000, 1, 10, shared, StepFilter::All);
//! function.record_uow();
//!
//! let mut ctx = function.start_pipeline("p1");
//! clock.advance(250);
//! ctx.end_pipeline();
//!
//! let metrics = StatsAggregator::aggregate(&function, [&ctx]);
//! assert_eq!(metrics.scalar("p1|utilization"), Some(1.0));
//! assert_eq!(metrics.stats("p1|pipeline.time").map(|s| s.max), Some(250.0));
//! ```

mod clock;
mod context;
pub mod format;
mod function;
pub mod keys;
mod stats;
mod timer;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use context::{MetricsContext, StepFilter, UNDEFINED_PIPELINE};
pub use format::{EmfFormatter, HumanFormatter, JsonFormatter, MetricsFormatter};
pub use function::FunctionMetrics;
pub use keys::MetricScope;
pub use stats::{AggregatedMetrics, MetricValue, Stats, StatsAggregator};
pub use timer::Timer;

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter wrapper for convenient metric operations
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// Create a new counter initialized to 0
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Increment the counter by `val` (relaxed ordering for performance)
    #[inline]
    pub fn add(&self, val: u64) {
        self.0.fetch_add(val, Ordering::Relaxed);
    }

    /// Increment the counter by 1
    #[inline]
    pub fn inc(&self) {
        self.add(1);
    }

    /// Get the current value (relaxed ordering)
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}
