//! Function-level accumulator
//!
//! One `FunctionMetrics` exists per invocation. It holds the batch-level
//! scalars and the template context every pipeline fork derives from.

use crate::Counter;
use crate::clock::SharedClock;
use crate::context::{MetricsContext, StepFilter};
use crate::keys;
use crate::timer::Timer;
use std::sync::Arc;

/// Per-invocation metrics accumulator
#[derive(Debug)]
pub struct FunctionMetrics {
    template: MetricsContext,
    batch_size: usize,
    batch_utilization: f64,
    uow_count: Counter,
}

impl FunctionMetrics {
    /// Start metrics for a batch published at `publish_time` (epoch millis)
    ///
    /// `batch.utilization` is `batch_size / configured_batch_size`, or 0
    /// when the configured ceiling is 0.
    pub fn start_for_batch(
        publish_time: i64,
        batch_size: usize,
        configured_batch_size: usize,
        clock: SharedClock,
        steps: StepFilter,
    ) -> Self {
        let batch_utilization = if configured_batch_size == 0 {
            0.0
        } else {
            batch_size as f64 / configured_batch_size as f64
        };

        Self {
            template: MetricsContext::new(Timer::new(publish_time, clock), Arc::new(steps)),
            batch_size,
            batch_utilization,
            uow_count: Counter::new(),
        }
    }

    /// Count one incoming unit of work
    #[inline]
    pub fn record_uow(&self) {
        self.uow_count.inc();
    }

    #[inline]
    pub fn uow_count(&self) -> u64 {
        self.uow_count.get()
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[inline]
    pub fn batch_utilization(&self) -> f64 {
        self.batch_utilization
    }

    /// Unscoped context shared by every fork
    pub fn context(&self) -> &MetricsContext {
        &self.template
    }

    /// Fresh context scoped to `pipeline`
    pub fn start_pipeline(&self, pipeline: &str) -> MetricsContext {
        self.template.start_pipeline(pipeline)
    }

    /// Function-scope scalars in output order
    pub fn scalars(&self) -> [(&'static str, f64); 3] {
        [
            (keys::BATCH_SIZE, self.batch_size as f64),
            (keys::BATCH_UTILIZATION, self.batch_utilization),
            (keys::UOW_COUNT, self.uow_count() as f64),
        ]
    }
}
