//! One function invocation: a finite batch of UoWs in, a report out

use crate::assembler::{Assembler, AssemblerOutput};
use crate::error::Result;
use crate::metrics::MetricsSnapshot;
use crate::set::PipelineSet;
use sluice_config::Config;
use sluice_metrics::{
    AggregatedMetrics, FunctionMetrics, SharedClock, StatsAggregator, StepFilter, SystemClock,
};
use sluice_protocol::{Fault, RecordRef, StageResult, UnitOfWork};
use sluice_transform::StageRegistry;
use std::sync::Arc;

/// Default `batch.utilization` denominator
pub const DEFAULT_BATCH_SIZE_CEILING: usize = 100;

/// Runs batches through an [`Assembler`] and aggregates their metrics
#[derive(Debug)]
pub struct Invocation {
    assembler: Assembler,
    clock: SharedClock,
    steps: StepFilter,
    batch_size_ceiling: usize,
}

impl Invocation {
    pub fn new(assembler: Assembler) -> Self {
        Self {
            assembler,
            clock: SystemClock::shared(),
            steps: StepFilter::Disabled,
            batch_size_ceiling: DEFAULT_BATCH_SIZE_CEILING,
        }
    }

    /// Build pipelines, step filter and batch ceiling from configuration
    pub fn from_config(config: &Config, registry: &StageRegistry) -> Result<Self> {
        let pipelines = PipelineSet::from_config(config, registry)?;
        let steps = if config.metrics.enabled {
            StepFilter::from_names(config.metrics.step_metrics.iter().map(String::as_str))
        } else {
            StepFilter::Disabled
        };

        Ok(
            Self::new(Assembler::new(pipelines).include_errors(config.global.include_errors))
                .with_step_filter(steps)
                .with_batch_size_ceiling(config.global.batch_size_ceiling),
        )
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_step_filter(mut self, steps: StepFilter) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_batch_size_ceiling(mut self, ceiling: usize) -> Self {
        self.batch_size_ceiling = ceiling;
        self
    }

    pub fn assembler(&self) -> &Assembler {
        &self.assembler
    }

    /// Process one batch published at `publish_time` (epoch millis)
    pub async fn run(&self, publish_time: i64, uows: Vec<UnitOfWork>) -> InvocationReport {
        let function = FunctionMetrics::start_for_batch(
            publish_time,
            uows.len(),
            self.batch_size_ceiling,
            Arc::clone(&self.clock),
            self.steps.clone(),
        );

        let output = self.assembler.run(uows, &function).await;
        let metrics = StatsAggregator::aggregate(&function, output.contexts());

        InvocationReport {
            summary: output.summary,
            output,
            metrics,
        }
    }
}

/// Outcome of one invocation
#[derive(Debug)]
pub struct InvocationReport {
    pub output: AssemblerOutput,
    pub metrics: AggregatedMetrics,
    pub summary: MetricsSnapshot,
}

impl InvocationReport {
    pub fn results(&self) -> &[StageResult] {
        &self.output.results
    }

    /// Faults routed to the side channel
    pub fn faults(&self) -> &[Fault] {
        &self.output.faults
    }

    pub fn unmatched(&self) -> usize {
        self.output.unmatched
    }

    /// Number of faulted forks, wherever they were routed
    pub fn fault_count(&self) -> usize {
        self.output.all_faults().count()
    }

    /// Source records with at least one faulted fork, by sequence
    ///
    /// These are the records to report back as failed; every other record
    /// can be acknowledged.
    pub fn failed_records(&self) -> Vec<&RecordRef> {
        let mut records: Vec<&RecordRef> = self
            .output
            .all_faults()
            .filter_map(|fault| fault.uow.record.as_ref())
            .collect();
        records.sort_by(|a, b| (a.sequence, &a.id).cmp(&(b.sequence, &b.id)));
        records.dedup();
        records
    }

    pub fn is_success(&self) -> bool {
        self.fault_count() == 0
    }
}

#[cfg(test)]
#[path = "invocation_test.rs"]
mod tests;
