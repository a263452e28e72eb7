//! Assembler - Fork, admit and run pipelines for one invocation
//!
//! ```text
//!                       ┌─→ fork(p1) ─→ [permit] ─→ stages ─→ end_pipeline
//! UoW ─→ route(rules) ──┤
//!                       └─→ fork(p2) ─→ [permit] ─→ stages ─┐
//!                                                           ▼
//!                              batches of ≤ batch_size ─→ sink ─→ unbatch ─→ end_pipeline
//! ```
//!
//! Each pipeline admits at most `parallelism` UoWs (or sink batches) at a
//! time. The pipeline context is derived after admission, so the wait for
//! a permit shows up as `channel.wait.time`. Every fork ends its pipeline
//! exactly once, whether it succeeded or faulted.

use crate::metrics::{AssemblerMetrics, MetricsSnapshot};
use crate::pipeline::Pipeline;
use crate::set::PipelineSet;
use sluice_metrics::FunctionMetrics;
use sluice_protocol::{Fault, FaultError, StageResult, UnitOfWork};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// What the assembler produced for one invocation
#[derive(Debug, Default)]
pub struct AssemblerOutput {
    /// Finished forks; faults appear here only with `include_errors`
    pub results: Vec<StageResult>,
    /// Side channel for faults when `include_errors` is off
    pub faults: Vec<Fault>,
    /// UoWs no rule accepted
    pub unmatched: usize,
    /// Counters for this run only
    pub summary: MetricsSnapshot,
}

impl AssemblerOutput {
    /// Metrics contexts of every finished fork, faulted ones included
    pub fn contexts(&self) -> impl Iterator<Item = &sluice_metrics::MetricsContext> {
        self.results
            .iter()
            .map(|result| match result {
                Ok(uow) => uow,
                Err(fault) => &*fault.uow,
            })
            .chain(self.faults.iter().map(|fault| &*fault.uow))
            .filter_map(|uow| uow.metrics.as_ref())
    }

    /// Every fault, wherever it was routed
    pub fn all_faults(&self) -> impl Iterator<Item = &Fault> {
        self.results
            .iter()
            .filter_map(|result| result.as_ref().err())
            .chain(self.faults.iter())
    }
}

/// Runs a [`PipelineSet`] over a finite sequence of UoWs
#[derive(Debug)]
pub struct Assembler {
    pipelines: Arc<PipelineSet>,
    include_errors: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Stages,
    Sink,
}

impl Assembler {
    pub fn new(pipelines: PipelineSet) -> Self {
        Self {
            pipelines: Arc::new(pipelines),
            include_errors: false,
        }
    }

    /// Merge faults into `results` instead of the side channel
    pub fn include_errors(mut self, include: bool) -> Self {
        self.include_errors = include;
        self
    }

    pub fn pipelines(&self) -> &PipelineSet {
        &self.pipelines
    }

    /// Route, fork and run every UoW through its pipelines
    ///
    /// Every UoW counts towards `function`'s `uow.count`, matched or not.
    /// Counters start from zero on every call.
    pub async fn run<I>(&self, uows: I, function: &FunctionMetrics) -> AssemblerOutput
    where
        I: IntoIterator<Item = UnitOfWork>,
    {
        info!(
            pipelines = self.pipelines.len(),
            include_errors = self.include_errors,
            "assembler starting"
        );

        let metrics = Arc::new(AssemblerMetrics::new());
        let mut forks: Vec<Vec<UnitOfWork>> = vec![Vec::new(); self.pipelines.len()];
        let mut unmatched = 0;

        for uow in uows {
            function.record_uow();
            let matched = self.pipelines.route(&uow);
            metrics.record_received(matched.len());

            if matched.is_empty() {
                unmatched += 1;
                debug!(event_type = %uow.event.event_type, "no pipeline matched");
                continue;
            }

            for index in matched {
                if let Some(pipeline) = self.pipelines.get(index) {
                    forks[index].push(uow.fork(pipeline.id().clone(), function.context().clone()));
                }
            }
        }

        let mut tasks = JoinSet::new();
        for (index, forks) in forks.into_iter().enumerate() {
            let Some(pipeline) = self.pipelines.get(index) else {
                continue;
            };
            if forks.is_empty() {
                continue;
            }
            let pipeline = Arc::clone(pipeline);
            let metrics = Arc::clone(&metrics);
            tasks.spawn(async move { run_pipeline(pipeline, forks, metrics).await });
        }

        let mut output = AssemblerOutput {
            unmatched,
            ..AssemblerOutput::default()
        };
        while let Some(joined) = tasks.join_next().await {
            let results = match joined {
                Ok(results) => results,
                Err(e) => {
                    warn!(error = %e, "pipeline task failed");
                    metrics.record_aborted();
                    continue;
                }
            };
            for result in results {
                match result {
                    Err(fault) if !self.include_errors => output.faults.push(fault),
                    other => output.results.push(other),
                }
            }
        }

        let snapshot = metrics.snapshot();
        info!(
            uows_received = snapshot.uows_received,
            uows_unmatched = snapshot.uows_unmatched,
            forks_created = snapshot.forks_created,
            forks_completed = snapshot.forks_completed,
            forks_faulted = snapshot.forks_faulted,
            batches_written = snapshot.batches_written,
            batches_failed = snapshot.batches_failed,
            tasks_aborted = snapshot.tasks_aborted,
            match_rate = snapshot.match_rate().unwrap_or(0.0),
            fault_rate = snapshot.fault_rate().unwrap_or(0.0),
            "assembler finished"
        );

        output.summary = snapshot;
        output
    }
}

/// Run one pipeline's forks through its stages and sink
async fn run_pipeline(
    pipeline: Arc<Pipeline>,
    forks: Vec<UnitOfWork>,
    metrics: Arc<AssemblerMetrics>,
) -> Vec<StageResult> {
    let semaphore = Arc::new(Semaphore::new(pipeline.parallelism()));
    let staged = run_bounded(&pipeline, &semaphore, forks, Phase::Stages, &metrics).await;

    let Some(sink) = pipeline.sink() else {
        return staged
            .into_iter()
            .map(|result| finish(result, &metrics))
            .collect();
    };

    let mut finished = Vec::with_capacity(staged.len());
    let mut ready = Vec::with_capacity(staged.len());
    for result in staged {
        match result {
            Ok(uow) => ready.push(uow),
            Err(fault) => finished.push(finish(Err(fault), &metrics)),
        }
    }

    let mut batches = Vec::with_capacity(ready.len().div_ceil(sink.batch_size()));
    let mut ready = ready.into_iter().peekable();
    while ready.peek().is_some() {
        let siblings: Vec<UnitOfWork> = ready.by_ref().take(sink.batch_size()).collect();
        batches.push(UnitOfWork::batched(siblings));
    }

    for result in run_bounded(&pipeline, &semaphore, batches, Phase::Sink, &metrics).await {
        metrics.record_batch(result.is_ok());
        match result {
            Ok(batch) => finished.extend(
                batch
                    .unbatch()
                    .into_iter()
                    .map(|uow| finish(Ok(uow), &metrics)),
            ),
            Err(fault) => finished.extend(
                fault
                    .unbatch()
                    .into_iter()
                    .map(|fault| finish(Err(fault), &metrics)),
            ),
        }
    }

    finished
}

/// Run `uows` concurrently, at most one per semaphore permit
///
/// A task that panics is reported as an `Aborted` fault carrying the UoW
/// as it was before the task started.
async fn run_bounded(
    pipeline: &Arc<Pipeline>,
    semaphore: &Arc<Semaphore>,
    uows: Vec<UnitOfWork>,
    phase: Phase,
    metrics: &AssemblerMetrics,
) -> Vec<StageResult> {
    let mut pending: Vec<Option<UnitOfWork>> = uows.iter().cloned().map(Some).collect();
    let mut tasks = JoinSet::new();

    for (slot, uow) in uows.into_iter().enumerate() {
        let pipeline = Arc::clone(pipeline);
        let semaphore = Arc::clone(semaphore);
        tasks.spawn(async move {
            // the semaphore is never closed
            let _permit = semaphore.acquire_owned().await.ok();
            let result = match phase {
                Phase::Stages => pipeline.stages().process(admit(uow)).await,
                Phase::Sink => match pipeline.sink() {
                    Some(sink) => sink.chain().process(uow).await,
                    None => Ok(uow),
                },
            };
            (slot, result)
        });
    }

    let mut results = Vec::with_capacity(pending.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((slot, result)) => {
                pending[slot] = None;
                results.push(result);
            }
            Err(e) => {
                warn!(pipeline = %pipeline.id(), error = %e, "stage task aborted");
                metrics.record_aborted();
            }
        }
    }

    for uow in pending.into_iter().flatten() {
        let uow = match phase {
            Phase::Stages => admit(uow),
            Phase::Sink => uow,
        };
        let error = FaultError::Aborted(format!("pipeline '{}' task did not complete", pipeline.id()));
        results.push(Err(Fault::new(uow, error)));
    }

    results
}

/// Derive the pipeline context once the fork has been admitted
fn admit(mut uow: UnitOfWork) -> UnitOfWork {
    let pipeline = uow.pipeline_name().to_string();
    if let Some(ctx) = uow.metrics.as_mut() {
        *ctx = ctx.start_pipeline(&pipeline);
    }
    uow
}

/// End the fork's pipeline exactly once
fn finish(mut result: StageResult, metrics: &AssemblerMetrics) -> StageResult {
    let uow = match &mut result {
        Ok(uow) => {
            metrics.record_completed();
            uow
        }
        Err(fault) => {
            metrics.record_faulted();
            &mut *fault.uow
        }
    };
    if let Some(ctx) = uow.metrics_mut() {
        ctx.end_pipeline();
    }
    result
}

#[cfg(test)]
#[path = "assembler_test.rs"]
mod tests;
