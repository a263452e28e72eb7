//! Per-UoW metrics context
//!
//! A context pairs a [`Timer`] with gauge observations, both keyed under
//! the pipeline the UoW is running in. Forks take their own context by
//! value so no two UoWs ever share a timer.

use crate::keys::{self, ALL_STEPS_WILDCARD};
use crate::timer::Timer;
use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Arc;

/// Pipeline name used before `start_pipeline`
pub const UNDEFINED_PIPELINE: &str = "undefined";

/// Which steps record `io.*` checkpoints and step gauges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StepFilter {
    /// No step metrics
    #[default]
    Disabled,
    /// Every step
    All,
    /// Only the named steps
    Only(HashSet<String>),
}

impl StepFilter {
    /// Build from configured names: empty disables, `*` enables all
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: HashSet<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            Self::Disabled
        } else if names.contains(ALL_STEPS_WILDCARD) {
            Self::All
        } else {
            Self::Only(names)
        }
    }

    #[inline]
    pub fn is_enabled(&self, step: &str) -> bool {
        match self {
            Self::Disabled => false,
            Self::All => true,
            Self::Only(names) => names.contains(step),
        }
    }
}

/// Timer and gauges for one unit of work
#[derive(Debug, Clone)]
pub struct MetricsContext {
    pipeline: String,
    timer: Timer,
    gauges: BTreeMap<String, Vec<f64>>,
    steps: Arc<StepFilter>,
}

impl MetricsContext {
    /// Context not yet scoped to a pipeline
    pub fn new(timer: Timer, steps: Arc<StepFilter>) -> Self {
        Self {
            pipeline: UNDEFINED_PIPELINE.to_string(),
            timer,
            gauges: BTreeMap::new(),
            steps,
        }
    }

    /// Derive a context for `pipeline`
    ///
    /// The timer is cloned with its checkpoints, gauges start empty, and
    /// `<pipeline>|channel.wait.time` is recorded immediately.
    pub fn start_pipeline(&self, pipeline: &str) -> Self {
        let mut ctx = Self {
            pipeline: pipeline.to_string(),
            timer: self.timer.clone(),
            gauges: BTreeMap::new(),
            steps: Arc::clone(&self.steps),
        };
        ctx.timer
            .checkpoint(keys::pipeline_key(pipeline, keys::CHANNEL_WAIT_TIME));
        ctx
    }

    /// Record `<pipeline>|pipeline.time` measured from the batch start
    pub fn end_pipeline(&mut self) -> i64 {
        let key = keys::pipeline_key(&self.pipeline, keys::PIPELINE_TIME);
        self.timer.end(key)
    }

    /// Record `<pipeline>|<step>|io.wait.time` if the step is enabled
    pub fn start_step(&mut self, step: &str) {
        if self.steps.is_enabled(step) {
            let key = keys::step_key(&self.pipeline, step, keys::IO_WAIT_TIME);
            self.timer.checkpoint(key);
        }
    }

    /// Record `<pipeline>|<step>|io.time` if the step is enabled
    pub fn end_step(&mut self, step: &str) {
        if self.steps.is_enabled(step) {
            let key = keys::step_key(&self.pipeline, step, keys::IO_TIME);
            self.timer.checkpoint(key);
        }
    }

    /// Append `value` under `<pipeline>|<key>`
    pub fn gauge(&mut self, key: &str, value: f64) {
        self.gauges
            .entry(keys::pipeline_key(&self.pipeline, key))
            .or_default()
            .push(value);
    }

    /// Append every value under `<pipeline>|<key>`, keeping order
    pub fn gauges(&mut self, key: &str, values: impl IntoIterator<Item = f64>) {
        self.gauges
            .entry(keys::pipeline_key(&self.pipeline, key))
            .or_default()
            .extend(values);
    }

    /// Append `value` under `<pipeline>|<step>|<key>` if the step is enabled
    pub fn step_gauge(&mut self, step: &str, key: &str, value: f64) {
        if self.steps.is_enabled(step) {
            self.gauges
                .entry(keys::step_key(&self.pipeline, step, key))
                .or_default()
                .push(value);
        }
    }

    /// Bracket `future` with `start_step` / `end_step`
    pub async fn wrap<F: Future>(&mut self, step: &str, future: F) -> F::Output {
        self.start_step(step);
        let output = future.await;
        self.end_step(step);
        output
    }

    #[inline]
    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    #[inline]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Recorded checkpoints
    pub fn checkpoints(&self) -> &BTreeMap<String, i64> {
        self.timer.checkpoints()
    }

    /// Recorded gauge observations
    pub fn gauge_values(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.gauges
    }

    pub fn step_filter(&self) -> &StepFilter {
        &self.steps
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
