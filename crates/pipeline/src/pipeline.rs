//! A single rule-selected pipeline
//!
//! A pipeline is a rule, a timed stage chain and an optional batched sink.
//! Every stage is wrapped so it records `io.wait.time` and `io.time` under
//! its own name.

use crate::error::{PipelineError, Result};
use sluice_config::{GlobalConfig, KEY_DELIMITER, PipelineConfig, RetryConfig};
use sluice_connectors::create_sink;
use sluice_protocol::PipelineId;
use sluice_routing::Rule;
use sluice_transform::{Chain, Stage, StageRegistry, build_chain};

/// Sink chain run once per batch of at most `batch_size` siblings
#[derive(Debug)]
pub struct BatchSink {
    batch_size: usize,
    chain: Chain,
}

impl BatchSink {
    pub fn new(batch_size: usize, stage: Box<dyn Stage>) -> Self {
        Self {
            batch_size: batch_size.max(1),
            chain: Chain::new(vec![stage]).timed(),
        }
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }
}

/// Rule plus the work run for every UoW it selects
#[derive(Debug)]
pub struct Pipeline {
    rule: Rule,
    stages: Chain,
    sink: Option<BatchSink>,
    parallelism: usize,
}

impl Pipeline {
    /// A pipeline with no stages, no sink and a parallelism of 1
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            stages: Chain::empty(),
            sink: None,
            parallelism: 1,
        }
    }

    /// Build from a `[[pipelines]]` entry
    pub fn from_config(
        config: &PipelineConfig,
        global: &GlobalConfig,
        retry: &RetryConfig,
        registry: &StageRegistry,
    ) -> Result<Self> {
        let rule = Rule::try_from(config)?;
        let chain = build_chain(registry, &config.stages)
            .map_err(|e| PipelineError::transform(&config.id, e))?;

        let mut pipeline = Self::new(rule)
            .with_chain(chain)
            .with_parallelism(config.effective_parallelism(global.parallelism));

        if let Some(sink) = &config.sink {
            let stage =
                create_sink(sink, retry).map_err(|e| PipelineError::connector(&config.id, e))?;
            pipeline = pipeline.with_sink(sink.batch_size, stage);
        }

        Ok(pipeline)
    }

    pub fn with_stages(self, stages: Vec<Box<dyn Stage>>) -> Self {
        self.with_chain(Chain::new(stages))
    }

    pub fn with_chain(mut self, chain: Chain) -> Self {
        self.stages = chain.timed();
        self
    }

    pub fn with_sink(mut self, batch_size: usize, stage: Box<dyn Stage>) -> Self {
        self.sink = Some(BatchSink::new(batch_size, stage));
        self
    }

    /// Concurrent UoWs (and sink batches) admitted at once; at least 1
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    #[inline]
    pub fn id(&self) -> &PipelineId {
        &self.rule.id
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn stages(&self) -> &Chain {
        &self.stages
    }

    pub fn sink(&self) -> Option<&BatchSink> {
        self.sink.as_ref()
    }

    #[inline]
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Stage names followed by the sink name
    pub fn step_names(&self) -> Vec<&str> {
        let mut names = self.stages.names();
        if let Some(sink) = &self.sink {
            names.extend(sink.chain.names());
        }
        names
    }

    /// Reject stage names that would break metric keys
    pub(crate) fn validate(&self) -> Result<()> {
        for name in self.step_names() {
            if name.is_empty() {
                return Err(PipelineError::invalid_stage_name(
                    self.id().as_str(),
                    name,
                    "must not be empty",
                ));
            }
            if name.contains(KEY_DELIMITER) {
                return Err(PipelineError::invalid_stage_name(
                    self.id().as_str(),
                    name,
                    "must not contain '|'",
                ));
            }
        }
        Ok(())
    }
}
