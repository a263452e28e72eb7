//! Registered pipelines and their routing rules

use crate::error::Result;
use crate::pipeline::Pipeline;
use sluice_config::Config;
use sluice_protocol::UnitOfWork;
use sluice_routing::{RuleSet, RuleSetBuilder};
use sluice_transform::StageRegistry;
use std::sync::Arc;
use tracing::info;

/// Every pipeline of an invocation
///
/// Pipeline `i` is selected by rule `i` of the inner [`RuleSet`].
#[derive(Debug, Default)]
pub struct PipelineSet {
    rules: RuleSet,
    pipelines: Vec<Arc<Pipeline>>,
}

impl PipelineSet {
    pub fn builder() -> PipelineSetBuilder {
        PipelineSetBuilder::default()
    }

    /// Build every enabled pipeline in declaration order
    pub fn from_config(config: &Config, registry: &StageRegistry) -> Result<Self> {
        let mut builder = Self::builder();
        for pipeline in config.enabled_pipelines() {
            builder.add(Pipeline::from_config(
                pipeline,
                &config.global,
                &config.retry,
                registry,
            )?)?;
        }

        let set = builder.build();
        info!(
            pipelines = set.len(),
            disabled = config.pipelines.len() - set.len(),
            "pipelines registered"
        );
        Ok(set)
    }

    /// Indices of every pipeline whose rule accepts `uow`
    pub fn route(&self, uow: &UnitOfWork) -> Vec<usize> {
        self.rules.route(uow)
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Pipeline>> {
        self.pipelines.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Pipeline>> {
        self.pipelines.iter()
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

/// Validates and collects pipelines
#[derive(Debug, Default)]
pub struct PipelineSetBuilder {
    rules: RuleSetBuilder,
    pipelines: Vec<Arc<Pipeline>>,
}

impl PipelineSetBuilder {
    /// Register a pipeline
    ///
    /// # Errors
    ///
    /// Fails on a duplicate or malformed pipeline id, or a stage name that
    /// is empty or contains `|`.
    pub fn add(&mut self, pipeline: Pipeline) -> Result<&mut Self> {
        pipeline.validate()?;
        self.rules.add(pipeline.rule().clone())?;
        self.pipelines.push(Arc::new(pipeline));
        Ok(self)
    }

    pub fn build(self) -> PipelineSet {
        PipelineSet {
            rules: self.rules.build(),
            pipelines: self.pipelines,
        }
    }
}
