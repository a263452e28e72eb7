//! Unit of work
//!
//! The value that flows through pipelines. The assembler forks one UoW per
//! matching pipeline; each fork owns its event, attachments and metrics
//! context outright.

use crate::event::Event;
use crate::pipeline_id::PipelineId;
use serde_json::{Map, Value};
use sluice_metrics::{MetricsContext, UNDEFINED_PIPELINE};

/// Reference back to the source record, used to ack or fail it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordRef {
    pub id: String,
    pub sequence: u64,
}

impl RecordRef {
    pub fn new(id: impl Into<String>, sequence: u64) -> Self {
        Self {
            id: id.into(),
            sequence,
        }
    }
}

/// One event moving through a pipeline
#[derive(Debug, Clone, Default)]
pub struct UnitOfWork {
    /// Source record, if the adapter tracks one
    pub record: Option<RecordRef>,
    pub event: Event,
    /// Set when the UoW is forked into a pipeline
    pub pipeline: Option<PipelineId>,
    /// `None` until a pipeline starts
    pub metrics: Option<MetricsContext>,
    /// Siblings coalesced into one batched request
    pub batch: Option<Vec<UnitOfWork>>,
    /// Values attached by stages
    pub attachments: Map<String, Value>,
}

impl UnitOfWork {
    pub fn new(event: Event) -> Self {
        Self {
            event,
            ..Self::default()
        }
    }

    pub fn with_record(mut self, record: RecordRef) -> Self {
        self.record = Some(record);
        self
    }

    /// Copy this UoW into `pipeline` with its own metrics context
    ///
    /// Batched siblings and any previous metrics are not carried over.
    pub fn fork(&self, pipeline: PipelineId, metrics: MetricsContext) -> Self {
        Self {
            record: self.record.clone(),
            event: self.event.clone(),
            pipeline: Some(pipeline),
            metrics: Some(metrics),
            batch: None,
            attachments: self.attachments.clone(),
        }
    }

    /// Coalesce siblings from one pipeline into a single batched UoW
    ///
    /// The batched UoW carries the pipeline of its first sibling and no
    /// metrics of its own.
    pub fn batched(siblings: Vec<UnitOfWork>) -> Self {
        let pipeline = siblings.first().and_then(|uow| uow.pipeline.clone());
        Self {
            pipeline,
            batch: Some(siblings),
            ..Self::default()
        }
    }

    /// Split a batched UoW back into its siblings
    ///
    /// A UoW that is not batched yields itself.
    pub fn unbatch(self) -> Vec<UnitOfWork> {
        match self.batch {
            Some(siblings) => siblings,
            None => vec![self],
        }
    }

    /// Siblings of a batched UoW, or this UoW alone
    pub fn siblings(&self) -> &[UnitOfWork] {
        match self.batch.as_deref() {
            Some(siblings) => siblings,
            None => std::slice::from_ref(self),
        }
    }

    pub fn siblings_mut(&mut self) -> &mut [UnitOfWork] {
        if self.batch.is_some() {
            self.batch.as_deref_mut().unwrap_or_default()
        } else {
            std::slice::from_mut(self)
        }
    }

    #[inline]
    pub fn is_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// Pipeline name, or `undefined` before forking
    pub fn pipeline_name(&self) -> &str {
        self.pipeline
            .as_ref()
            .map_or(UNDEFINED_PIPELINE, PipelineId::as_str)
    }

    pub fn attach(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attachments.insert(key.into(), value.into());
    }

    pub fn attachment(&self, key: &str) -> Option<&Value> {
        self.attachments.get(key)
    }

    /// Mutable access to the metrics context, if one is attached
    pub fn metrics_mut(&mut self) -> Option<&mut MetricsContext> {
        self.metrics.as_mut()
    }

    /// Apply `f` to this UoW's context, or to every sibling's when batched
    pub fn for_each_metrics(&mut self, mut f: impl FnMut(&mut MetricsContext)) {
        match self.batch.as_mut() {
            Some(siblings) => siblings
                .iter_mut()
                .filter_map(|uow| uow.metrics.as_mut())
                .for_each(&mut f),
            None => {
                if let Some(ctx) = self.metrics.as_mut() {
                    f(ctx);
                }
            }
        }
    }
}
