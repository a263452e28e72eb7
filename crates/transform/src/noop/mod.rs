//! Noop Stage - Pass-through stage
//!
//! The `NoopStage` returns every UoW unchanged. It's useful for:
//! - Exercising chain and timing infrastructure
//! - Measuring per-stage overhead in step metrics

use crate::{Stage, StageFuture};
use sluice_protocol::UnitOfWork;


/// A stage that passes units of work through unchanged
#[derive(Debug, Clone, Default)]
pub struct NoopStage {
    name: Option<String>,
}

impl NoopStage {
    /// Create a new noop stage
    #[inline]
    pub const fn new() -> Self {
        Self { name: None }
    }

    /// Override the stage name used in step metrics
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

impl Stage for NoopStage {
    fn process<'a>(&'a self, uow: UnitOfWork) -> StageFuture<'a> {
        Box::pin(async move { Ok(uow) })
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("noop")
    }
}
