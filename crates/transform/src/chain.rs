//! Stage Chain - Sequential per-UoW processing
//!
//! The `Chain` applies stages in order to one unit of work.
//!
//! # Design
//!
//! - **Zero-cost when empty**: Empty chain returns the UoW unchanged
//! - **Sequential execution**: Each stage receives the previous output
//! - **Fail-fast**: The first `Fault` stops the chain and is returned as-is

use crate::timed::Timed;
use crate::Stage;
use sluice_protocol::{StageResult, UnitOfWork};

#[cfg(test)]
#[path = "chain_test.rs"]
mod tests;

/// Chain of stages applied sequentially
pub struct Chain {
    /// Ordered list of stages
    stages: Vec<Box<dyn Stage>>,

    /// Whether any stages are active
    enabled: bool,
}

impl Chain {
    /// Create a new chain
    ///
    /// Only enabled stages are included.
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        let active: Vec<_> = stages.into_iter().filter(|s| s.enabled()).collect();
        let enabled = !active.is_empty();

        Self {
            stages: active,
            enabled,
        }
    }

    /// Create an empty chain (no-op)
    pub fn empty() -> Self {
        Self {
            stages: Vec::new(),
            enabled: false,
        }
    }

    /// Wrap every stage so it records step metrics under its name
    pub fn timed(self) -> Self {
        let stages = self
            .stages
            .into_iter()
            .map(|stage| Box::new(Timed::new(stage)) as Box<dyn Stage>)
            .collect();
        Self {
            stages,
            enabled: self.enabled,
        }
    }

    /// Check if the chain has any active stages
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Names of all active stages, in order
    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run `uow` through every stage in sequence
    pub async fn process(&self, uow: UnitOfWork) -> StageResult {
        if !self.enabled {
            return Ok(uow);
        }

        let mut current = uow;
        for stage in &self.stages {
            current = stage.process(current).await?;
        }
        Ok(current)
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("stages", &self.names())
            .finish()
    }
}
