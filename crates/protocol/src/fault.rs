//! Per-UoW faults
//!
//! A stage that cannot process a UoW hands it back inside a [`Fault`] so
//! the caller can still ack, fail or report the original record.

use crate::uow::UnitOfWork;
use thiserror::Error;

/// What went wrong for a faulted UoW
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaultError {
    /// A stage rejected or failed the UoW
    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    /// A batched write failed permanently
    #[error("write failed after {attempts} attempt(s): {message}")]
    Write { attempts: usize, message: String },

    /// The stage task ended without producing a result
    #[error("stage task aborted: {0}")]
    Aborted(String),
}

/// A UoW that failed, together with the reason
#[derive(Debug, Error)]
#[error("fault in pipeline '{}': {error}", .uow.pipeline_name())]
pub struct Fault {
    pub uow: Box<UnitOfWork>,
    pub error: FaultError,
}

/// Result of running a stage over one UoW
pub type StageResult = std::result::Result<UnitOfWork, Fault>;

impl Fault {
    pub fn new(uow: UnitOfWork, error: FaultError) -> Self {
        Self {
            uow: Box::new(uow),
            error,
        }
    }

    /// Fault raised by a named stage
    pub fn stage(uow: UnitOfWork, stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            uow,
            FaultError::Stage {
                stage: stage.into(),
                message: message.into(),
            },
        )
    }

    pub fn into_uow(self) -> UnitOfWork {
        *self.uow
    }

    /// One fault per sibling of a batched UoW, each with the same error
    ///
    /// A fault on an unbatched UoW yields itself.
    pub fn unbatch(self) -> Vec<Fault> {
        let Fault { uow, error } = self;
        let mut siblings = uow.unbatch();
        let last = siblings.pop();

        let mut faults: Vec<Fault> = siblings
            .into_iter()
            .map(|sibling| Fault::new(sibling, error.clone()))
            .collect();
        if let Some(last) = last {
            faults.push(Fault::new(last, error));
        }
        faults
    }
}
