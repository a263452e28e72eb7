//! Sluice - Transform
//!
//! Stages that process one unit of work at a time, and the chains that
//! run them in sequence.
//!
//! # Architecture
//!
//! ```text
//! [UoW] → [Stage 1] → [Stage 2] → ... → [UoW']
//!              │
//!              └─ Err(Fault) stops the chain, carrying the UoW back
//! ```
//!
//! Stages are built by name through a [`StageRegistry`]. A chain can be
//! wrapped with [`Chain::timed`] so each stage records `io.wait.time` and
//! `io.time` under its own name.
//!
//! # Adding a New Stage
//!
//! 1. Implement [`Stage`] on your stage struct.
//! 2. Implement [`StageFactory`] to build it from its TOML options.
//! 3. Register it in [`default_registry()`] and add it to
//!    `sluice_config::KNOWN_STAGE_TYPES`.
//!
//! # Example
//!
//! ```
//! use sluice_transform::{Chain, NoopStage, TagStage};
//!
//! let chain = Chain::new(vec![
//!     Box::new(NoopStage::new()),
//!     Box::new(TagStage::new([("team", "core")])),
//! ]);
//! assert_eq!(chain.names(), vec!["noop", "tag"]);
//! ```

mod chain;
mod error;
pub mod noop;
pub mod registry;
pub mod set_fields;
pub mod tag;
mod timed;

pub use chain::Chain;
pub use error::TransformError;
pub use noop::NoopStage;
pub use registry::{
    NoopFactory, SetFieldsFactory, StageConfig, StageFactory, StageRegistry, TagFactory,
    build_chain, default_registry,
};
pub use set_fields::SetFieldsStage;
pub use tag::TagStage;
pub use timed::Timed;

use sluice_protocol::{StageResult, UnitOfWork};
use std::future::Future;
use std::pin::Pin;

/// Result type for stage construction
pub type TransformResult<T> = Result<T, TransformError>;

/// Boxed future returned by [`Stage::process`]
pub type StageFuture<'a> = Pin<Box<dyn Future<Output = StageResult> + Send + 'a>>;

/// Trait for per-UoW stages
///
/// Implementors must be `Send + Sync`; one stage instance serves every
/// concurrent UoW of its pipeline.
///
/// # Example
///
/// ```
/// use sluice_protocol::UnitOfWork;
/// use sluice_transform::{Stage, StageFuture};
///
/// struct Uppercase;
///
/// impl Stage for Uppercase {
///     fn process<'a>(&'a self, mut uow: UnitOfWork) -> StageFuture<'a> {
///         Box::pin(async move {
///             uow.event.event_type = uow.event.event_type.to_uppercase();
///             Ok(uow)
///         })
///     }
///
///     fn name(&self) -> &str {
///         "uppercase"
///     }
/// }
/// ```
pub trait Stage: Send + Sync {
    /// Process one UoW
    ///
    /// Failures return `Err(Fault)` with the UoW inside.
    fn process<'a>(&'a self, uow: UnitOfWork) -> StageFuture<'a>;

    /// Name used for step metrics and logging
    fn name(&self) -> &str;

    /// Disabled stages are filtered out of chains at construction time
    fn enabled(&self) -> bool {
        true
    }
}

impl<S: Stage + ?Sized> Stage for Box<S> {
    fn process<'a>(&'a self, uow: UnitOfWork) -> StageFuture<'a> {
        (**self).process(uow)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn enabled(&self) -> bool {
        (**self).enabled()
    }
}
