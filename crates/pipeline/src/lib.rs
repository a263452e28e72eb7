//! Sluice - Pipeline
//!
//! Rule-selected pipelines run over one finite batch of units of work.
//!
//! # Architecture
//!
//! ```text
//! [UoWs] ──→ PipelineSet::route ──→ fork per match ──→ [Semaphore] ──→ stages ──┐
//!              │                                                                 │
//!              └─ unmatched: counted, dropped          sink batches ←────────────┘
//!                                                          │
//!                              results / faults ←── unbatch, end_pipeline
//! ```
//!
//! # Key Design
//!
//! - **Fork isolation**: every matched pipeline gets its own copy of the UoW
//!   and its own metrics context
//! - **Bounded concurrency**: one `Semaphore` per pipeline, tasks on a `JoinSet`
//! - **Faults are values**: a failing stage returns `Err(Fault)` with the UoW
//!   inside; other UoWs are never affected
//! - **Per-invocation metrics**: a `FunctionMetrics` accumulator is created
//!   for each run and aggregated at the end
//!
//! # Example
//!
//! ```
//! use sluice_pipeline::{Assembler, Invocation, Pipeline, PipelineSet};
//! use sluice_protocol::{Event, UnitOfWork};
//! use sluice_routing::{MatchKind, Rule};
//!
//! let mut builder = PipelineSet::builder();
//! builder
//!     .add(Pipeline::new(Rule::new("things", MatchKind::pattern("things", "^thing-").unwrap())))
//!     .unwrap();
//! let invocation = Invocation::new(Assembler::new(builder.build()));
//!
//! let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! let report = rt.block_on(invocation.run(0, vec![
//!     UnitOfWork::new(Event::new("thing-created")),
//!     UnitOfWork::new(Event::new("other")),
//! ]));
//! assert_eq!(report.results().len(), 1);
//! assert_eq!(report.unmatched(), 1);
//! ```

mod assembler;
mod error;
mod invocation;
mod metrics;
mod pipeline;
mod set;

pub use assembler::{Assembler, AssemblerOutput};
pub use error::{PipelineError, Result};
pub use invocation::{DEFAULT_BATCH_SIZE_CEILING, Invocation, InvocationReport};
pub use metrics::{AssemblerMetrics, MetricsSnapshot};
pub use pipeline::{BatchSink, Pipeline};
pub use set::{PipelineSet, PipelineSetBuilder};
