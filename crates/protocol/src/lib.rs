//! Sluice Protocol - Core types that flow through pipelines
//!
//! This crate provides:
//! - `UnitOfWork` - One event plus its routing, metrics and attachments
//! - `Event` - Typed, tagged JSON event with dot-path field lookup
//! - `PipelineId` - Pipeline identification for forks and metrics
//! - `Fault` - A failed UoW carried back to the caller
//! - NDJSON decoding of input records
//!
//! # Ownership
//!
//! Forking copies the event and gives the fork its own metrics context,
//! so a fork can be mutated freely without affecting its siblings.

mod decode;
mod error;
mod event;
mod fault;
mod pipeline_id;
mod uow;

pub use decode::{decode_ndjson, decode_record};
pub use error::ProtocolError;
pub use event::{Event, FieldValue};
pub use fault::{Fault, FaultError, StageResult};
pub use pipeline_id::PipelineId;
pub use uow::{RecordRef, UnitOfWork};

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Attachment key under which batch sinks record each sibling's outcome
pub const WRITE_RESULT_ATTACHMENT: &str = "write_result";

#[cfg(test)]
mod uow_test;
