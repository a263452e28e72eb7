//! Sluice - Connectors
//!
//! Batched writes to external destinations, with partial-failure retry.
//!
//! # Architecture
//!
//! ```text
//! batched UoW → [BatchWriteStage] → put_batch_with_retry → [BatchSubmitter]
//!                      │                    │
//!                      │                    └─ resubmits only rejected records
//!                      └─ attaches `write_result` to each sibling
//! ```
//!
//! # Available Submitters
//!
//! - **stdout** - JSON lines, accepts everything
//! - **memory** - in-memory store with scripted rejections
//!
//! # Example
//!
//! ```
//! use sluice_connectors::{MemorySubmitter, Record, RetryOptions, put_batch_with_retry};
//!
//! let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! rt.block_on(async {
//!     let submitter = MemorySubmitter::new().reject_first(1);
//!     let records = vec![
//!         Record::new("a", serde_json::json!({})),
//!         Record::new("b", serde_json::json!({})),
//!     ];
//!     let outcome = put_batch_with_retry(&submitter, &records, &RetryOptions::default())
//!         .await
//!         .unwrap();
//!     assert_eq!(outcome.attempt_count(), 2);
//! });
//! ```

mod error;
mod factory;
mod memory;
mod record;
pub mod resilience;
mod response;
mod stdout;
mod submitter;
mod write_stage;

pub use error::{ConnectorError, Result};
pub use factory::{available_sinks, create_sink};
pub use memory::MemorySubmitter;
pub use record::{JsonEncoder, Record, RecordEncoder};
pub use resilience::{
    Backoff, DelayFn, RetryError, RetryOptions, RetryOutcome, put_batch_with_retry,
};
pub use response::{Accepted, BatchResponse, ItemResult};
pub use stdout::StdoutSubmitter;
pub use submitter::BatchSubmitter;
pub use write_stage::BatchWriteStage;
