//! Wire records and the encoders that produce them

use crate::error::Result;
use serde::Serialize;
use serde_json::Value;
use sluice_protocol::UnitOfWork;

/// One item of a batched write request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: String,
    pub data: Value,
}

impl Record {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// Turns one sibling UoW into a request record
pub trait RecordEncoder: Send + Sync {
    fn encode(&self, uow: &UnitOfWork) -> Result<Record>;
}

/// Encodes the event as JSON, keyed by the source record id
///
/// UoWs without a source record fall back to their event type as the id.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl RecordEncoder for JsonEncoder {
    fn encode(&self, uow: &UnitOfWork) -> Result<Record> {
        let id = uow
            .record
            .as_ref()
            .map_or_else(|| uow.event.event_type.clone(), |r| r.id.clone());
        let data = serde_json::to_value(&uow.event)?;
        Ok(Record { id, data })
    }
}
