//! Newline-delimited JSON input
//!
//! Each non-blank line is one record:
//!
//! ```json
//! {"id": "r-1", "event_type": "thing-created", "tags": {"region": "eu"}, "fields": {"n": 1}}
//! ```
//!
//! `id` is optional and defaults to `record-<sequence>`. Sequences count
//! decoded records from 0.

use crate::error::ProtocolError;
use crate::event::Event;
use crate::uow::{RecordRef, UnitOfWork};
use crate::Result;
use serde::Deserialize;
use std::io::BufRead;

#[derive(Deserialize)]
struct InputRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(flatten)]
    event: Event,
}

/// Decode one line into a UoW with the given sequence number
///
/// `line` is 1-based and only used in errors.
pub fn decode_record(input: &str, line: usize, sequence: u64) -> Result<UnitOfWork> {
    let record: InputRecord =
        serde_json::from_str(input).map_err(|e| ProtocolError::invalid_record(line, e))?;

    if record.event.event_type.is_empty() {
        return Err(ProtocolError::missing_field(line, "event_type"));
    }

    let id = record
        .id
        .unwrap_or_else(|| format!("record-{sequence}"));
    Ok(UnitOfWork::new(record.event).with_record(RecordRef::new(id, sequence)))
}

/// Decode every record from a reader, stopping at the first error
pub fn decode_ndjson<R: BufRead>(reader: R) -> Result<Vec<UnitOfWork>> {
    let mut uows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let sequence = uows.len() as u64;
        uows.push(decode_record(&line, index + 1, sequence)?);
    }
    Ok(uows)
}
