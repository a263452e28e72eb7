//! Stdout submitter
//!
//! Writes each record as one JSON line and accepts everything. Records are
//! encoded up front; the write itself runs on the blocking pool.

use crate::error::{ConnectorError, Result};
use crate::record::Record;
use crate::response::{Accepted, BatchResponse, ItemResult};
use crate::submitter::BatchSubmitter;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// JSON-lines submitter
pub struct StdoutSubmitter {
    name: String,
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    written: AtomicU64,
}

impl Default for StdoutSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StdoutSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdoutSubmitter")
            .field("name", &self.name)
            .field("written", &self.written.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl StdoutSubmitter {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Write lines to `writer` instead of stdout
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            name: "stdout".into(),
            writer: Arc::new(Mutex::new(Box::new(writer))),
            written: AtomicU64::new(0),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Records written so far
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    async fn write_lines(&self, records: &[Record]) -> Result<()> {
        let mut buf = Vec::new();
        for record in records {
            serde_json::to_writer(&mut buf, record)?;
            buf.push(b'\n');
        }

        let writer = Arc::clone(&self.writer);
        tokio::task::spawn_blocking(move || {
            let mut writer = writer.lock();
            writer.write_all(&buf)?;
            writer.flush()
        })
        .await
        .map_err(|e| ConnectorError::Io(io::Error::other(e)))??;
        Ok(())
    }
}

#[async_trait]
impl BatchSubmitter for StdoutSubmitter {
    async fn submit(&self, records: &[Record]) -> Result<BatchResponse<Accepted>> {
        self.write_lines(records).await?;

        let first = self
            .written
            .fetch_add(records.len() as u64, Ordering::Relaxed);
        Ok((first..)
            .take(records.len())
            .map(|n| ItemResult::Accepted(Accepted::new(format!("{}-{n}", self.name))))
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
