//! In-memory submitter
//!
//! Stores accepted records and replays a script of per-attempt outcomes.
//! Used by tests and by dry runs that should not touch a real destination.
//!
//! ```toml
//! [pipelines.sink]
//! type = "memory"
//! reject_first = [2, 1]   # attempt 1 rejects 2 records, attempt 2 rejects 1
//! ```

use crate::error::{ConnectorError, Result};
use crate::record::Record;
use crate::response::{Accepted, BatchResponse, ItemResult};
use crate::submitter::BatchSubmitter;
use async_trait::async_trait;
use parking_lot::Mutex;
use sluice_config::SinkConfig;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted outcome for one call to `submit`
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    /// Reject the first `n` records of the request
    RejectFirst(usize),
    /// Fail the whole call
    Fail(String),
    /// Answer with `n` fewer items than requested
    DropItems(usize),
}

/// Submitter backed by a `Vec`
#[derive(Debug)]
pub struct MemorySubmitter {
    name: String,
    stored: Mutex<Vec<Record>>,
    script: Mutex<VecDeque<Step>>,
    /// Record ids of every request, in call order
    requests: Mutex<Vec<Vec<String>>>,
    reject_all: bool,
    calls: AtomicUsize,
}

impl Default for MemorySubmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySubmitter {
    pub fn new() -> Self {
        Self {
            name: "memory".into(),
            stored: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            reject_all: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Build from sink options
    ///
    /// Recognises `name` and `reject_first` (a list of non-negative integers).
    pub fn from_config(config: &SinkConfig) -> Result<Self> {
        let mut submitter = Self::new();
        if let Some(name) = config.get_str("name") {
            submitter.name = name.to_string();
        }

        if let Some(value) = config.options.get("reject_first") {
            let counts = value
                .as_array()
                .ok_or_else(|| ConnectorError::config("reject_first must be an array"))?;
            for count in counts {
                let n = count
                    .as_integer()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| {
                        ConnectorError::config("reject_first entries must be non-negative integers")
                    })?;
                submitter = submitter.reject_first(n);
            }
        }

        Ok(submitter)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Next unscripted call rejects the first `n` records it receives
    pub fn reject_first(self, n: usize) -> Self {
        self.script.lock().push_back(Step::RejectFirst(n));
        self
    }

    /// Next unscripted call fails with a connector error
    pub fn fail_with(self, message: impl Into<String>) -> Self {
        self.script.lock().push_back(Step::Fail(message.into()));
        self
    }

    /// Next unscripted call answers with `n` items missing
    pub fn drop_items(self, n: usize) -> Self {
        self.script.lock().push_back(Step::DropItems(n));
        self
    }

    /// Reject every record once the script is exhausted
    pub fn always_reject(mut self) -> Self {
        self.reject_all = true;
        self
    }

    /// Accepted records, in acceptance order
    pub fn records(&self) -> Vec<Record> {
        self.stored.lock().clone()
    }

    /// Record ids sent in each call
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn respond(&self, records: &[Record]) -> Result<BatchResponse<Accepted>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.requests
            .lock()
            .push(records.iter().map(|r| r.id.clone()).collect());

        let step = self.script.lock().pop_front();
        let (rejected, keep) = match step {
            Some(Step::Fail(message)) => return Err(ConnectorError::Unavailable(message)),
            Some(Step::RejectFirst(n)) => (n, records.len()),
            Some(Step::DropItems(n)) => (0, records.len().saturating_sub(n)),
            None if self.reject_all => (records.len(), records.len()),
            None => (0, records.len()),
        };

        let mut stored = self.stored.lock();
        let items = records
            .iter()
            .take(keep)
            .enumerate()
            .map(|(i, record)| {
                if i < rejected {
                    ItemResult::rejected("Rejected", format!("scripted rejection of {}", record.id))
                } else {
                    stored.push(record.clone());
                    ItemResult::Accepted(Accepted::new(format!("{}-{}", self.name, stored.len() - 1)))
                }
            })
            .collect();

        Ok(items)
    }
}

#[async_trait]
impl BatchSubmitter for MemorySubmitter {
    async fn submit(&self, records: &[Record]) -> Result<BatchResponse<Accepted>> {
        self.respond(records)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
