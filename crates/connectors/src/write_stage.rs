//! Batch write stage
//!
//! Encodes every sibling of a batched UoW into one request record and
//! writes them through the retry engine. Each sibling gets its outcome
//! attached under `write_result` and an `attempts` step gauge.

use crate::record::{JsonEncoder, Record, RecordEncoder};
use crate::resilience::{RetryOptions, put_batch_with_retry};
use crate::submitter::BatchSubmitter;
use sluice_metrics::keys;
use sluice_protocol::{Fault, FaultError, UnitOfWork, WRITE_RESULT_ATTACHMENT};
use sluice_transform::{Stage, StageFuture};
use std::sync::Arc;
use tracing::debug;

/// Stage writing batched UoWs through a [`BatchSubmitter`]
pub struct BatchWriteStage<S: ?Sized, E = JsonEncoder> {
    name: String,
    encoder: E,
    options: RetryOptions,
    submitter: Arc<S>,
}

impl<S: BatchSubmitter + ?Sized> BatchWriteStage<S, JsonEncoder> {
    pub fn new(name: impl Into<String>, submitter: Arc<S>, options: RetryOptions) -> Self {
        Self {
            name: name.into(),
            encoder: JsonEncoder,
            options,
            submitter,
        }
    }
}

impl<S: BatchSubmitter + ?Sized, E: RecordEncoder> BatchWriteStage<S, E> {
    /// Replace the record encoder
    pub fn with_encoder<E2: RecordEncoder>(self, encoder: E2) -> BatchWriteStage<S, E2> {
        BatchWriteStage {
            name: self.name,
            encoder,
            options: self.options,
            submitter: self.submitter,
        }
    }

    pub fn submitter(&self) -> &Arc<S> {
        &self.submitter
    }

    pub fn options(&self) -> &RetryOptions {
        &self.options
    }

    fn record_attempts(&self, uow: &mut UnitOfWork, attempts: usize) {
        uow.for_each_metrics(|ctx| ctx.step_gauge(&self.name, keys::ATTEMPTS, attempts as f64));
    }

    async fn write(&self, mut uow: UnitOfWork) -> Result<UnitOfWork, Fault> {
        let encoded: Result<Vec<Record>, _> = uow
            .siblings()
            .iter()
            .map(|sibling| self.encoder.encode(sibling))
            .collect();
        let records = match encoded {
            Ok(records) => records,
            Err(e) => {
                let error = FaultError::Write {
                    attempts: 0,
                    message: e.to_string(),
                };
                return Err(Fault::new(uow, error));
            }
        };

        match put_batch_with_retry(self.submitter.as_ref(), &records, &self.options).await {
            Ok(outcome) => {
                let attempts = outcome.attempt_count();
                debug!(
                    stage = %self.name,
                    pipeline = uow.pipeline_name(),
                    records = records.len(),
                    attempts,
                    "batch written"
                );
                for (sibling, item) in uow.siblings_mut().iter_mut().zip(&outcome.items) {
                    sibling.attach(WRITE_RESULT_ATTACHMENT, item.to_json());
                }
                self.record_attempts(&mut uow, attempts);
                Ok(uow)
            }
            Err(e) => {
                let attempts = e.attempts();
                self.record_attempts(&mut uow, attempts);
                let error = FaultError::Write {
                    attempts,
                    message: e.to_string(),
                };
                Err(Fault::new(uow, error))
            }
        }
    }
}

impl<S, E> Stage for BatchWriteStage<S, E>
where
    S: BatchSubmitter + ?Sized,
    E: RecordEncoder,
{
    fn process<'a>(&'a self, uow: UnitOfWork) -> StageFuture<'a> {
        Box::pin(self.write(uow))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[path = "write_stage_test.rs"]
mod tests;
