//! Batch submitter trait

use crate::error::Result;
use crate::record::Record;
use crate::response::{Accepted, BatchResponse};
use async_trait::async_trait;

/// A destination accepting batched writes
///
/// `submit` returns one item per request record, in request order. A
/// destination that only accepted some records reports the rest as
/// rejected; the retry engine resubmits exactly those.
#[async_trait]
pub trait BatchSubmitter: Send + Sync {
    async fn submit(&self, records: &[Record]) -> Result<BatchResponse<Accepted>>;

    /// Name used in logs
    fn name(&self) -> &str;
}
