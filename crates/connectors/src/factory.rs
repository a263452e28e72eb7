//! Sink construction from configuration

use crate::error::{ConnectorError, Result};
use crate::memory::MemorySubmitter;
use crate::resilience::RetryOptions;
use crate::stdout::StdoutSubmitter;
use crate::write_stage::BatchWriteStage;
use sluice_config::{RetryConfig, SinkConfig};
use sluice_transform::Stage;
use std::sync::Arc;

/// Sink types this crate can build
pub fn available_sinks() -> &'static [&'static str] {
    &["stdout", "memory"]
}

/// Build the batch write stage for a pipeline's `sink` table
///
/// The stage is named after the `name` option, or the sink type.
pub fn create_sink(config: &SinkConfig, retry: &RetryConfig) -> Result<Box<dyn Stage>> {
    let name = config.get_str("name").unwrap_or(&config.sink_type).to_string();
    let options = RetryOptions::from(retry);

    match config.sink_type.as_str() {
        "stdout" => {
            let submitter = StdoutSubmitter::new().with_name(name.as_str());
            Ok(Box::new(BatchWriteStage::new(name, Arc::new(submitter), options)))
        }
        "memory" => {
            let submitter = MemorySubmitter::from_config(config)?.with_name(name.as_str());
            Ok(Box::new(BatchWriteStage::new(name, Arc::new(submitter), options)))
        }
        other => Err(ConnectorError::UnknownSink(other.to_string())),
    }
}
