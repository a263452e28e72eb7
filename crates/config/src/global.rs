//! Global configuration settings
//!
//! Invocation-wide knobs: batch ceiling, fan-out parallelism and fault
//! surfacing. All fields have defaults.

use serde::Deserialize;

/// Global configuration that applies to all pipelines
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Configured maximum batch size handed to one invocation
    /// Used as the denominator of `batch.utilization`
    /// Default: 100
    pub batch_size_ceiling: usize,

    /// In-flight UoWs permitted per pipeline stage
    /// Default: number of CPU cores
    pub parallelism: usize,

    /// Merge faults into the output stream instead of the side channel
    /// Default: false
    pub include_errors: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            batch_size_ceiling: 100,
            parallelism: num_cpus(),
            include_errors: false,
        }
    }
}

/// Get the number of available CPUs, defaulting to 4 if detection fails
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
