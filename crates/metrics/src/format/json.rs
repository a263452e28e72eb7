//! JSON metrics formatter
//!
//! Formats the flat metrics map as a single JSON object.
//!
//! # Example Output
//!
//! ```json
//! {
//!   "type": "invocation",
//!   "metrics": {
//!     "batch.size": 4,
//!     "p1|pipeline.time": {"average": 20, "min": 10, "max": 30, "sum": 60, "count": 3},
//!     "p1|utilization": 0.75
//!   }
//! }
//! ```

use super::MetricsFormatter;
use crate::AggregatedMetrics;
use serde::Serialize;

/// JSON metrics formatter
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Create a compact JSON formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-print output
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

#[derive(Serialize)]
struct InvocationJson<'a> {
    #[serde(rename = "type")]
    report_type: &'static str,
    metrics: &'a AggregatedMetrics,
}

impl MetricsFormatter for JsonFormatter {
    fn format(&self, metrics: &AggregatedMetrics) -> String {
        let json = InvocationJson {
            report_type: "invocation",
            metrics,
        };

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&json)
        } else {
            serde_json::to_string(&json)
        };
        rendered.unwrap_or_else(|_| "{}".to_string())
    }
}
