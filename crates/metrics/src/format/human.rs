//! Human-readable metrics formatter
//!
//! Formats metrics in a compact, readable format for operators.
//!
//! # Example Output
//!
//! ```text
//! [metrics] function: batch.size=4 | batch.utilization=0.04 | uow.count=4
//! [metrics] p1: utilization=0.75 | pipeline.time (n=3, min 10ms, avg 20ms, max 30ms)
//! [metrics] p1/save: io.time (n=3, min 2ms, avg 4ms, max 9ms)
//! ```

use super::{MetricsFormatter, Unit, format_count, format_millis};
use crate::keys::MetricScope;
use crate::{AggregatedMetrics, MetricValue, Stats};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Human-readable metrics formatter
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter;

impl HumanFormatter {
    /// Create a new human formatter
    pub fn new() -> Self {
        Self
    }

    fn format_entry(output: &mut String, name: &str, value: &MetricValue) {
        match value {
            MetricValue::Scalar(v) if Unit::for_name(name) == Unit::Count => {
                let _ = write!(output, " {}={}", name, format_count(*v as u64));
            }
            MetricValue::Scalar(v) => {
                let _ = write!(output, " {}={:.2}", name, v);
            }
            MetricValue::Stats(stats) => Self::format_stats(output, name, stats),
        }
    }

    fn format_stats(output: &mut String, name: &str, stats: &Stats) {
        if Unit::for_name(name) == Unit::Milliseconds {
            let _ = write!(
                output,
                " {} (n={}, min {}, avg {}, max {})",
                name,
                stats.count,
                format_millis(stats.min),
                format_millis(stats.average),
                format_millis(stats.max),
            );
        } else {
            let _ = write!(
                output,
                " {} (n={}, min {:.1}, avg {:.1}, max {:.1}, sum {:.1})",
                name, stats.count, stats.min, stats.average, stats.max, stats.sum,
            );
        }
    }

    fn format_line(label: &str, entries: &[(&str, &MetricValue)]) -> String {
        let mut output = format!("[metrics] {}:", label);
        for (i, (name, value)) in entries.iter().enumerate() {
            if i > 0 {
                output.push_str(" |");
            }
            Self::format_entry(&mut output, name, value);
        }
        output
    }
}

impl MetricsFormatter for HumanFormatter {
    fn format(&self, metrics: &AggregatedMetrics) -> String {
        let mut lines: BTreeMap<(u8, String), Vec<(&str, &MetricValue)>> = BTreeMap::new();

        for (scope, value) in metrics.scoped() {
            let (rank, label) = match scope {
                MetricScope::Function { .. } => (0, "function".to_string()),
                MetricScope::Pipeline { pipeline, .. } => (1, pipeline.to_string()),
                MetricScope::Step { pipeline, step, .. } => (2, format!("{pipeline}/{step}")),
            };
            lines
                .entry((rank, label))
                .or_default()
                .push((scope.name(), value));
        }

        if lines.is_empty() {
            return "[metrics] no data".to_string();
        }

        lines
            .iter()
            .map(|((_, label), entries)| Self::format_line(label, entries))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
