//! Metrics output formatters
//!
//! Renders an [`AggregatedMetrics`] map as CloudWatch embedded metric
//! format, flat JSON, or a human-readable table.

mod emf;
mod human;
mod json;

pub use emf::EmfFormatter;
pub use human::HumanFormatter;
pub use json::JsonFormatter;

use crate::{AggregatedMetrics, keys};

/// Trait for metrics formatters
pub trait MetricsFormatter: Send + Sync {
    /// Render one invocation's aggregated metrics
    fn format(&self, metrics: &AggregatedMetrics) -> String;
}

/// Unit reported for a metric, derived from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Milliseconds,
    Count,
    None,
}

impl Unit {
    /// `*.time` is milliseconds, `*.count` / `*.size` / `attempts` are counts
    pub fn for_name(name: &str) -> Self {
        if name.ends_with(".time") {
            Self::Milliseconds
        } else if name.ends_with(".count") || name.ends_with(".size") || name == keys::ATTEMPTS {
            Self::Count
        } else {
            Self::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Milliseconds => "Milliseconds",
            Self::Count => "Count",
            Self::None => "None",
        }
    }
}

/// Format a millisecond duration compactly (`850ms`, `1.2s`)
pub fn format_millis(millis: f64) -> String {
    if millis.abs() >= 1000.0 {
        format!("{:.1}s", millis / 1000.0)
    } else {
        format!("{:.0}ms", millis)
    }
}

/// Format count with K/M suffix for readability
pub fn format_count(count: u64) -> String {
    const K: u64 = 1000;
    const M: u64 = 1_000_000;

    if count >= M {
        format!("{:.1}M", count as f64 / M as f64)
    } else if count >= K {
        format!("{:.1}K", count as f64 / K as f64)
    } else {
        count.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_for_name() {
        assert_eq!(Unit::for_name("pipeline.time"), Unit::Milliseconds);
        assert_eq!(Unit::for_name("io.wait.time"), Unit::Milliseconds);
        assert_eq!(Unit::for_name("uow.count"), Unit::Count);
        assert_eq!(Unit::for_name("batch.size"), Unit::Count);
        assert_eq!(Unit::for_name("attempts"), Unit::Count);
        assert_eq!(Unit::for_name("utilization"), Unit::None);
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(850.0), "850ms");
        assert_eq!(format_millis(1200.0), "1.2s");
        assert_eq!(format_millis(-20.0), "-20ms");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(500), "500");
        assert_eq!(format_count(1500), "1.5K");
        assert_eq!(format_count(1_500_000), "1.5M");
    }
}
