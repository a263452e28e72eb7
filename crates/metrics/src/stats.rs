//! Terminal aggregation
//!
//! Reduces the checkpoints and gauges of every UoW into one flat map of
//! `key -> MetricValue`. Aggregation only borrows its input, so running
//! it twice over the same contexts yields identical output.

use crate::context::MetricsContext;
use crate::function::FunctionMetrics;
use crate::keys::{self, DELIMITER, MetricScope};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Summary statistics over one key's observations
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub count: u64,
}

impl Stats {
    /// Fold observations left to right; `None` when empty
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values.into_iter().fold(None, |acc, value| {
            Some(match acc {
                None => Self {
                    average: value,
                    min: value,
                    max: value,
                    sum: value,
                    count: 1,
                },
                Some(s) => {
                    let count = s.count + 1;
                    let sum = s.sum + value;
                    Self {
                        average: sum / count as f64,
                        min: s.min.min(value),
                        max: s.max.max(value),
                        sum,
                        count,
                    }
                }
            })
        })
    }
}

/// One aggregated metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    Stats(Stats),
}

impl MetricValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Stats(_) => None,
        }
    }

    pub fn as_stats(&self) -> Option<&Stats> {
        match self {
            Self::Scalar(_) => None,
            Self::Stats(s) => Some(s),
        }
    }
}

/// Flat, key-ordered aggregation result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregatedMetrics {
    values: BTreeMap<String, MetricValue>,
}

impl AggregatedMetrics {
    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.values.get(key)
    }

    pub fn scalar(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(MetricValue::as_scalar)
    }

    pub fn stats(&self, key: &str) -> Option<&Stats> {
        self.get(key).and_then(MetricValue::as_stats)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, MetricValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries grouped by scope, skipping keys deeper than three segments
    pub fn scoped(&self) -> impl Iterator<Item = (MetricScope<'_>, &MetricValue)> {
        self.values
            .iter()
            .filter_map(|(key, value)| MetricScope::parse(key).map(|scope| (scope, value)))
    }
}

impl<'a> IntoIterator for &'a AggregatedMetrics {
    type Item = (&'a String, &'a MetricValue);
    type IntoIter = btree_map::Iter<'a, String, MetricValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Reduces per-UoW contexts into [`AggregatedMetrics`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsAggregator;

impl StatsAggregator {
    /// Aggregate `contexts` alongside the function-level scalars
    ///
    /// Utilization for each `<prefix>|pipeline.time` key is the number of
    /// observations divided by the function's `uow.count`, or 0 when no
    /// UoWs were seen.
    pub fn aggregate<'a, I>(function: &FunctionMetrics, contexts: I) -> AggregatedMetrics
    where
        I: IntoIterator<Item = &'a MetricsContext>,
    {
        let mut buckets: BTreeMap<&'a str, Vec<f64>> = BTreeMap::new();
        for ctx in contexts {
            for (key, millis) in ctx.checkpoints() {
                buckets.entry(key.as_str()).or_default().push(*millis as f64);
            }
            for (key, values) in ctx.gauge_values() {
                buckets
                    .entry(key.as_str())
                    .or_default()
                    .extend(values.iter().copied());
            }
        }

        let mut values = BTreeMap::new();
        for (key, value) in function.scalars() {
            values.insert(key.to_string(), MetricValue::Scalar(value));
        }

        let total = function.uow_count();
        for (key, observations) in &buckets {
            if let Some((prefix, keys::PIPELINE_TIME)) = key.rsplit_once(DELIMITER) {
                let utilization = if total == 0 {
                    0.0
                } else {
                    observations.len() as f64 / total as f64
                };
                values.insert(
                    format!("{prefix}{DELIMITER}{}", keys::UTILIZATION),
                    MetricValue::Scalar(utilization),
                );
            }
        }

        for (key, observations) in buckets {
            if let Some(stats) = Stats::from_values(observations) {
                values.insert(key.to_string(), MetricValue::Stats(stats));
            }
        }

        AggregatedMetrics { values }
    }
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod tests;
