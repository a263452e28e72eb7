//! Tests for StatsAggregator
//!
//! Tests cover the stats fold, utilization and aggregation idempotence.

use super::*;
use crate::{ManualClock, StepFilter};
use proptest::prelude::*;
use std::sync::Arc;

fn function(uows: u64) -> (Arc<ManualClock>, FunctionMetrics) {
    let (clock, shared) = ManualClock::shared(0);
    let metrics = FunctionMetrics::start_for_batch(0, uows as usize, 10, shared, StepFilter::All);
    for _ in 0..uows {
        metrics.record_uow();
    }
    (clock, metrics)
}

fn finished(function: &FunctionMetrics, clock: &ManualClock, pipeline: &str, at: i64) -> MetricsContext {
    let mut ctx = function.start_pipeline(pipeline);
    clock.set(at);
    ctx.end_pipeline();
    ctx
}

// =============================================================================
// Stats fold
// =============================================================================

#[test]
fn test_stats_empty() {
    assert_eq!(Stats::from_values(Vec::new()), None);
}

#[test]
fn test_stats_fold() {
    let stats = Stats::from_values([4.0, 1.0, 7.0]).unwrap();
    assert_eq!(stats.min, 1.0);
    assert_eq!(stats.max, 7.0);
    assert_eq!(stats.sum, 12.0);
    assert_eq!(stats.count, 3);
    assert_eq!(stats.average, 4.0);
}

proptest! {
    #[test]
    fn prop_stats_bounds(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..64)) {
        let stats = Stats::from_values(values.iter().copied()).unwrap();
        prop_assert_eq!(stats.count, values.len() as u64);
        prop_assert!(stats.min <= stats.average + 1e-6);
        prop_assert!(stats.average <= stats.max + 1e-6);
    }
}

// =============================================================================
// Aggregation
// =============================================================================

#[test]
fn test_function_scalars_present() {
    let (_clock, metrics) = function(2);
    let agg = StatsAggregator::aggregate(&metrics, []);

    assert_eq!(agg.scalar("batch.size"), Some(2.0));
    assert_eq!(agg.scalar("batch.utilization"), Some(0.2));
    assert_eq!(agg.scalar("uow.count"), Some(2.0));
    assert_eq!(agg.len(), 3);
}

#[test]
fn test_utilization_share_of_batch() {
    let (clock, metrics) = function(4);
    let contexts = vec![
        finished(&metrics, &clock, "p1", 10),
        finished(&metrics, &clock, "p1", 20),
        finished(&metrics, &clock, "p1", 30),
        finished(&metrics, &clock, "p2", 40),
    ];

    let agg = StatsAggregator::aggregate(&metrics, &contexts);

    assert_eq!(agg.scalar("p1|utilization"), Some(0.75));
    assert_eq!(agg.scalar("p2|utilization"), Some(0.25));

    let time = agg.stats("p1|pipeline.time").unwrap();
    assert_eq!(time.count, 3);
    assert_eq!(time.min, 10.0);
    assert_eq!(time.max, 30.0);
    assert_eq!(time.average, 20.0);
}

#[test]
fn test_utilization_without_uows_is_zero() {
    let (clock, metrics) = function(0);
    let ctx = finished(&metrics, &clock, "p1", 5);
    let agg = StatsAggregator::aggregate(&metrics, [&ctx]);
    assert_eq!(agg.scalar("p1|utilization"), Some(0.0));
}

#[test]
fn test_gauges_and_checkpoints_share_buckets() {
    let (clock, metrics) = function(2);
    let mut a = finished(&metrics, &clock, "p1", 10);
    let mut b = finished(&metrics, &clock, "p1", 10);
    a.step_gauge("save", "attempts", 1.0);
    b.step_gauge("save", "attempts", 3.0);

    let agg = StatsAggregator::aggregate(&metrics, [&a, &b]);
    let attempts = agg.stats("p1|save|attempts").unwrap();
    assert_eq!(attempts.sum, 4.0);
    assert_eq!(attempts.count, 2);
}

#[test]
fn test_aggregate_is_idempotent() {
    let (clock, metrics) = function(3);
    let contexts = vec![
        finished(&metrics, &clock, "p1", 15),
        finished(&metrics, &clock, "p2", 25),
    ];

    let first = StatsAggregator::aggregate(&metrics, &contexts);
    let second = StatsAggregator::aggregate(&metrics, &contexts);
    assert_eq!(first, second);
}

#[test]
fn test_scoped_iteration() {
    let (clock, metrics) = function(1);
    let mut ctx = finished(&metrics, &clock, "p1", 10);
    ctx.step_gauge("save", "attempts", 1.0);

    let agg = StatsAggregator::aggregate(&metrics, [&ctx]);
    let steps: Vec<_> = agg
        .scoped()
        .filter(|(scope, _)| matches!(scope, MetricScope::Step { .. }))
        .collect();
    assert_eq!(steps.len(), 1);
}
