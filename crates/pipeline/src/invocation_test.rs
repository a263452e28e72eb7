//! Tests for invocation reports and aggregated metrics

use super::*;
use crate::pipeline::Pipeline;
use sluice_metrics::ManualClock;
use sluice_protocol::Event;
use sluice_routing::{MatchKind, Rule};
use sluice_transform::{Stage, StageFuture, default_registry};
use std::str::FromStr;

fn uow(event_type: &str, sequence: u64) -> UnitOfWork {
    UnitOfWork::new(Event::new(event_type))
        .with_record(RecordRef::new(format!("r{sequence}"), sequence))
}

fn pipeline(id: &str, matcher: MatchKind) -> Pipeline {
    Pipeline::new(Rule::new(id, matcher))
}

fn invocation(pipelines: Vec<Pipeline>) -> (Arc<ManualClock>, Invocation) {
    let mut builder = PipelineSet::builder();
    for pipeline in pipelines {
        builder.add(pipeline).unwrap();
    }
    let (clock, shared) = ManualClock::shared(0);
    let invocation = Invocation::new(Assembler::new(builder.build()))
        .with_clock(shared)
        .with_step_filter(StepFilter::All)
        .with_batch_size_ceiling(4);
    (clock, invocation)
}

/// Faults every UoW whose event type ends in `!`
struct Reject;

impl Stage for Reject {
    fn process<'a>(&'a self, uow: UnitOfWork) -> StageFuture<'a> {
        Box::pin(async move {
            if uow.event.event_type.ends_with('!') {
                Err(Fault::stage(uow, "reject", "bang"))
            } else {
                Ok(uow)
            }
        })
    }

    fn name(&self) -> &str {
        "reject"
    }
}

// =============================================================================
// Aggregated metrics
// =============================================================================

#[tokio::test]
async fn test_utilization_per_pipeline() {
    let (_clock, invocation) = invocation(vec![
        pipeline("p1", MatchKind::Exact("a".into())),
        pipeline("p2", MatchKind::Exact("b".into())),
    ]);

    let report = invocation
        .run(0, vec![uow("a", 0), uow("a", 1), uow("b", 2), uow("a", 3)])
        .await;

    assert_eq!(report.results().len(), 4);
    assert_eq!(report.metrics.scalar("p1|utilization"), Some(0.75));
    assert_eq!(report.metrics.scalar("p2|utilization"), Some(0.25));
    assert_eq!(report.metrics.scalar("uow.count"), Some(4.0));
    assert_eq!(report.metrics.scalar("batch.size"), Some(4.0));
    assert_eq!(report.metrics.scalar("batch.utilization"), Some(1.0));
}

#[tokio::test]
async fn test_unmatched_lowers_utilization() {
    let (_clock, invocation) = invocation(vec![pipeline("p1", MatchKind::Exact("a".into()))]);

    let report = invocation
        .run(0, vec![uow("a", 0), uow("x", 1), uow("y", 2), uow("z", 3)])
        .await;

    assert_eq!(report.unmatched(), 3);
    assert_eq!(report.metrics.scalar("p1|utilization"), Some(0.25));
    assert_eq!(report.summary.uows_unmatched, 3);
}

#[tokio::test]
async fn test_pipeline_time_stats() {
    let (clock, invocation) = invocation(vec![pipeline("p1", MatchKind::any_of(["a", "b"]))]);
    clock.set(1_250);

    let report = invocation.run(1_000, vec![uow("a", 0), uow("b", 1)]).await;

    let stats = report.metrics.stats("p1|pipeline.time").unwrap();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.min, 250.0);
    assert_eq!(stats.max, 250.0);
    assert_eq!(stats.sum, 500.0);
    assert_eq!(report.metrics.stats("p1|channel.wait.time").unwrap().average, 250.0);
}

#[tokio::test]
async fn test_faulted_forks_still_count() {
    let (_clock, invocation) = invocation(vec![
        pipeline("p1", MatchKind::pattern("p1", "^a").unwrap()).with_stages(vec![Box::new(Reject)]),
    ]);

    let report = invocation.run(0, vec![uow("a", 0), uow("a!", 1)]).await;

    assert_eq!(report.results().len(), 1);
    assert_eq!(report.faults().len(), 1);
    assert_eq!(report.metrics.stats("p1|pipeline.time").unwrap().count, 2);
    assert_eq!(report.metrics.scalar("p1|utilization"), Some(1.0));
    assert!(report.metrics.stats("p1|reject|io.time").is_some());
}

#[tokio::test]
async fn test_summary_counts_one_run_only() {
    let (_clock, invocation) = invocation(vec![pipeline("p1", MatchKind::Exact("a".into()))]);

    let first = invocation.run(0, vec![uow("a", 0)]).await;
    let second = invocation.run(0, vec![uow("a", 0), uow("x", 1)]).await;

    assert_eq!(first.summary.uows_received, 1);
    assert_eq!(first.summary.forks_completed, 1);
    assert_eq!(second.summary.uows_received, 2);
    assert_eq!(second.summary.uows_unmatched, 1);
    assert_eq!(second.summary.forks_completed, 1);
    assert_eq!(second.summary.match_rate(), Some(0.5));
    assert_eq!(second.metrics.scalar("uow.count"), Some(2.0));
}

// =============================================================================
// Failed records
// =============================================================================

#[tokio::test]
async fn test_failed_records_deduped_and_ordered() {
    let (_clock, invocation) = invocation(vec![
        pipeline("p1", MatchKind::pattern("p1", "!$").unwrap()).with_stages(vec![Box::new(Reject)]),
        pipeline("p2", MatchKind::pattern("p2", "!$").unwrap()).with_stages(vec![Box::new(Reject)]),
        pipeline("p3", MatchKind::predicate(|_, _| true)),
    ]);

    let report = invocation
        .run(0, vec![uow("b!", 2), uow("ok", 0), uow("a!", 1)])
        .await;

    assert!(!report.is_success());
    assert_eq!(report.fault_count(), 4);
    let failed: Vec<u64> = report.failed_records().iter().map(|r| r.sequence).collect();
    assert_eq!(failed, vec![1, 2]);
}

#[tokio::test]
async fn test_success_has_no_failed_records() {
    let (_clock, invocation) = invocation(vec![pipeline("p1", MatchKind::Exact("a".into()))]);

    let report = invocation.run(0, vec![uow("a", 0)]).await;

    assert!(report.is_success());
    assert!(report.failed_records().is_empty());
}

#[tokio::test]
async fn test_empty_batch() {
    let (_clock, invocation) = invocation(vec![pipeline("p1", MatchKind::Exact("a".into()))]);

    let report = invocation.run(0, Vec::new()).await;

    assert!(report.results().is_empty());
    assert_eq!(report.metrics.scalar("uow.count"), Some(0.0));
    assert_eq!(report.metrics.scalar("batch.utilization"), Some(0.0));
    assert!(report.metrics.get("p1|utilization").is_none());
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn test_from_config() {
    let config = Config::from_str(
        r#"
[global]
batch_size_ceiling = 10
include_errors = true

[metrics]
step_metrics = ["label"]

[[pipelines]]
id = "things"
event_type = { pattern = "^thing-" }

[[pipelines.stages]]
type = "tag"
name = "label"
tags = { team = "billing" }

[[pipelines.stages]]
type = "noop"

[[pipelines]]
id = "off"
enabled = false
event_type = "thing-created"
"#,
    )
    .unwrap();

    let invocation = Invocation::from_config(&config, &default_registry()).unwrap();
    assert_eq!(invocation.assembler().pipelines().len(), 1);

    let report = invocation
        .run(0, vec![uow("thing-created", 0), uow("other", 1)])
        .await;

    assert_eq!(report.results().len(), 1);
    let uow = report.results()[0].as_ref().unwrap();
    assert_eq!(uow.event.tags.get("team").map(String::as_str), Some("billing"));
    assert_eq!(report.metrics.scalar("batch.utilization"), Some(0.2));
    assert!(report.metrics.stats("things|label|io.time").is_some());
    assert!(report.metrics.stats("things|noop|io.time").is_none());
}

#[tokio::test]
async fn test_disabled_metrics_skip_steps() {
    let config = Config::from_str(
        r#"
[metrics]
enabled = false
step_metrics = ["*"]

[[pipelines]]
id = "things"
event_type = "thing-created"

[[pipelines.stages]]
type = "noop"
"#,
    )
    .unwrap();

    let invocation = Invocation::from_config(&config, &default_registry()).unwrap();
    let report = invocation.run(0, vec![uow("thing-created", 0)]).await;

    assert_eq!(report.results().len(), 1);
    assert!(report.metrics.iter().all(|(key, _)| !key.contains("io.")));
    assert!(report.metrics.stats("things|pipeline.time").is_some());
}
