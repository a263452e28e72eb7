//! Tests for UnitOfWork forking and batching

use crate::{Event, PipelineId, RecordRef, UnitOfWork};
use sluice_metrics::{FunctionMetrics, ManualClock, StepFilter};

fn function() -> FunctionMetrics {
    let (_clock, shared) = ManualClock::shared(0);
    FunctionMetrics::start_for_batch(0, 2, 2, shared, StepFilter::All)
}

fn uow(event_type: &str, sequence: u64) -> UnitOfWork {
    UnitOfWork::new(Event::new(event_type)).with_record(RecordRef::new(format!("r-{sequence}"), sequence))
}

#[test]
fn test_unforked_pipeline_name() {
    assert_eq!(uow("a", 0).pipeline_name(), "undefined");
}

#[test]
fn test_fork_sets_pipeline_and_metrics() {
    let metrics = function();
    let original = uow("a", 0);
    let fork = original.fork(PipelineId::new("p1"), metrics.start_pipeline("p1"));

    assert_eq!(fork.pipeline_name(), "p1");
    assert_eq!(fork.metrics.as_ref().map(|m| m.pipeline()), Some("p1"));
    assert_eq!(fork.record, original.record);
    assert!(original.metrics.is_none());
}

#[test]
fn test_forks_are_isolated() {
    let metrics = function();
    let original = uow("a", 0);
    let mut a = original.fork(PipelineId::new("p1"), metrics.start_pipeline("p1"));
    let b = original.fork(PipelineId::new("p2"), metrics.start_pipeline("p2"));

    a.event.tags.insert("touched".into(), "yes".into());
    a.attach("k", 1);
    if let Some(ctx) = a.metrics_mut() {
        ctx.gauge("g", 1.0);
    }

    assert!(b.event.tags.is_empty());
    assert!(b.attachment("k").is_none());
    assert!(b.metrics.as_ref().is_some_and(|m| m.gauge_values().is_empty()));
}

#[test]
fn test_batch_and_unbatch() {
    let metrics = function();
    let siblings: Vec<_> = (0..3)
        .map(|i| uow("a", i).fork(PipelineId::new("p1"), metrics.start_pipeline("p1")))
        .collect();

    let batched = UnitOfWork::batched(siblings);
    assert!(batched.is_batch());
    assert_eq!(batched.pipeline_name(), "p1");
    assert!(batched.metrics.is_none());

    let back = batched.unbatch();
    let sequences: Vec<_> = back.iter().filter_map(|u| u.record.as_ref().map(|r| r.sequence)).collect();
    assert_eq!(sequences, vec![0, 1, 2]);
}

#[test]
fn test_unbatch_plain_uow_yields_itself() {
    let single = uow("a", 7).unbatch();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].record.as_ref().map(|r| r.sequence), Some(7));
}

#[test]
fn test_for_each_metrics_reaches_siblings() {
    let metrics = function();
    let siblings: Vec<_> = (0..2)
        .map(|i| uow("a", i).fork(PipelineId::new("p1"), metrics.start_pipeline("p1")))
        .collect();
    let mut batched = UnitOfWork::batched(siblings);

    batched.for_each_metrics(|ctx| ctx.gauge("seen", 1.0));

    for sibling in batched.unbatch() {
        let values = sibling.metrics.as_ref().and_then(|m| m.gauge_values().get("p1|seen").cloned());
        assert_eq!(values, Some(vec![1.0]));
    }
}

#[test]
fn test_siblings_view() {
    let mut plain = uow("a", 1);
    assert_eq!(plain.siblings().len(), 1);
    plain.siblings_mut()[0].attach("k", "v");
    assert_eq!(plain.attachment("k"), Some(&serde_json::json!("v")));

    let mut batched = UnitOfWork::batched(vec![uow("a", 1), uow("b", 2)]);
    assert_eq!(batched.siblings().len(), 2);
    for sibling in batched.siblings_mut() {
        sibling.attach("k", "v");
    }
    assert!(batched.attachment("k").is_none());
    assert!(batched.unbatch().iter().all(|u| u.attachment("k").is_some()));
}
