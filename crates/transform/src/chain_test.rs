//! Tests for stage chain

use super::*;
use crate::noop::NoopStage;
use crate::{StageFuture, TagStage};
use sluice_metrics::{FunctionMetrics, ManualClock, StepFilter};
use sluice_protocol::{Event, Fault, PipelineId};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

fn uow() -> UnitOfWork {
    UnitOfWork::new(Event::new("thing-created"))
}

struct OrderedStage {
    expected_order: usize,
    counter: Arc<AtomicUsize>,
    name: &'static str,
}

impl Stage for OrderedStage {
    fn process<'a>(&'a self, uow: UnitOfWork) -> StageFuture<'a> {
        let current = self.counter.fetch_add(1, Ordering::SeqCst);
        assert_eq!(
            current, self.expected_order,
            "stage {} executed out of order",
            self.name
        );
        Box::pin(async move { Ok(uow) })
    }

    fn name(&self) -> &str {
        self.name
    }
}

struct FailingStage;

impl Stage for FailingStage {
    fn process<'a>(&'a self, uow: UnitOfWork) -> StageFuture<'a> {
        Box::pin(async move { Err(Fault::stage(uow, "failing", "intentional failure")) })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

struct TrackingStage {
    called: Arc<AtomicBool>,
}

impl Stage for TrackingStage {
    fn process<'a>(&'a self, uow: UnitOfWork) -> StageFuture<'a> {
        self.called.store(true, Ordering::SeqCst);
        Box::pin(async move { Ok(uow) })
    }

    fn name(&self) -> &str {
        "tracking"
    }
}

struct DisabledStage;

impl Stage for DisabledStage {
    fn process<'a>(&'a self, uow: UnitOfWork) -> StageFuture<'a> {
        Box::pin(async move { Ok(uow) })
    }

    fn name(&self) -> &str {
        "disabled"
    }

    fn enabled(&self) -> bool {
        false
    }
}

#[tokio::test]
async fn test_empty_chain() {
    let chain = Chain::empty();

    assert!(!chain.is_enabled());
    assert!(chain.is_empty());
    assert_eq!(chain.len(), 0);

    let out = chain.process(uow()).await.unwrap();
    assert_eq!(out.event.event_type, "thing-created");
}

#[test]
fn test_default_chain_is_empty() {
    let chain = Chain::default();
    assert!(!chain.is_enabled());
    assert!(chain.is_empty());
}

#[test]
fn test_chain_filters_disabled() {
    let chain = Chain::new(vec![Box::new(DisabledStage), Box::new(NoopStage::new())]);

    assert_eq!(chain.len(), 1);
    assert_eq!(chain.names(), vec!["noop"]);
}

#[tokio::test]
async fn test_chain_sequential_execution() {
    let counter = Arc::new(AtomicUsize::new(0));
    let stage = |expected_order, name| {
        Box::new(OrderedStage {
            expected_order,
            counter: Arc::clone(&counter),
            name,
        }) as Box<dyn Stage>
    };

    let chain = Chain::new(vec![stage(0, "first"), stage(1, "second"), stage(2, "third")]);

    assert!(chain.process(uow()).await.is_ok());
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_chain_fault_stops_execution() {
    let second_called = Arc::new(AtomicBool::new(false));
    let chain = Chain::new(vec![
        Box::new(TagStage::new([("seen", "yes")])),
        Box::new(FailingStage),
        Box::new(TrackingStage {
            called: Arc::clone(&second_called),
        }),
    ]);

    let fault = chain.process(uow()).await.unwrap_err();

    assert!(!second_called.load(Ordering::SeqCst));
    // the fault carries the UoW as the failing stage received it
    assert_eq!(fault.uow.event.tags.get("seen").map(String::as_str), Some("yes"));
    assert!(fault.to_string().contains("intentional failure"));
}

#[tokio::test]
async fn test_timed_chain_records_each_stage() {
    let (clock, shared) = ManualClock::shared(0);
    let function = FunctionMetrics::start_for_batch(0, 1, 1, shared, StepFilter::from_names(["tag"]));
    let forked = uow().fork(PipelineId::new("p1"), function.start_pipeline("p1"));
    clock.set(5);

    let chain = Chain::new(vec![
        Box::new(NoopStage::new()),
        Box::new(TagStage::new([("a", "b")])),
    ])
    .timed();
    assert_eq!(chain.names(), vec!["noop", "tag"]);

    let out = chain.process(forked).await.unwrap();
    let checkpoints = out.metrics.as_ref().unwrap().checkpoints();
    assert_eq!(checkpoints.get("p1|tag|io.wait.time"), Some(&5));
    assert_eq!(checkpoints.get("p1|tag|io.time"), Some(&0));
    assert!(!checkpoints.contains_key("p1|noop|io.time"));
}
