//! Step timing decorator
//!
//! Brackets a stage with `start_step` / `end_step` on the UoW's metrics
//! context. For a batched UoW every sibling's context is bracketed.

use crate::{Stage, StageFuture};
use sluice_protocol::UnitOfWork;

/// Stage wrapper recording `io.wait.time` and `io.time`
pub struct Timed<S> {
    inner: S,
}

impl<S: Stage> Timed<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: Stage> Stage for Timed<S> {
    fn process<'a>(&'a self, mut uow: UnitOfWork) -> StageFuture<'a> {
        Box::pin(async move {
            let name = self.inner.name();
            uow.for_each_metrics(|ctx| ctx.start_step(name));

            match self.inner.process(uow).await {
                Ok(mut uow) => {
                    uow.for_each_metrics(|ctx| ctx.end_step(name));
                    Ok(uow)
                }
                Err(mut fault) => {
                    fault.uow.for_each_metrics(|ctx| ctx.end_step(name));
                    Err(fault)
                }
            }
        })
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn enabled(&self) -> bool {
        self.inner.enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_metrics::{FunctionMetrics, ManualClock, StepFilter};
    use sluice_protocol::{Event, Fault, PipelineId};
    use std::sync::Arc;

    struct Sleepy {
        clock: Arc<ManualClock>,
        fail: bool,
    }

    impl Stage for Sleepy {
        fn process<'a>(&'a self, uow: UnitOfWork) -> StageFuture<'a> {
            Box::pin(async move {
                self.clock.advance(30);
                if self.fail {
                    Err(Fault::stage(uow, "sleepy", "woke up grumpy"))
                } else {
                    Ok(uow)
                }
            })
        }

        fn name(&self) -> &str {
            "sleepy"
        }
    }

    fn forked(clock: &Arc<ManualClock>) -> UnitOfWork {
        let function = FunctionMetrics::start_for_batch(
            0,
            1,
            1,
            clock.clone(),
            StepFilter::All,
        );
        UnitOfWork::new(Event::new("a")).fork(PipelineId::new("p1"), function.start_pipeline("p1"))
    }

    #[tokio::test]
    async fn test_timed_records_step() {
        let clock = Arc::new(ManualClock::new(0));
        let stage = Timed::new(Sleepy {
            clock: clock.clone(),
            fail: false,
        });

        let uow = stage.process(forked(&clock)).await.unwrap();
        let ctx = uow.metrics.unwrap();
        assert_eq!(ctx.checkpoints().get("p1|sleepy|io.wait.time"), Some(&0));
        assert_eq!(ctx.checkpoints().get("p1|sleepy|io.time"), Some(&30));
    }

    #[tokio::test]
    async fn test_timed_records_step_on_fault() {
        let clock = Arc::new(ManualClock::new(0));
        let stage = Timed::new(Sleepy {
            clock: clock.clone(),
            fail: true,
        });

        let fault = stage.process(forked(&clock)).await.unwrap_err();
        let ctx = fault.uow.metrics.as_ref().unwrap();
        assert_eq!(ctx.checkpoints().get("p1|sleepy|io.time"), Some(&30));
    }
}
