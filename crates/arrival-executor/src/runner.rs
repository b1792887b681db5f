//! The iteration callback and the context it receives.

use std::time::Duration;

use tokio::sync::watch;

use arrival_pool::{BoxFuture, WorkerId};

/// Everything an iteration knows about itself.
#[derive(Debug, Clone)]
pub struct IterationContext {
    /// Global iteration index, unique across all instances of a split test.
    pub iteration: u64,
    /// Scheduled start, as an offset from the beginning of the run.
    pub scheduled_at: Duration,
    pub worker: WorkerId,
    cancel: watch::Receiver<bool>,
}

impl IterationContext {
    pub fn new(
        iteration: u64,
        scheduled_at: Duration,
        worker: WorkerId,
        cancel: watch::Receiver<bool>,
    ) -> Self {
        Self {
            iteration,
            scheduled_at,
            worker,
            cancel,
        }
    }

    /// Whether the run has asked in-flight iterations to stop.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Resolve when the run cancels in-flight iterations.
    pub async fn cancelled(&mut self) {
        arrival_schedule::wait_for_shutdown(&mut self.cancel).await;
    }
}

/// Runs one iteration on a worker.
///
/// The executor treats the body as opaque. An `Err` marks the iteration
/// failed; the worker is returned to the pool either way.
pub trait IterationRunner<W>: Send + Sync {
    fn run<'a>(
        &'a self,
        worker: &'a mut W,
        ctx: IterationContext,
    ) -> BoxFuture<'a, anyhow::Result<()>>;
}

/// Sleeps for a fixed time per iteration, cutting the sleep short on
/// cancellation. Stands in for a real workload.
#[derive(Debug, Clone, Copy)]
pub struct SleepRunner {
    pub duration: Duration,
}

impl SleepRunner {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl<W> IterationRunner<W> for SleepRunner {
    fn run<'a>(
        &'a self,
        _worker: &'a mut W,
        mut ctx: IterationContext,
    ) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            tokio::select! {
                _ = tokio::time::sleep(self.duration) => {}
                _ = ctx.cancelled() => {}
            }
            Ok(())
        })
    }
}
