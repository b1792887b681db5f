//! Arrival-rate executor — starts iterations on schedule, regardless of
//! how long earlier ones take.
//!
//! The pacer pulls offsets from the producer, sleeps until each one is due
//! and hands the iteration to a pooled worker in its own task. It never
//! waits for a worker: when the pool is exhausted the iteration is dropped
//! and reported, so a slow system under test cannot bend the arrival rate.
//!
//! ```text
//! Schedule ──▶ producer ──mpsc──▶ pacer ──checkout──▶ WorkerPool
//!                                   │
//!                                   └── spawn ──▶ IterationRunner ──▶ Sample sink
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinSet};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info, warn};

use arrival_core::ArrivalRateConfig;
use arrival_pool::{Checkout, PoolConfig, Reservation, Worker, WorkerFactory, WorkerPool};
use arrival_schedule::{Schedule, ScheduledIteration, spawn_producer, wait_for_shutdown};
use arrival_segment::ExecutionTuple;

use crate::error::ExecutorResult;
use crate::runner::{IterationContext, IterationRunner};
use crate::sample::{IterationOutcome, Sample};
use crate::stats::{RunStats, StatsCollector};

/// How far the producer may run ahead of the pacer.
const PRODUCER_BUFFER: usize = 32;

/// Runs one arrival-rate test on this instance's share of the schedule.
pub struct ArrivalRateExecutor<W> {
    config: ArrivalRateConfig,
    tuple: ExecutionTuple,
    pool: Arc<WorkerPool<W>>,
    runner: Arc<dyn IterationRunner<W>>,
}

/// A worker, or the right to create one.
enum Slot<W> {
    Ready(Worker<W>),
    Reserved(Reservation),
}

impl<W: Send + 'static> ArrivalRateExecutor<W> {
    /// Validate `config` and size the pool for this instance's segment.
    pub fn new(
        config: ArrivalRateConfig,
        factory: impl WorkerFactory<W> + 'static,
        runner: impl IterationRunner<W> + 'static,
    ) -> ExecutorResult<Self> {
        config.validate()?;
        let tuple = config.execution_tuple()?;
        let pool_config = PoolConfig::new(
            config.pre_allocated_workers_for(&tuple),
            config.max_workers_for(&tuple),
        );
        Ok(Self {
            pool: Arc::new(WorkerPool::new(factory, pool_config)),
            runner: Arc::new(runner),
            config,
            tuple,
        })
    }

    pub fn config(&self) -> &ArrivalRateConfig {
        &self.config
    }

    pub fn tuple(&self) -> &ExecutionTuple {
        &self.tuple
    }

    pub fn pool(&self) -> &WorkerPool<W> {
        &self.pool
    }

    pub fn description(&self) -> String {
        self.config.description(&self.tuple)
    }

    /// Run the whole test.
    ///
    /// Returns once the schedule is exhausted (or `shutdown` flips) and
    /// every started iteration has returned. Iterations still running
    /// `graceful_stop` after the last stage, or at shutdown, are asked to
    /// stop through their context but are never aborted.
    ///
    /// A full sample sink never holds up the schedule. Dropped-iteration
    /// samples that find it full, and iteration samples still waiting on it
    /// when iterations are cancelled, are discarded and counted in
    /// [`RunStats::lost_samples`].
    pub async fn run(
        &self,
        mut shutdown: watch::Receiver<bool>,
        samples: mpsc::Sender<Sample>,
    ) -> ExecutorResult<RunStats> {
        let name = self.config.name.as_str();
        self.pool.warm_up().await?;
        info!(executor = %name, segment = %self.tuple, "{}", self.description());

        let curve = self.config.rate_curve();
        let stats = Arc::new(StatsCollector::default());
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (mut entries, producer) = spawn_producer(
            Schedule::new(&curve, &self.tuple).entries(),
            PRODUCER_BUFFER,
            shutdown.clone(),
        );

        let start = Instant::now();
        let hard_stop = start + curve.total_duration() + self.config.graceful_stop;
        let mut tasks = JoinSet::new();
        let mut shut_down = false;
        let mut short_of_workers = false;

        'dispatch: loop {
            let entry = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => {
                    shut_down = true;
                    break 'dispatch;
                }
                entry = entries.recv() => match entry {
                    Some(entry) => entry,
                    None => break 'dispatch,
                },
            };

            let due = start + entry.offset;
            loop {
                tokio::select! {
                    biased;
                    _ = wait_for_shutdown(&mut shutdown) => {
                        shut_down = true;
                        break 'dispatch;
                    }
                    _ = sleep_until(due) => break,
                    Some(joined) = tasks.join_next() => log_join(joined),
                }
            }

            stats.record_dispatched();
            let slot = match self.pool.checkout() {
                Checkout::Idle(worker) => Slot::Ready(worker),
                Checkout::Grow(reservation) => Slot::Reserved(reservation),
                Checkout::Exhausted => {
                    stats.record_dropped();
                    if !short_of_workers {
                        short_of_workers = true;
                        stats.record_shortfall();
                        let max = self.pool.max_workers();
                        warn!(
                            executor = %name,
                            max,
                            "Insufficient workers, reached {max} active workers and cannot allocate more"
                        );
                    }
                    let dropped = Sample::DroppedIteration {
                        iteration: entry.iteration,
                        scheduled_at: entry.offset,
                    };
                    if samples.try_send(dropped).is_err() {
                        stats.record_lost_sample();
                    }
                    continue;
                }
            };
            short_of_workers = false;

            let task = IterationTask {
                pool: self.pool.clone(),
                runner: self.runner.clone(),
                stats: stats.clone(),
                samples: samples.clone(),
                shutdown: shutdown.clone(),
                cancel: cancel_rx.clone(),
                start,
            };
            tasks.spawn(task.run(slot, entry));
        }
        drop(entries);

        let mut cancelled = shut_down;
        if shut_down {
            stats.record_shutdown();
            info!(executor = %name, in_flight = tasks.len(), "shutdown requested, interrupting iterations");
            cancel_tx.send_replace(true);
        }

        loop {
            tokio::select! {
                biased;
                joined = tasks.join_next() => match joined {
                    Some(joined) => log_join(joined),
                    None => break,
                },
                _ = wait_for_shutdown(&mut shutdown), if !cancelled => {
                    cancelled = true;
                    stats.record_shutdown();
                    info!(executor = %name, in_flight = tasks.len(), "shutdown requested, interrupting iterations");
                    cancel_tx.send_replace(true);
                }
                _ = sleep_until(hard_stop), if !cancelled => {
                    cancelled = true;
                    warn!(
                        executor = %name,
                        in_flight = tasks.len(),
                        graceful_stop = ?self.config.graceful_stop,
                        "graceful stop reached, interrupting iterations"
                    );
                    cancel_tx.send_replace(true);
                }
            }
        }

        match producer.await {
            Ok(produced) => debug!(executor = %name, produced, "schedule drained"),
            Err(e) => error!(executor = %name, error = %e, "schedule producer failed"),
        }

        let stats = stats.snapshot(self.pool.peak_count());
        info!(
            executor = %name,
            dispatched = stats.dispatched,
            completed = stats.completed,
            failed = stats.failed,
            interrupted = stats.interrupted,
            dropped = stats.dropped,
            peak_workers = stats.peak_workers,
            lost_samples = stats.lost_samples,
            "run finished"
        );
        Ok(stats)
    }
}

/// State one spawned iteration needs.
struct IterationTask<W> {
    pool: Arc<WorkerPool<W>>,
    runner: Arc<dyn IterationRunner<W>>,
    stats: Arc<StatsCollector>,
    samples: mpsc::Sender<Sample>,
    shutdown: watch::Receiver<bool>,
    cancel: watch::Receiver<bool>,
    start: Instant,
}

impl<W: Send + 'static> IterationTask<W> {
    async fn run(mut self, slot: Slot<W>, entry: ScheduledIteration) {
        let mut worker = match slot {
            Slot::Ready(worker) => worker,
            Slot::Reserved(reservation) => match self.pool.fill(reservation).await {
                Ok(worker) => worker,
                Err(e) => {
                    error!(iteration = entry.iteration, error = %e, "dropping iteration");
                    self.stats.record_dropped();
                    let dropped = Sample::DroppedIteration {
                        iteration: entry.iteration,
                        scheduled_at: entry.offset,
                    };
                    self.emit(dropped).await;
                    return;
                }
            },
        };

        let worker_id = worker.id();
        let ctx = IterationContext::new(entry.iteration, entry.offset, worker_id, self.cancel.clone());
        let started = Instant::now();
        let result = AssertUnwindSafe(async { self.runner.run(worker.state_mut(), ctx).await })
            .catch_unwind()
            .await;
        let duration = started.elapsed();

        let result = match result {
            Ok(result) => {
                self.pool.release(worker);
                result
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(iteration = entry.iteration, worker = %worker_id, %message, "iteration panicked, retiring worker");
                self.pool.retire(worker);
                Err(anyhow::anyhow!("iteration panicked: {message}"))
            }
        };

        let cancelled = *self.cancel.borrow();
        let outcome = match result {
            _ if cancelled => {
                self.stats.record_interrupted();
                IterationOutcome::Interrupted
            }
            Ok(()) => {
                self.stats.record_completed();
                IterationOutcome::Completed
            }
            Err(e) => {
                debug!(iteration = entry.iteration, worker = %worker_id, error = %e, "iteration failed");
                self.stats.record_failed();
                IterationOutcome::Failed(format!("{e:#}"))
            }
        };

        let sample = Sample::Iteration {
            iteration: entry.iteration,
            worker: worker_id.0,
            scheduled_at: entry.offset,
            started_at: started - self.start,
            duration,
            outcome,
        };
        self.emit(sample).await;
    }

    /// Push a sample. A full sink is waited on until the run cancels
    /// in-flight iterations or shuts down; the sample is then counted lost.
    async fn emit(&mut self, sample: Sample) {
        let sent = tokio::select! {
            biased;
            sent = self.samples.send(sample) => sent.is_ok(),
            _ = wait_for_shutdown(&mut self.cancel) => false,
            _ = wait_for_shutdown(&mut self.shutdown) => false,
        };
        if !sent {
            self.stats.record_lost_sample();
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "iteration task panicked");
    }
}
