//! Worker pool — pre-allocated workers plus bounded on-demand growth.
//!
//! Workers are created up front to `pre_allocated` and recycled back to
//! the pool after every iteration. When none is idle, the pool may reserve
//! a slot for one more, up to `max`. Reserving is synchronous and happens
//! under the same lock as the idle check, so concurrent checkouts can never
//! push the total past the cap. Creating the reserved worker's state is
//! async and happens outside the lock.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::error::{PoolError, PoolResult};
use crate::worker::{Worker, WorkerFactory, WorkerId};

/// Worker counts for a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Workers created by [`WorkerPool::warm_up`].
    pub pre_allocated: u64,
    /// Hard cap on live workers (idle + busy + reserved).
    pub max: u64,
}

impl PoolConfig {
    pub fn new(pre_allocated: u64, max: u64) -> Self {
        Self {
            pre_allocated,
            max: max.max(pre_allocated),
        }
    }
}

/// Outcome of [`WorkerPool::checkout`].
#[derive(Debug)]
pub enum Checkout<W> {
    /// An idle worker, ready to run.
    Idle(Worker<W>),
    /// No idle worker, but a slot was reserved for a new one. Redeem it with
    /// [`WorkerPool::fill`].
    Grow(Reservation),
    /// Every slot up to the cap is taken.
    Exhausted,
}

/// A claimed slot for a worker that has not been created yet.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an unredeemed reservation holds a pool slot forever"]
pub struct Reservation {
    id: WorkerId,
}

impl Reservation {
    pub fn id(&self) -> WorkerId {
        self.id
    }
}

struct PoolState<W> {
    idle: VecDeque<Worker<W>>,
    /// Live workers plus outstanding reservations.
    total: u64,
    peak: u64,
    next_id: u64,
}

impl<W> PoolState<W> {
    fn reserve(&mut self) -> Reservation {
        let id = WorkerId(self.next_id);
        self.next_id += 1;
        self.total += 1;
        self.peak = self.peak.max(self.total);
        Reservation { id }
    }
}

/// Bounded pool of reusable workers with state `W`.
pub struct WorkerPool<W> {
    factory: Box<dyn WorkerFactory<W>>,
    config: PoolConfig,
    state: Mutex<PoolState<W>>,
}

impl<W> WorkerPool<W> {
    pub fn new(factory: impl WorkerFactory<W> + 'static, config: PoolConfig) -> Self {
        Self {
            factory: Box::new(factory),
            config,
            state: Mutex::new(PoolState {
                idle: VecDeque::new(),
                total: 0,
                peak: 0,
                next_id: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolState<W>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create workers until the pool holds `pre_allocated` of them.
    pub async fn warm_up(&self) -> PoolResult<()> {
        let needed = self.config.pre_allocated.saturating_sub(self.total_count());

        for _ in 0..needed {
            let reservation = self.lock().reserve();
            let worker = self.fill(reservation).await?;
            self.lock().idle.push_back(worker);
        }

        info!(
            pre_allocated = self.config.pre_allocated,
            max = self.config.max,
            created = needed,
            "worker pool warmed"
        );
        Ok(())
    }

    /// Take a worker for one iteration.
    ///
    /// Prefers an idle worker, then reserves a new slot if under the cap.
    pub fn checkout(&self) -> Checkout<W> {
        let mut state = self.lock();
        if let Some(worker) = state.idle.pop_front() {
            return Checkout::Idle(worker);
        }
        if state.total < self.config.max {
            let reservation = state.reserve();
            debug!(worker = %reservation.id, total = state.total, "reserved new worker slot");
            return Checkout::Grow(reservation);
        }
        Checkout::Exhausted
    }

    /// Create the worker for a reserved slot.
    ///
    /// On failure the slot is given back, so a later checkout can try again.
    pub async fn fill(&self, reservation: Reservation) -> PoolResult<Worker<W>> {
        let id = reservation.id;
        match self.factory.create(id).await {
            Ok(state) => {
                debug!(worker = %id, "created worker");
                Ok(Worker::new(id, state))
            }
            Err(source) => {
                warn!(worker = %id, error = %source, "worker creation failed");
                self.cancel(reservation);
                Err(PoolError::Create { id, source })
            }
        }
    }

    /// Give back a reserved slot without creating its worker.
    pub fn cancel(&self, reservation: Reservation) {
        let mut state = self.lock();
        state.total = state.total.saturating_sub(1);
        debug!(worker = %reservation.id, total = state.total, "released worker slot");
    }

    /// Return a worker to the pool for reuse.
    pub fn release(&self, worker: Worker<W>) {
        self.lock().idle.push_back(worker);
    }

    /// Discard a worker that must not be reused, freeing its slot.
    pub fn retire(&self, worker: Worker<W>) {
        let mut state = self.lock();
        state.total = state.total.saturating_sub(1);
        debug!(worker = %worker.id(), total = state.total, "retired worker");
    }

    pub fn idle_count(&self) -> usize {
        self.lock().idle.len()
    }

    /// Live workers plus outstanding reservations.
    pub fn total_count(&self) -> u64 {
        self.lock().total
    }

    /// Workers currently checked out or being created.
    pub fn active_count(&self) -> u64 {
        let state = self.lock();
        state.total - state.idle.len() as u64
    }

    /// Highest total the pool has reached.
    pub fn peak_count(&self) -> u64 {
        self.lock().peak
    }

    pub fn max_workers(&self) -> u64 {
        self.config.max
    }

    pub fn pre_allocated(&self) -> u64 {
        self.config.pre_allocated
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;
    use crate::worker::BoxFuture;

    fn counting_pool(pre: u64, max: u64) -> (WorkerPool<u64>, Arc<AtomicU64>) {
        let created = Arc::new(AtomicU64::new(0));
        let counter = created.clone();
        let factory = move |id: WorkerId| -> BoxFuture<'static, anyhow::Result<u64>> {
            counter.fetch_add(1, Ordering::Relaxed);
            Box::pin(async move { Ok(id.0 * 10) })
        };
        (WorkerPool::new(factory, PoolConfig::new(pre, max)), created)
    }

    #[test]
    fn config_never_caps_below_pre_allocated() {
        assert_eq!(PoolConfig::new(5, 2), PoolConfig { pre_allocated: 5, max: 5 });
        assert_eq!(PoolConfig::new(2, 5).max, 5);
    }

    #[tokio::test]
    async fn warm_up_creates_pre_allocated() {
        let (pool, created) = counting_pool(3, 5);
        pool.warm_up().await.unwrap();
        assert_eq!(pool.idle_count(), 3);
        assert_eq!(pool.total_count(), 3);
        assert_eq!(created.load(Ordering::Relaxed), 3);

        // Idempotent.
        pool.warm_up().await.unwrap();
        assert_eq!(created.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn idle_then_grow_then_exhausted() {
        let (pool, _) = counting_pool(1, 2);
        pool.warm_up().await.unwrap();

        let first = match pool.checkout() {
            Checkout::Idle(worker) => worker,
            other => panic!("expected idle worker, got {other:?}"),
        };
        assert_eq!(first.id(), WorkerId(0));

        let reservation = match pool.checkout() {
            Checkout::Grow(reservation) => reservation,
            other => panic!("expected reservation, got {other:?}"),
        };
        assert_eq!(reservation.id(), WorkerId(1));
        assert!(matches!(pool.checkout(), Checkout::Exhausted));
        assert_eq!(pool.active_count(), 2);

        let second = pool.fill(reservation).await.unwrap();
        assert_eq!(*second.state(), 10);

        pool.release(first);
        assert!(matches!(pool.checkout(), Checkout::Idle(w) if w.id() == WorkerId(0)));
        pool.release(second);
        assert_eq!(pool.peak_count(), 2);
    }

    #[tokio::test]
    async fn failed_creation_frees_the_slot() {
        let factory = |id: WorkerId| -> BoxFuture<'static, anyhow::Result<()>> {
            Box::pin(async move { Err::<(), _>(anyhow::anyhow!("no capacity for {id}")) })
        };
        let pool = WorkerPool::new(factory, PoolConfig::new(0, 1));

        let Checkout::Grow(reservation) = pool.checkout() else {
            panic!("expected reservation");
        };
        let err = pool.fill(reservation).await.unwrap_err();
        assert!(err.to_string().contains("failed to create worker 0"));
        assert_eq!(pool.total_count(), 0);
        assert!(matches!(pool.checkout(), Checkout::Grow(_)));
    }

    #[tokio::test]
    async fn warm_up_failure_is_reported() {
        let factory = |id: WorkerId| -> BoxFuture<'static, anyhow::Result<()>> {
            Box::pin(async move {
                if id.0 == 1 {
                    anyhow::bail!("boom");
                }
                Ok(())
            })
        };
        let pool = WorkerPool::new(factory, PoolConfig::new(3, 3));
        assert!(matches!(
            pool.warm_up().await,
            Err(PoolError::Create { id: WorkerId(1), .. })
        ));
        assert_eq!(pool.total_count(), 1);
    }

    #[tokio::test]
    async fn retired_worker_is_replaced() {
        let (pool, created) = counting_pool(1, 1);
        pool.warm_up().await.unwrap();

        let Checkout::Idle(worker) = pool.checkout() else {
            panic!("expected idle worker");
        };
        assert!(matches!(pool.checkout(), Checkout::Exhausted));
        pool.retire(worker);
        assert_eq!(pool.total_count(), 0);

        let Checkout::Grow(reservation) = pool.checkout() else {
            panic!("expected reservation");
        };
        let replacement = pool.fill(reservation).await.unwrap();
        assert_eq!(replacement.id(), WorkerId(1));
        assert_eq!(created.load(Ordering::Relaxed), 2);
        assert_eq!(pool.peak_count(), 1);
    }

    #[test]
    fn cancel_returns_the_slot() {
        let (pool, _) = counting_pool(0, 1);
        let Checkout::Grow(reservation) = pool.checkout() else {
            panic!("expected reservation");
        };
        pool.cancel(reservation);
        assert_eq!(pool.total_count(), 0);
        assert_eq!(pool.peak_count(), 1);
    }
}
