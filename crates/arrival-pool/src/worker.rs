//! Worker handles and the factory that creates their state.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Boxed, sendable future returned by the pool's callbacks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Stable identity of a worker within one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub u64);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Creates the per-worker state `W`.
///
/// Called once per worker, either during warm-up or when the pool grows.
pub trait WorkerFactory<W>: Send + Sync {
    fn create(&self, id: WorkerId) -> BoxFuture<'_, anyhow::Result<W>>;
}

impl<W, F> WorkerFactory<W> for F
where
    F: Fn(WorkerId) -> BoxFuture<'static, anyhow::Result<W>> + Send + Sync,
{
    fn create(&self, id: WorkerId) -> BoxFuture<'_, anyhow::Result<W>> {
        self(id)
    }
}

/// A worker checked out of (or parked in) the pool.
#[derive(Debug)]
pub struct Worker<W> {
    id: WorkerId,
    state: W,
}

impl<W> Worker<W> {
    pub(crate) fn new(id: WorkerId, state: W) -> Self {
        Self { id, state }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn state(&self) -> &W {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut W {
        &mut self.state
    }
}
