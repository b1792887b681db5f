//! arrival-pool — the workers iterations run on.
//!
//! A [`WorkerPool`] starts with a pre-allocated set of workers and grows on
//! demand up to a hard cap. Every checkout goes through one lock, so the
//! decision between reusing an idle worker, reserving a slot for a new one
//! and reporting exhaustion is never raced.

pub mod error;
pub mod pool;
pub mod worker;

pub use error::{PoolError, PoolResult};
pub use pool::{Checkout, PoolConfig, Reservation, WorkerPool};
pub use worker::{BoxFuture, Worker, WorkerFactory, WorkerId};
