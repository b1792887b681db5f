//! arrival-executor — open-model load pacing.
//!
//! [`ArrivalRateExecutor`] starts iterations at the instants the schedule
//! dictates and runs each on a worker from a bounded
//! [`WorkerPool`](arrival_pool::WorkerPool). The caller supplies the worker
//! state ([`WorkerFactory`](arrival_pool::WorkerFactory)), the iteration
//! body ([`IterationRunner`]) and a channel for [`Sample`]s; the run ends
//! with a [`RunStats`] summary.

pub mod error;
pub mod executor;
pub mod runner;
pub mod sample;
pub mod stats;

pub use error::{ExecutorError, ExecutorResult};
pub use executor::ArrivalRateExecutor;
pub use runner::{IterationContext, IterationRunner, SleepRunner};
pub use sample::{IterationOutcome, Sample};
pub use stats::RunStats;
