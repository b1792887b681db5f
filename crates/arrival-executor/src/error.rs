//! Executor error types.

use thiserror::Error;

/// Errors that stop a run before or while it starts.
///
/// Capacity shortfalls and failing iterations are not errors; they are
/// reported as samples and counted in the run statistics.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("invalid executor config: {0}")]
    Config(#[from] arrival_core::ConfigError),

    #[error("worker pre-allocation failed: {0}")]
    PreAllocation(#[from] arrival_pool::PoolError),
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
