//! Pool error types.

use thiserror::Error;

use crate::worker::WorkerId;

/// Errors that can occur while growing the pool.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to create worker {id}: {source}")]
    Create {
        id: WorkerId,
        #[source]
        source: anyhow::Error,
    },
}

pub type PoolResult<T> = Result<T, PoolError>;
