//! Samples emitted to the caller's sink as iterations finish or drop.

use std::time::Duration;

use serde::Serialize;

/// How an iteration ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "error")]
pub enum IterationOutcome {
    Completed,
    /// The runner returned an error.
    Failed(String),
    /// The runner returned after the run cancelled it.
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Sample {
    /// An iteration ran to the end.
    Iteration {
        iteration: u64,
        worker: u64,
        /// Scheduled start, from the beginning of the run.
        scheduled_at: Duration,
        /// Actual start, from the beginning of the run.
        started_at: Duration,
        duration: Duration,
        outcome: IterationOutcome,
    },
    /// An iteration was due but no worker could take it.
    DroppedIteration {
        iteration: u64,
        scheduled_at: Duration,
    },
}

impl Sample {
    pub fn iteration(&self) -> u64 {
        match self {
            Sample::Iteration { iteration, .. } | Sample::DroppedIteration { iteration, .. } => {
                *iteration
            }
        }
    }

    pub fn scheduled_at(&self) -> Duration {
        match self {
            Sample::Iteration { scheduled_at, .. }
            | Sample::DroppedIteration { scheduled_at, .. } => *scheduled_at,
        }
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, Sample::DroppedIteration { .. })
    }
}
