//! Run statistics — lock-free counters shared by the pacer and the
//! iteration tasks, snapshotted once the run ends.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::Serialize;

/// Final numbers of a run.
///
/// `dispatched == completed + failed + interrupted + dropped` once every
/// iteration has finished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Iterations whose start time was reached.
    pub dispatched: u64,
    pub completed: u64,
    pub failed: u64,
    /// Iterations still running when cancelled.
    pub interrupted: u64,
    /// Iterations skipped for lack of a worker.
    pub dropped: u64,
    /// Times the pool ran out of workers (consecutive drops count once).
    pub shortfall_episodes: u64,
    /// Most workers alive at once.
    pub peak_workers: u64,
    /// Samples the sink had no room for before the run stopped waiting.
    pub lost_samples: u64,
    /// Whether an external shutdown cut the run short.
    pub shut_down: bool,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCollector {
    dispatched: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    interrupted: AtomicU64,
    dropped: AtomicU64,
    shortfall_episodes: AtomicU64,
    lost_samples: AtomicU64,
    shut_down: AtomicBool,
}

impl StatsCollector {
    pub(crate) fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_interrupted(&self) {
        self.interrupted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_shortfall(&self) {
        self.shortfall_episodes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lost_sample(&self) {
        self.lost_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_shutdown(&self) {
        self.shut_down.store(true, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, peak_workers: u64) -> RunStats {
        RunStats {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            interrupted: self.interrupted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            shortfall_episodes: self.shortfall_episodes.load(Ordering::Relaxed),
            peak_workers,
            lost_samples: self.lost_samples.load(Ordering::Relaxed),
            shut_down: self.shut_down.load(Ordering::Relaxed),
        }
    }
}
