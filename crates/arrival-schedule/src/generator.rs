//! Schedule generator — closed-form start offsets for a rate curve.
//!
//! Each stage is a linear rate ramp `r(t) = from + (to - from) * t / dur`.
//! The number of iterations started by time `t` into the stage is the
//! integral of `r`, so the start time of the `k`-th iteration in the stage
//! is the root of a quadratic:
//!
//! ```text
//! constant:  t = k / to
//! ramp:      t = (from*dur - sqrt(dur * (from^2*dur + 2k(to - from)))) / (from - to)
//! ```
//!
//! `k` is counted from the fractional carry of the previous stage, so an
//! iteration whose instant straddles a stage boundary lands at the right
//! place in the next stage. Rates are tracked in iterations per nanosecond
//! and offsets are rounded to the nearest nanosecond.

use std::time::Duration;

use arrival_core::{RateCurve, Stage};
use arrival_segment::ExecutionTuple;

/// One entry of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledIteration {
    /// Global (cross-instance) iteration index, 0-based.
    pub iteration: u64,
    /// Start offset from the beginning of the test.
    pub offset: Duration,
}

/// The stage currently being walked.
#[derive(Debug, Clone, Copy)]
struct ActiveStage {
    /// Rate at the stage end, per ns.
    to: f64,
    /// Stage length in ns.
    duration_ns: u64,
}

/// Lazy iterator over the start offsets this instance owns.
///
/// Offsets are non-decreasing and the iterator ends after the last stage.
/// Identical inputs always produce bit-identical output.
#[derive(Debug, Clone)]
pub struct Schedule {
    stages: std::vec::IntoIter<Stage>,
    time_unit_ns: f64,
    gaps: Vec<u64>,
    gap_index: usize,
    /// 1-based global position of the next owned iteration.
    position: u64,
    /// Rate at the start of the current stage, per ns.
    rate: f64,
    /// Cumulative iteration count at the start of the current stage.
    done_so_far: f64,
    /// Cumulative iteration count at the end of the current stage.
    end_count: f64,
    /// Offset of the current stage's start, in ns.
    base_ns: u64,
    current: Option<ActiveStage>,
}

impl Schedule {
    pub fn new(curve: &RateCurve, tuple: &ExecutionTuple) -> Self {
        let offsets = tuple.striped_offsets();
        let time_unit_ns = curve.time_unit.as_nanos() as f64;
        Self {
            stages: curve.stages.clone().into_iter(),
            time_unit_ns,
            gaps: offsets.gaps.clone(),
            gap_index: 0,
            position: offsets.start + 1,
            rate: curve.start_rate as f64 / time_unit_ns,
            done_so_far: 0.0,
            end_count: 0.0,
            base_ns: 0,
            current: None,
        }
    }

    /// Schedule of an unsplit test.
    pub fn unsegmented(curve: &RateCurve) -> Self {
        Self::new(curve, &ExecutionTuple::unsegmented())
    }

    /// Yield the global iteration index alongside each offset.
    pub fn entries(self) -> Entries {
        Entries(self)
    }

    fn next_entry(&mut self) -> Option<ScheduledIteration> {
        loop {
            if let Some(stage) = self.current {
                if self.position as f64 <= self.end_count {
                    let entry = ScheduledIteration {
                        iteration: self.position - 1,
                        offset: self.offset_in(stage),
                    };
                    self.advance();
                    return Some(entry);
                }
                self.done_so_far = self.end_count;
                self.rate = stage.to;
                self.base_ns += stage.duration_ns;
                self.current = None;
            }

            let stage = self.stages.next()?;
            let to = stage.target as f64 / self.time_unit_ns;
            let duration_ns = stage.duration.as_nanos() as u64;
            let dur = duration_ns as f64;
            if self.rate == to {
                self.end_count += dur * to;
            } else {
                self.end_count += dur * ((to - self.rate) / 2.0 + self.rate);
            }
            self.current = Some(ActiveStage { to, duration_ns });
        }
    }

    /// Start offset of the current position within `stage`.
    fn offset_in(&self, stage: ActiveStage) -> Duration {
        let from = self.rate;
        let to = stage.to;
        let dur = stage.duration_ns as f64;
        let k = self.position as f64 - self.done_so_far;

        let x = if from == to {
            k / to
        } else {
            let radicand = (dur * (from * from * dur + 2.0 * k * (to - from))).max(0.0);
            (from * dur - radicand.sqrt()) / (from - to)
        };
        let x = x.clamp(0.0, dur).round();

        Duration::from_nanos(self.base_ns + x as u64)
    }

    fn advance(&mut self) {
        self.position += self.gaps[self.gap_index];
        self.gap_index = (self.gap_index + 1) % self.gaps.len();
    }
}

impl Iterator for Schedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        self.next_entry().map(|entry| entry.offset)
    }
}

/// See [`Schedule::entries`].
#[derive(Debug, Clone)]
pub struct Entries(Schedule);

impl Iterator for Entries {
    type Item = ScheduledIteration;

    fn next(&mut self) -> Option<ScheduledIteration> {
        self.0.next_entry()
    }
}
