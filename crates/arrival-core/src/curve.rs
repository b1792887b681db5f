//! Rate curve — piecewise-linear target throughput over stages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One leg of the rate curve.
///
/// The rate moves linearly from wherever the previous stage left it to
/// `target` over `duration`. A zero duration is an instant jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    /// Target rate, in iterations per time unit, reached at the stage end.
    pub target: u64,
}

impl Stage {
    pub fn new(duration: Duration, target: u64) -> Self {
        Self { duration, target }
    }
}

/// The full throughput profile of a test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateCurve {
    /// Unit the rates are expressed against (`target` per `time_unit`).
    pub time_unit: Duration,
    /// Rate at t=0.
    pub start_rate: u64,
    pub stages: Vec<Stage>,
}

impl RateCurve {
    pub fn new(time_unit: Duration, start_rate: u64, stages: Vec<Stage>) -> Self {
        Self {
            time_unit,
            start_rate,
            stages,
        }
    }

    /// Sum of all stage durations.
    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }

    /// Highest rate the curve ever reaches, per time unit.
    pub fn max_rate(&self) -> u64 {
        self.stages
            .iter()
            .map(|s| s.target)
            .fold(self.start_rate, u64::max)
    }

    /// Highest rate the curve ever reaches, in iterations per second.
    pub fn max_rate_per_second(&self) -> f64 {
        self.max_rate() as f64 / self.time_unit.as_secs_f64()
    }

    /// Whether the curve never leaves zero.
    pub fn is_idle(&self) -> bool {
        self.max_rate() == 0
    }

    /// Analytic number of iterations the whole curve starts: the integral
    /// of the rate over every stage.
    pub fn expected_iterations(&self) -> f64 {
        let unit = self.time_unit.as_secs_f64();
        let mut from = self.start_rate as f64;
        let mut total = 0.0;
        for stage in &self.stages {
            let to = stage.target as f64;
            total += stage.duration.as_secs_f64() / unit * (from + to) / 2.0;
            from = to;
        }
        total
    }

    /// Instantaneous rate at `elapsed`, per time unit.
    ///
    /// Past the last stage the curve holds its final target.
    pub fn rate_at(&self, elapsed: Duration) -> f64 {
        let mut from = self.start_rate as f64;
        let mut stage_start = Duration::ZERO;
        for stage in &self.stages {
            let to = stage.target as f64;
            let stage_end = stage_start + stage.duration;
            if elapsed < stage_end {
                let progress = (elapsed - stage_start).as_secs_f64() / stage.duration.as_secs_f64();
                return from + (to - from) * progress;
            }
            from = to;
            stage_start = stage_end;
        }
        from
    }
}
