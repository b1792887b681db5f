//! Arrival-rate config parser (TOML).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use arrival_segment::{ExecutionSegment, ExecutionSegmentSequence, ExecutionTuple, Rational};

use crate::curve::{RateCurve, Stage};
use crate::error::{ConfigError, ConfigResult};

/// A ramping arrival-rate test.
///
/// ```toml
/// name = "ramping"
/// time_unit = "1s"
/// start_rate = 10
/// pre_allocated_workers = 10
/// max_workers = 20
///
/// [[stages]]
/// duration = "1s"
/// target = 50
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalRateConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_time_unit", with = "humantime_serde")]
    pub time_unit: Duration,
    #[serde(default)]
    pub start_rate: u64,
    #[serde(default)]
    pub stages: Vec<Stage>,
    pub pre_allocated_workers: u64,
    /// Defaults to `pre_allocated_workers` when unset.
    pub max_workers: Option<u64>,
    /// Time in-flight iterations get after the last stage before their
    /// context is cancelled.
    #[serde(default = "default_graceful_stop", with = "humantime_serde")]
    pub graceful_stop: Duration,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// Which share of a split test this instance runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    pub segment: Option<ExecutionSegment>,
    pub sequence: Option<ExecutionSegmentSequence>,
}

fn default_name() -> String {
    "default".to_string()
}

fn default_time_unit() -> Duration {
    Duration::from_secs(1)
}

fn default_graceful_stop() -> Duration {
    Duration::from_secs(30)
}

impl ArrivalRateConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Effective worker cap (unscaled).
    pub fn max_workers(&self) -> u64 {
        self.max_workers.unwrap_or(self.pre_allocated_workers)
    }

    /// Check every field, collecting all problems rather than stopping at
    /// the first one.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();

        if self.name.is_empty()
            || !self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            errors.push(
                "the name should contain only numbers, latin letters, underscores, and dashes"
                    .to_string(),
            );
        }
        if self.stages.is_empty() {
            errors.push("at least one stage has to be specified".to_string());
        }
        if self.time_unit.is_zero() {
            errors.push("the timeUnit should be more than 0".to_string());
        }
        if self.max_workers() < self.pre_allocated_workers {
            errors.push("maxWorkers shouldn't be less than preAllocatedWorkers".to_string());
        }
        if self.max_workers() == 0 {
            errors.push("maxWorkers should be more than 0".to_string());
        }
        if let Err(e) = self.execution_tuple() {
            errors.push(e.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    pub fn rate_curve(&self) -> RateCurve {
        RateCurve::new(self.time_unit, self.start_rate, self.stages.clone())
    }

    /// Resolve the configured segment against the configured sequence.
    pub fn execution_tuple(&self) -> ConfigResult<ExecutionTuple> {
        Ok(ExecutionTuple::new(
            self.execution.segment,
            self.execution.sequence.as_ref(),
        )?)
    }

    /// Pre-allocated workers for this instance's share.
    pub fn pre_allocated_workers_for(&self, tuple: &ExecutionTuple) -> u64 {
        tuple.scale(self.pre_allocated_workers)
    }

    /// Worker cap for this instance's share.
    pub fn max_workers_for(&self, tuple: &ExecutionTuple) -> u64 {
        tuple.scale(self.max_workers())
    }

    /// One-line human summary, e.g.
    /// `Up to 50.00 iterations/s for 3s over 3 stages (maxWorkers: 10-20, gracefulStop: 30s)`.
    pub fn description(&self, tuple: &ExecutionTuple) -> String {
        let curve = self.rate_curve();

        let mut workers = format!("maxWorkers: {}", self.pre_allocated_workers_for(tuple));
        if self.max_workers() > self.pre_allocated_workers {
            workers.push_str(&format!("-{}", self.max_workers_for(tuple)));
        }

        let max_rate = curve.max_rate_per_second() * segment_share(tuple.segment());

        format!(
            "Up to {max_rate:.2} iterations/s for {} over {} stages ({workers}, gracefulStop: {})",
            humantime::format_duration(curve.total_duration()),
            self.stages.len(),
            humantime::format_duration(self.graceful_stop),
        )
    }

    /// Scaffold a small ramp-up-and-hold config.
    pub fn scaffold(name: &str) -> Self {
        ArrivalRateConfig {
            name: name.to_string(),
            time_unit: default_time_unit(),
            start_rate: 10,
            stages: vec![
                Stage::new(Duration::from_secs(30), 100),
                Stage::new(Duration::from_secs(60), 100),
                Stage::new(Duration::from_secs(10), 0),
            ],
            pre_allocated_workers: 20,
            max_workers: Some(100),
            graceful_stop: default_graceful_stop(),
            execution: ExecutionConfig::default(),
        }
    }
}

/// Share of `[0, 1)` owned by a segment, as a float.
pub fn segment_share(segment: &ExecutionSegment) -> f64 {
    let length: Rational = segment.length();
    *length.numer() as f64 / *length.denom() as f64
}
