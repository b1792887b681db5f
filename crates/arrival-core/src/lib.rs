//! arrival-core — shared types for arrival-rate scheduling.
//!
//! Holds the rate curve data model and the config surface that produces
//! it. Everything here is plain, immutable data: a config is loaded and
//! validated once, then turned into a [`RateCurve`] and an
//! [`ExecutionTuple`](arrival_segment::ExecutionTuple) before a run starts.

pub mod config;
pub mod curve;
pub mod error;

pub use config::{ArrivalRateConfig, ExecutionConfig};
pub use curve::{RateCurve, Stage};
pub use error::{ConfigError, ConfigResult};
