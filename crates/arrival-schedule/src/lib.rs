//! arrival-schedule — when does each iteration start?
//!
//! Turns a [`RateCurve`](arrival_core::RateCurve) and an
//! [`ExecutionTuple`](arrival_segment::ExecutionTuple) into the ordered
//! start offsets this instance owns, computed in closed form one stage at a
//! time. Nothing is materialized up front: [`Schedule`] is a plain iterator,
//! and [`spawn_producer`] runs it in a background task feeding a bounded
//! channel for the pacer.

pub mod generator;
pub mod producer;

pub use generator::{Entries, Schedule, ScheduledIteration};
pub use producer::{spawn_producer, wait_for_shutdown};
