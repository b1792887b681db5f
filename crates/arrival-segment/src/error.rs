//! Segment error types.

use thiserror::Error;

/// Result type alias for segment operations.
pub type SegmentResult<T> = Result<T, SegmentError>;

/// Errors that can occur while parsing or combining execution segments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("invalid rational number: {0:?}")]
    InvalidNumber(String),

    #[error("value {0} is outside of the [0, 1] range")]
    OutOfRange(String),

    #[error("segment start {from} should be less than its end {to}")]
    EmptySegment { from: String, to: String },

    #[error("invalid execution segment sequence: {0}")]
    InvalidSequence(String),

    #[error("couldn't find segment {segment} in sequence {sequence}")]
    NotInSequence { segment: String, sequence: String },
}
