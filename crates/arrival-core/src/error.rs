//! Configuration error types.

use thiserror::Error;

use arrival_segment::SegmentError;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating an arrival-rate config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("execution segment error: {0}")]
    Segment(#[from] SegmentError),

    #[error("invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
