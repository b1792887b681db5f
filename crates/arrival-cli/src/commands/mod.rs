pub mod init;
pub mod plan;
pub mod run;

use std::path::Path;

use arrival_core::ArrivalRateConfig;
use arrival_segment::{ExecutionSegment, ExecutionSegmentSequence};

/// Load a config, apply command-line segment overrides and validate it.
pub fn load(
    path: &Path,
    segment: Option<ExecutionSegment>,
    sequence: Option<ExecutionSegmentSequence>,
) -> anyhow::Result<ArrivalRateConfig> {
    let mut config = ArrivalRateConfig::from_file(path)?;
    if segment.is_some() {
        config.execution.segment = segment;
    }
    if sequence.is_some() {
        config.execution.sequence = sequence;
    }
    config.validate()?;
    Ok(config)
}
