//! Execution tuple — one instance's segment resolved against the sequence.

use std::fmt;

use crate::error::SegmentResult;
use crate::segment::ExecutionSegment;
use crate::sequence::ExecutionSegmentSequence;
use crate::striping::{StripedOffsets, stripe};

/// The segment this instance runs, located inside a full sequence, with
/// its striping pattern precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionTuple {
    segment: ExecutionSegment,
    sequence: ExecutionSegmentSequence,
    index: usize,
    offsets: StripedOffsets,
}

impl ExecutionTuple {
    /// Resolve `segment` (default `0:1`) against `sequence`.
    ///
    /// Missing pieces of the sequence are filled in, so passing only a
    /// segment is enough for standalone use. Fails if the segment is not one
    /// of the sequence's segments.
    pub fn new(
        segment: Option<ExecutionSegment>,
        sequence: Option<&ExecutionSegmentSequence>,
    ) -> SegmentResult<Self> {
        let segment = segment.unwrap_or_default();
        let sequence = ExecutionSegmentSequence::filled(sequence, Some(&segment));
        let index = sequence.position(&segment)?;
        let offsets = stripe(&sequence).swap_remove(index);
        Ok(Self {
            segment,
            sequence,
            index,
            offsets,
        })
    }

    /// The tuple of an unsplit test.
    pub fn unsegmented() -> Self {
        Self {
            segment: ExecutionSegment::full(),
            sequence: ExecutionSegmentSequence::full(),
            index: 0,
            offsets: StripedOffsets::unsegmented(),
        }
    }

    pub fn segment(&self) -> &ExecutionSegment {
        &self.segment
    }

    pub fn sequence(&self) -> &ExecutionSegmentSequence {
        &self.sequence
    }

    /// Position of the segment within the sequence.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Start index and repeating gaps of the global iterations this
    /// instance owns.
    pub fn striped_offsets(&self) -> &StripedOffsets {
        &self.offsets
    }

    /// This instance's share of an integer quantity (e.g. a worker count).
    ///
    /// Shares of all segments of the sequence add up to `value` exactly.
    pub fn scale(&self, value: u64) -> u64 {
        if self.sequence.len() == 1 {
            return value;
        }
        self.offsets.count_below(value)
    }
}

impl Default for ExecutionTuple {
    fn default() -> Self {
        Self::unsegmented()
    }
}

impl fmt::Display for ExecutionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.segment, self.sequence)
    }
}
