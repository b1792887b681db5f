//! Execution segment sequences — the shared partition every instance agrees on.

use std::fmt;
use std::str::FromStr;

use num_integer::Integer;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{SegmentError, SegmentResult};
use crate::ratio::{Rational, parse_rational};
use crate::segment::ExecutionSegment;

/// Consecutive segments partitioning (part of) `[0, 1)`.
///
/// Written as breakpoints, e.g. `0,1/3,2/3,1`. Every instance of a split
/// test receives the same sequence so that they all derive the same
/// striping pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExecutionSegmentSequence {
    segments: Vec<ExecutionSegment>,
}

impl ExecutionSegmentSequence {
    /// Build a sequence from contiguous segments.
    pub fn new(segments: Vec<ExecutionSegment>) -> SegmentResult<Self> {
        if segments.is_empty() {
            return Err(SegmentError::InvalidSequence(
                "sequence must contain at least one segment".to_string(),
            ));
        }
        for pair in segments.windows(2) {
            if pair[0].end() != pair[1].begin() {
                return Err(SegmentError::InvalidSequence(format!(
                    "segment {} is not followed by a segment starting at {}",
                    pair[0],
                    pair[0].end()
                )));
            }
        }
        Ok(Self { segments })
    }

    /// Build a sequence from strictly increasing breakpoints.
    pub fn from_breakpoints(points: &[Rational]) -> SegmentResult<Self> {
        if points.len() < 2 {
            return Err(SegmentError::InvalidSequence(
                "at least two breakpoints are required".to_string(),
            ));
        }
        let segments = points
            .windows(2)
            .map(|pair| ExecutionSegment::new(pair[0], pair[1]))
            .collect::<SegmentResult<Vec<_>>>()?;
        Self::new(segments)
    }

    /// `parts` equal segments covering `[0, 1)`.
    pub fn even(parts: i64) -> SegmentResult<Self> {
        Self::new(ExecutionSegment::full().split(parts)?)
    }

    /// Complete a partial description into a full `[0, 1)` sequence.
    ///
    /// With no sequence, the `fallback` segment is padded with the missing
    /// pieces on either side; with neither, the result is the single full
    /// segment.
    pub fn filled(sequence: Option<&Self>, fallback: Option<&ExecutionSegment>) -> Self {
        let mut segments = match (sequence, fallback) {
            (Some(seq), _) => seq.segments.clone(),
            (None, Some(segment)) if !segment.is_full() => vec![*segment],
            (None, _) => return Self::full(),
        };

        let first = segments[0].begin();
        if !first.is_zero()
            && let Ok(head) = ExecutionSegment::new(Rational::zero(), first)
        {
            segments.insert(0, head);
        }

        let last = segments[segments.len() - 1].end();
        if !last.is_one()
            && let Ok(tail) = ExecutionSegment::new(last, Rational::one())
        {
            segments.push(tail);
        }

        Self { segments }
    }

    /// The trivial sequence holding only `0:1`.
    pub fn full() -> Self {
        Self {
            segments: vec![ExecutionSegment::full()],
        }
    }

    pub fn segments(&self) -> &[ExecutionSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the sequence spans exactly `[0, 1)`.
    pub fn is_full(&self) -> bool {
        self.segments[0].begin().is_zero() && self.segments[self.segments.len() - 1].end().is_one()
    }

    /// Least common denominator of all segment lengths.
    pub fn lcd(&self) -> i64 {
        self.segments
            .iter()
            .fold(1i64, |acc, segment| acc.lcm(segment.length().denom()))
    }

    /// Index of `segment` within the sequence.
    pub fn position(&self, segment: &ExecutionSegment) -> SegmentResult<usize> {
        self.segments
            .iter()
            .position(|s| s == segment)
            .ok_or_else(|| SegmentError::NotInSequence {
                segment: segment.to_string(),
                sequence: self.to_string(),
            })
    }
}

impl FromStr for ExecutionSegmentSequence {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let points = s
            .split(',')
            .map(parse_rational)
            .collect::<SegmentResult<Vec<_>>>()?;
        Self::from_breakpoints(&points)
    }
}

impl fmt::Display for ExecutionSegmentSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments[0].begin())?;
        for segment in &self.segments {
            write!(f, ",{}", segment.end())?;
        }
        Ok(())
    }
}

impl TryFrom<String> for ExecutionSegmentSequence {
    type Error = SegmentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExecutionSegmentSequence> for String {
    fn from(sequence: ExecutionSegmentSequence) -> Self {
        sequence.to_string()
    }
}
