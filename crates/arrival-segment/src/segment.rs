//! Execution segment — a rational slice `[from, to)` of the iteration space.

use std::fmt;
use std::str::FromStr;

use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{SegmentError, SegmentResult};
use crate::ratio::{Rational, check_unit, parse_rational};

/// A half-open interval `[from, to)` of the normalized iteration-index space.
///
/// An instance that owns a segment runs only the global iterations whose
/// normalized position falls inside it. The full segment `0:1` owns every
/// iteration and is the default when a test is not split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExecutionSegment {
    from: Rational,
    to: Rational,
}

impl ExecutionSegment {
    /// Create a segment, checking `0 <= from < to <= 1`.
    pub fn new(from: Rational, to: Rational) -> SegmentResult<Self> {
        let from = check_unit(from)?;
        let to = check_unit(to)?;
        if from >= to {
            return Err(SegmentError::EmptySegment {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Self { from, to })
    }

    /// The whole iteration space, `0:1`.
    pub fn full() -> Self {
        Self {
            from: Rational::zero(),
            to: Rational::one(),
        }
    }

    /// Inclusive lower bound.
    pub fn begin(&self) -> Rational {
        self.from
    }

    /// Exclusive upper bound.
    pub fn end(&self) -> Rational {
        self.to
    }

    /// Width of the segment (`to - from`).
    pub fn length(&self) -> Rational {
        self.to - self.from
    }

    /// Whether this segment covers the whole iteration space.
    pub fn is_full(&self) -> bool {
        self.from.is_zero() && self.to.is_one()
    }

    /// Split the segment into `parts` consecutive segments of equal width.
    pub fn split(&self, parts: i64) -> SegmentResult<Vec<Self>> {
        if parts <= 0 {
            return Err(SegmentError::InvalidSequence(format!(
                "cannot split {self} into {parts} parts"
            )));
        }
        let step = self.length() / Rational::from_integer(parts);
        (0..parts)
            .map(|i| {
                let from = self.from + step * Rational::from_integer(i);
                let to = if i == parts - 1 { self.to } else { from + step };
                Self::new(from, to)
            })
            .collect()
    }
}

impl Default for ExecutionSegment {
    fn default() -> Self {
        Self::full()
    }
}

impl FromStr for ExecutionSegment {
    type Err = SegmentError;

    /// Parses `from:to`, or a lone `to` meaning `0:to`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((from, to)) => Self::new(parse_rational(from)?, parse_rational(to)?),
            None => Self::new(Rational::zero(), parse_rational(s)?),
        }
    }
}

impl fmt::Display for ExecutionSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.from, self.to)
    }
}

impl TryFrom<String> for ExecutionSegment {
    type Error = SegmentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExecutionSegment> for String {
    fn from(segment: ExecutionSegment) -> Self {
        segment.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ranges() {
        let seg: ExecutionSegment = "1/3:2/3".parse().unwrap();
        assert_eq!(seg.begin(), Rational::new(1, 3));
        assert_eq!(seg.end(), Rational::new(2, 3));
        assert_eq!(seg.length(), Rational::new(1, 3));
        assert_eq!(seg.to_string(), "1/3:2/3");
    }

    #[test]
    fn lone_value_starts_at_zero() {
        let seg: ExecutionSegment = "50%".parse().unwrap();
        assert_eq!(seg.to_string(), "0:1/2");
    }

    #[test]
    fn rejects_empty_and_reversed() {
        assert!(matches!(
            "1/2:1/2".parse::<ExecutionSegment>(),
            Err(SegmentError::EmptySegment { .. })
        ));
        assert!("2/3:1/3".parse::<ExecutionSegment>().is_err());
        assert!(matches!(
            "0:3/2".parse::<ExecutionSegment>(),
            Err(SegmentError::OutOfRange(_))
        ));
    }

    #[test]
    fn full_segment_is_default() {
        let seg = ExecutionSegment::default();
        assert!(seg.is_full());
        assert_eq!(seg.to_string(), "0:1");
        assert!(!"0:1/2".parse::<ExecutionSegment>().unwrap().is_full());
    }

    #[test]
    fn split_covers_the_segment() {
        let seg: ExecutionSegment = "1/4:1".parse().unwrap();
        let parts = seg.split(3).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].begin(), seg.begin());
        assert_eq!(parts[2].end(), seg.end());
        for pair in parts.windows(2) {
            assert_eq!(pair[0].end(), pair[1].begin());
            assert_eq!(pair[0].length(), Rational::new(1, 4));
        }
        assert!(seg.split(0).is_err());
    }

    #[test]
    fn serde_uses_text_form() {
        let seg: ExecutionSegment = "0:1/3".parse().unwrap();
        let json = serde_json::to_string(&seg).unwrap();
        assert_eq!(json, "\"0:1/3\"");
        let back: ExecutionSegment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seg);
        assert!(serde_json::from_str::<ExecutionSegment>("\"1:0\"").is_err());
    }
}
