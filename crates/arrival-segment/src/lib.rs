//! arrival-segment — horizontal partitioning of the iteration stream.
//!
//! A test split across N instances gives each instance an
//! [`ExecutionSegment`] of `[0, 1)` and a shared
//! [`ExecutionSegmentSequence`]. From those two, every instance derives the
//! same striping pattern and walks only the global iteration indices it
//! owns. Concatenating all instances' indices reproduces the full stream,
//! with nothing duplicated and nothing missed.
//!
//! # Architecture
//!
//! ```text
//! "0:1/3" + "0,1/3,2/3,1"
//!   ├── ExecutionSegment          (rational [from, to))
//!   ├── ExecutionSegmentSequence  (contiguous breakpoints, LCD)
//!   └── ExecutionTuple            (segment located in filled sequence)
//!         └── StripedOffsets      (start + repeating gaps)
//! ```

pub mod error;
pub mod ratio;
pub mod segment;
pub mod sequence;
pub mod striping;
pub mod tuple;

pub use error::{SegmentError, SegmentResult};
pub use ratio::{Rational, parse_rational};
pub use segment::ExecutionSegment;
pub use sequence::ExecutionSegmentSequence;
pub use striping::{StripedOffsets, stripe};
pub use tuple::ExecutionTuple;
