//! Partition invariants.
//!
//! For any sequence, the striped indices of all its segments must cover the
//! global index stream exactly once.

use std::collections::BTreeSet;

use arrival_segment::*;

const SEQUENCES: &[&str] = &[
    "0,1",
    "0,1/2,1",
    "0,1/3,1",
    "0,1/3,2/3,1",
    "0,1/4,3/5,1",
    "0,1/10,3/10,6/10,1",
    "0,0.125,50%,7/8,1",
];

fn tuples(sequence: &str) -> Vec<ExecutionTuple> {
    let seq: ExecutionSegmentSequence = sequence.parse().unwrap();
    seq.segments()
        .iter()
        .map(|segment| ExecutionTuple::new(Some(*segment), Some(&seq)).unwrap())
        .collect()
}

#[test]
fn striped_indices_partition_the_stream() {
    for sequence in SEQUENCES {
        let limit = 500u64;
        let mut seen = BTreeSet::new();
        for et in tuples(sequence) {
            for index in et.striped_offsets().indices().take_while(|&i| i < limit) {
                assert!(
                    seen.insert(index),
                    "index {index} claimed twice in {sequence}"
                );
            }
        }
        let expected: BTreeSet<u64> = (0..limit).collect();
        assert_eq!(seen, expected, "gaps left in {sequence}");
    }
}

#[test]
fn indices_are_strictly_increasing() {
    for sequence in SEQUENCES {
        for et in tuples(sequence) {
            let indices: Vec<u64> = et.striped_offsets().indices().take(200).collect();
            assert!(indices.windows(2).all(|w| w[0] < w[1]), "{et}");
        }
    }
}

#[test]
fn shares_are_proportional_per_period() {
    for sequence in SEQUENCES {
        for et in tuples(sequence) {
            let offsets = et.striped_offsets();
            let expected = et.segment().length() * Rational::from_integer(offsets.lcd as i64);
            assert_eq!(offsets.gaps.len() as i64, expected.to_integer(), "{et}");
            assert_eq!(offsets.gaps.iter().sum::<u64>(), offsets.lcd, "{et}");
        }
    }
}

#[test]
fn scaled_values_add_up() {
    for sequence in SEQUENCES {
        let all = tuples(sequence);
        for value in [0u64, 1, 2, 3, 7, 10, 20, 33, 100, 1001] {
            let total: u64 = all.iter().map(|et| et.scale(value)).sum();
            assert_eq!(total, value, "{sequence} scaling {value}");
        }
    }
}

#[test]
fn striping_is_deterministic() {
    for sequence in SEQUENCES {
        assert_eq!(tuples(sequence), tuples(sequence));
    }
}
