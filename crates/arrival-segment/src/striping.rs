//! Striping — spreading global iterations fairly across a sequence.
//!
//! For a sequence whose lengths normalize to `n_i / lcd`, every block of
//! `lcd` consecutive global indices gives exactly `n_i` of them to segment
//! `i`. Segments are served largest-first and each takes index `g` as soon
//! as `chosen * lcd / n_i <= g`, which keeps a segment's indices as far
//! apart as the ratio allows. The result per segment is a start index and a
//! repeating list of gaps, so an instance can walk its own indices without
//! ever looking at anyone else's.

use crate::sequence::ExecutionSegmentSequence;

/// The owned indices of one segment: `start`, then `start + gaps[0]`,
/// `start + gaps[0] + gaps[1]`, … cycling through `gaps` forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripedOffsets {
    /// First owned global index (0-based).
    pub start: u64,
    /// Gaps between consecutive owned indices; sums to `lcd`.
    pub gaps: Vec<u64>,
    /// Length of one striping period.
    pub lcd: u64,
}

impl StripedOffsets {
    /// The unsegmented pattern: every index is owned.
    pub fn unsegmented() -> Self {
        Self {
            start: 0,
            gaps: vec![1],
            lcd: 1,
        }
    }

    /// Endless iterator over the owned global indices, in increasing order.
    pub fn indices(&self) -> impl Iterator<Item = u64> + '_ {
        let mut next = self.start;
        self.gaps.iter().cycle().map(move |gap| {
            let current = next;
            next += gap;
            current
        })
    }

    /// Number of owned indices strictly below `value`.
    pub fn count_below(&self, value: u64) -> u64 {
        let per_period = self.gaps.len() as u64;
        let mut result = (value / self.lcd) * per_period;
        let remainder = value % self.lcd;
        let mut index = self.start;
        for gap in &self.gaps {
            if index >= remainder {
                break;
            }
            result += 1;
            index += gap;
        }
        result
    }
}

/// Compute the striped offsets of every segment in `sequence`.
///
/// The returned vector is indexed like `sequence.segments()`.
pub fn stripe(sequence: &ExecutionSegmentSequence) -> Vec<StripedOffsets> {
    let lcd = sequence.lcd();
    let count = sequence.len();

    let numerators: Vec<i64> = sequence
        .segments()
        .iter()
        .map(|segment| {
            let length = segment.length();
            length.numer() * (lcd / length.denom())
        })
        .collect();

    // Largest share first; ties keep sequence order.
    let mut order: Vec<usize> = (0..count).collect();
    order.sort_by(|&a, &b| numerators[b].cmp(&numerators[a]));

    let mut owned: Vec<Vec<i64>> = numerators
        .iter()
        .map(|&n| Vec::with_capacity(n as usize + 1))
        .collect();
    let mut previous = vec![0i64; count];
    let mut chosen = vec![0i128; count];

    for index in 0..lcd {
        for (slot, &segment) in order.iter().enumerate() {
            let num = chosen[slot] * i128::from(lcd);
            let denom = i128::from(numerators[segment]);
            let threshold = num / denom;
            let global = i128::from(index);
            if global > threshold || (global == threshold && num % denom == 0) {
                chosen[slot] += 1;
                let offsets = &mut owned[segment];
                offsets.push(index - previous[segment]);
                previous[segment] = index;
                if offsets.len() as i64 == numerators[segment] {
                    // Wrap-around gap back to the start of the next period.
                    let wrap = offsets[0] + lcd - index;
                    offsets.push(wrap);
                }
                break;
            }
        }
    }

    owned
        .into_iter()
        .map(|offsets| StripedOffsets {
            start: offsets[0] as u64,
            gaps: offsets[1..].iter().map(|&g| g as u64).collect(),
            lcd: lcd as u64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stripes(seq: &str) -> Vec<StripedOffsets> {
        stripe(&seq.parse().unwrap())
    }

    #[test]
    fn full_sequence_owns_everything() {
        let all = stripe(&ExecutionSegmentSequence::full());
        assert_eq!(all, vec![StripedOffsets::unsegmented()]);
    }

    #[test]
    fn thirds_take_turns() {
        let all = stripes("0,1/3,2/3,1");
        assert_eq!((all[0].start, all[0].gaps.clone()), (0, vec![3]));
        assert_eq!((all[1].start, all[1].gaps.clone()), (1, vec![3]));
        assert_eq!((all[2].start, all[2].gaps.clone()), (2, vec![3]));
    }

    #[test]
    fn larger_share_is_served_first() {
        let all = stripes("0,1/3,1");
        // 2/3 takes 0 and 2, 1/3 takes 1.
        assert_eq!((all[0].start, all[0].gaps.clone()), (1, vec![3]));
        assert_eq!((all[1].start, all[1].gaps.clone()), (0, vec![2, 1]));
    }

    #[test]
    fn uneven_shares() {
        let all = stripes("0,1/4,3/5,1");
        assert_eq!(all[0].start, 2);
        assert_eq!(all[0].gaps, vec![5, 4, 3, 3, 5]);
        assert_eq!(all[1].start, 1);
        assert_eq!(all[1].gaps, vec![3, 2, 3, 3, 4, 3, 2]);
        assert_eq!(all[2].start, 0);
        assert_eq!(all[2].gaps, vec![3, 2, 3, 2, 3, 2, 3, 2]);
        for s in &all {
            assert_eq!(s.gaps.iter().sum::<u64>(), 20);
        }
    }

    #[test]
    fn indices_walk_the_gaps() {
        let all = stripes("0,1/3,1");
        let first: Vec<u64> = all[1].indices().take(5).collect();
        assert_eq!(first, vec![0, 2, 3, 5, 6]);
    }

    #[test]
    fn count_below_matches_enumeration() {
        for s in stripes("0,1/4,3/5,1") {
            for value in 0..65 {
                let expected = s.indices().take_while(|&i| i < value).count() as u64;
                assert_eq!(s.count_below(value), expected, "value {value}");
            }
        }
    }
}
