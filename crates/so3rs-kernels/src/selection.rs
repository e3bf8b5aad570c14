//! Selection rules at the index level
//!
//! Two degrees `l1`, `l2` couple to `l` only when `|l1 - l2| <= l <= l1 + l2`.
//! At the index level the rule becomes a clipped band: for each `m1` the
//! admissible `m2` are exactly those with `|m2| <= l2` and `|m1 + m2| <= l`.
//! Every kernel in this crate iterates through [`band`] so that no
//! coefficient outside the table is ever read.

use std::cmp::{max, min};
use std::ops::RangeInclusive;

/// Triangle rule `|l1 - l2| <= l <= l1 + l2`
///
/// # Examples
///
/// ```
/// use so3rs_kernels::triangle_ok;
///
/// assert!(triangle_ok(1, 2, 1));
/// assert!(triangle_ok(1, 2, 3));
/// assert!(!triangle_ok(1, 2, 4));
/// assert!(!triangle_ok(3, 1, 1));
/// ```
#[inline]
pub fn triangle_ok(l1: usize, l2: usize, l: usize) -> bool {
    l1.abs_diff(l2) <= l && l <= l1 + l2
}

/// Admissible `m2` for a given `m1`: `max(-l2, -l-m1) ..= min(l2, l-m1)`
///
/// The range is empty when no `m2` qualifies.
#[inline]
pub fn band(l1: usize, l2: usize, l: usize, m1: isize) -> RangeInclusive<isize> {
    debug_assert!(m1.unsigned_abs() <= l1);
    let (l2, l) = (l2 as isize, l as isize);
    max(-l2, -l - m1)..=min(l2, l - m1)
}

/// All admissible `(m1, m2)` pairs, `m1` ascending then `m2` ascending
pub fn band_pairs(l1: usize, l2: usize, l: usize) -> impl Iterator<Item = (isize, isize)> {
    let l1i = l1 as isize;
    (-l1i..=l1i).flat_map(move |m1| band(l1, l2, l, m1).map(move |m2| (m1, m2)))
}

/// Number of `(m1, m2)` pairs contributing to output index `m`
///
/// Closed form: `m1` runs over `[max(-l1, m-l2), min(l1, m+l2)]`.
pub fn pair_count(l1: usize, l2: usize, m: isize) -> usize {
    let (l1, l2) = (l1 as isize, l2 as isize);
    let lo = max(-l1, m - l2);
    let hi = min(l1, m + l2);
    if hi < lo {
        0
    } else {
        (hi - lo + 1) as usize
    }
}

/// Admissible output degrees for `l1 ⊗ l2`, capped at `maxl`
pub fn coupled_degrees(l1: usize, l2: usize, maxl: usize) -> RangeInclusive<usize> {
    l1.abs_diff(l2)..=min(l1 + l2, maxl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_triangle_boundaries() {
        for l1 in 0..5 {
            for l2 in 0..5 {
                assert!(triangle_ok(l1, l2, l1.abs_diff(l2)));
                assert!(triangle_ok(l1, l2, l1 + l2));
                assert!(!triangle_ok(l1, l2, l1 + l2 + 1));
                if l1 != l2 {
                    assert!(!triangle_ok(l1, l2, l1.abs_diff(l2) - 1));
                }
            }
        }
    }

    #[test]
    fn test_band_stays_in_table() {
        for l1 in 0..4usize {
            for l2 in 0..4usize {
                for l in l1.abs_diff(l2)..=l1 + l2 {
                    for (m1, m2) in band_pairs(l1, l2, l) {
                        assert!(m1.unsigned_abs() <= l1);
                        assert!(m2.unsigned_abs() <= l2);
                        assert!((m1 + m2).unsigned_abs() <= l);
                    }
                }
            }
        }
    }

    #[test]
    fn test_pair_counts_match_closed_form() {
        for l1 in 0..4usize {
            for l2 in 0..4usize {
                for l in l1.abs_diff(l2)..=l1 + l2 {
                    let mut counts: HashMap<isize, usize> = HashMap::new();
                    for (m1, m2) in band_pairs(l1, l2, l) {
                        *counts.entry(m1 + m2).or_default() += 1;
                    }
                    let li = l as isize;
                    for m in -li..=li {
                        assert_eq!(
                            counts.get(&m).copied().unwrap_or(0),
                            pair_count(l1, l2, m),
                            "l1={} l2={} l={} m={}",
                            l1,
                            l2,
                            l,
                            m
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_band_example() {
        // l1 = 2, l2 = 1, l = 1, m1 = 2: m2 must satisfy m1 + m2 <= 1
        assert_eq!(band(2, 1, 1, 2), -1..=-1);
        // m1 = -2: m2 >= 1
        assert_eq!(band(2, 1, 1, -2), 1..=1);
        assert_eq!(band(2, 1, 1, 0), -1..=1);
    }

    #[test]
    fn test_coupled_degrees() {
        assert_eq!(coupled_degrees(2, 3, 10), 1..=5);
        assert_eq!(coupled_degrees(2, 3, 4), 1..=4);
        assert!(coupled_degrees(3, 0, 2).is_empty());
    }
}
