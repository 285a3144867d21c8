// Curvature offsets for parallel edges.
//
// Every directed (from, to) pair gets a symmetric fan of arc radii, one per
// parallel edge, so that repeated edges between the same two nodes stay
// distinguishable when drawn as arcs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{GeometryError, Result};

/// Spacing between neighbouring arcs of one fan.
pub const RAD_SCALE: f64 = 0.1;

/// A directed edge between two named nodes. Several edges may share a key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey<N> {
    pub from: N,
    pub to: N,
}

impl<N> EdgeKey<N> {
    pub fn new(from: N, to: N) -> Self {
        Self { from, to }
    }
}

impl<N> From<(N, N)> for EdgeKey<N> {
    fn from((from, to): (N, N)) -> Self {
        Self { from, to }
    }
}

/// Offsets for `n` parallel edges with the default spacing.
pub fn offsets_for_count(n: i64) -> Vec<f64> {
    offsets_for_count_scaled(n, RAD_SCALE)
}

/// Offsets for `n` parallel edges, ascending and symmetric about zero.
///
/// Even counts straddle zero (`±0.5·scale`, `±1.5·scale`, ...); odd counts
/// include a single straight edge at exactly zero.
pub fn offsets_for_count_scaled(n: i64, scale: f64) -> Vec<f64> {
    if n <= 0 {
        return Vec::new();
    }
    if n % 2 == 0 {
        let half = n / 2;
        (-half..half).map(|i| (i as f64 + 0.5) * scale).collect()
    } else {
        let half = (n - 1) / 2;
        (-half..=half).map(|i| i as f64 * scale).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct KeyOffsets {
    offsets: Vec<f64>,
    consumed: usize,
}

/// Generated offsets per edge key plus a cursor recording how many have been
/// handed out. Offsets are handed out from the end of each sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct CurvatureAssignment<N: Ord> {
    entries: BTreeMap<EdgeKey<N>, KeyOffsets>,
}

impl<N: Ord> Default for CurvatureAssignment<N> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

/// Count the multiplicity of every edge key and generate its offsets.
pub fn assign_curvatures<N, E, I>(edges: I) -> CurvatureAssignment<N>
where
    N: Ord,
    E: Into<EdgeKey<N>>,
    I: IntoIterator<Item = E>,
{
    assign_curvatures_scaled(edges, RAD_SCALE)
}

pub fn assign_curvatures_scaled<N, E, I>(edges: I, scale: f64) -> CurvatureAssignment<N>
where
    N: Ord,
    E: Into<EdgeKey<N>>,
    I: IntoIterator<Item = E>,
{
    let mut counts: BTreeMap<EdgeKey<N>, i64> = BTreeMap::new();
    for edge in edges {
        *counts.entry(edge.into()).or_insert(0) += 1;
    }
    let entries = counts
        .into_iter()
        .map(|(key, count)| {
            (
                key,
                KeyOffsets {
                    offsets: offsets_for_count_scaled(count, scale),
                    consumed: 0,
                },
            )
        })
        .collect();
    CurvatureAssignment { entries }
}

impl<N: Ord> CurvatureAssignment<N> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &EdgeKey<N>> {
        self.entries.keys()
    }

    /// Every generated offset for `key` in generation order, consumed or not.
    pub fn offsets(&self, key: &EdgeKey<N>) -> &[f64] {
        self.entries
            .get(key)
            .map(|entry| entry.offsets.as_slice())
            .unwrap_or(&[])
    }

    pub fn entries(&self) -> impl Iterator<Item = (&EdgeKey<N>, &[f64])> {
        self.entries
            .iter()
            .map(|(key, entry)| (key, entry.offsets.as_slice()))
    }

    pub fn remaining(&self, key: &EdgeKey<N>) -> usize {
        self.entries
            .get(key)
            .map(|entry| entry.offsets.len() - entry.consumed)
            .unwrap_or(0)
    }

    /// The offset the next `next_offset` call would return, without consuming it.
    pub fn peek(&self, key: &EdgeKey<N>) -> Option<f64> {
        let entry = self.entries.get(key)?;
        let left = entry.offsets.len() - entry.consumed;
        if left == 0 {
            return None;
        }
        Some(entry.offsets[left - 1])
    }

    /// True once every offset of every key has been handed out.
    pub fn is_exhausted(&self) -> bool {
        self.entries
            .values()
            .all(|entry| entry.consumed == entry.offsets.len())
    }

    pub fn reset(&mut self) {
        for entry in self.entries.values_mut() {
            entry.consumed = 0;
        }
    }
}

impl<N: Ord + fmt::Display> CurvatureAssignment<N> {
    /// Hand out the last unconsumed offset for `key`.
    ///
    /// Asking for more offsets than the key's multiplicity, or for a key that
    /// never appeared, is an `OutOfRange` error.
    pub fn next_offset(&mut self, key: &EdgeKey<N>) -> Result<f64> {
        let out_of_range = || GeometryError::OutOfRange {
            from: key.from.to_string(),
            to: key.to.to_string(),
        };
        let entry = self.entries.get_mut(key).ok_or_else(out_of_range)?;
        let left = entry.offsets.len() - entry.consumed;
        if left == 0 {
            return Err(out_of_range());
        }
        entry.consumed += 1;
        Ok(entry.offsets[left - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_offsets(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn even_count_straddles_zero() {
        assert_offsets(&offsets_for_count(4), &[-0.15, -0.05, 0.05, 0.15]);
        assert_offsets(&offsets_for_count(2), &[-0.05, 0.05]);
        assert!(offsets_for_count(6).iter().all(|v| *v != 0.0));
    }

    #[test]
    fn odd_count_contains_zero() {
        assert_offsets(&offsets_for_count(3), &[-0.1, 0.0, 0.1]);
        assert_eq!(offsets_for_count(1), vec![0.0]);
        assert_eq!(offsets_for_count(5)[2], 0.0);
    }

    #[test]
    fn non_positive_count_is_empty() {
        assert!(offsets_for_count(0).is_empty());
        assert!(offsets_for_count(-3).is_empty());
    }

    #[test]
    fn offsets_are_evenly_spaced() {
        for n in 2..12 {
            let offsets = offsets_for_count(n);
            for pair in offsets.windows(2) {
                assert!((pair[1] - pair[0] - RAD_SCALE).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn offsets_sum_to_zero() {
        for n in 0..40 {
            let sum: f64 = offsets_for_count(n).iter().sum();
            assert!(sum.abs() < 1e-9, "n={n} sum={sum}");
        }
    }

    #[test]
    fn multiplicity_drives_offset_count() {
        let assignment = assign_curvatures([
            ("ORD", "LAX"),
            ("ORD", "LAX"),
            ("LAX", "ORD"),
            ("ORD", "LAX"),
            ("JFK", "SFO"),
        ]);
        assert_eq!(assignment.len(), 3);
        assert_eq!(assignment.offsets(&EdgeKey::new("ORD", "LAX")).len(), 3);
        assert_eq!(assignment.offsets(&EdgeKey::new("LAX", "ORD")), &[0.0]);
        assert!(assignment.offsets(&EdgeKey::new("SFO", "JFK")).is_empty());
    }

    #[test]
    fn offsets_are_handed_out_last_first() {
        let key = EdgeKey::new("A", "B");
        let mut assignment = assign_curvatures(vec![key.clone(); 4]);
        assert_eq!(assignment.peek(&key), Some(assignment.offsets(&key)[3]));

        let mut handed_out = Vec::new();
        while assignment.remaining(&key) > 0 {
            handed_out.push(assignment.next_offset(&key).unwrap());
        }
        assert_offsets(&handed_out, &[0.15, 0.05, -0.05, -0.15]);
        assert!(assignment.is_exhausted());
        // Inspection stays possible after consumption.
        assert_eq!(assignment.offsets(&key).len(), 4);
    }

    #[test]
    fn over_consumption_is_out_of_range() {
        let key = EdgeKey::new("A".to_string(), "B".to_string());
        let mut assignment = assign_curvatures([key.clone()]);
        assert_eq!(assignment.next_offset(&key).unwrap(), 0.0);
        let err = assignment.next_offset(&key).unwrap_err();
        assert_eq!(
            err,
            GeometryError::OutOfRange {
                from: "A".to_string(),
                to: "B".to_string()
            }
        );

        let unknown = EdgeKey::new("B".to_string(), "A".to_string());
        assert!(matches!(
            assignment.next_offset(&unknown),
            Err(GeometryError::OutOfRange { .. })
        ));
    }

    #[test]
    fn reset_rewinds_every_cursor() {
        let key = EdgeKey::new(1, 2);
        let mut assignment = assign_curvatures([(1, 2), (1, 2)]);
        assignment.next_offset(&key).unwrap();
        assignment.next_offset(&key).unwrap();
        assert!(assignment.is_exhausted());
        assignment.reset();
        assert_eq!(assignment.remaining(&key), 2);
    }

    #[test]
    fn custom_scale() {
        let assignment = assign_curvatures_scaled([("a", "b"), ("a", "b")], 0.25);
        assert_offsets(assignment.offsets(&EdgeKey::new("a", "b")), &[-0.125, 0.125]);
    }
}
