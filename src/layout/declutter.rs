// Label decluttering by random pairwise repulsion.
//
// Labels closer than the threshold are nudged apart with small random
// steps until no conflicting pair is left. The first label of a pair moves
// up and right, the second down and left, and each label moves at most once
// per round.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::{LabelSet, Point2D};
use crate::error::{GeometryError, Result};

pub const DEFAULT_THRESHOLD: f64 = 0.7;
pub const DEFAULT_JITTER: f64 = 0.1;
pub const DEFAULT_MAX_ROUNDS: usize = 10_000;

/// What to do when the round guard runs out with conflicts remaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OnExhausted {
    #[default]
    Fail,
    BestEffort,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Declutter {
    /// Minimum allowed distance between two labels.
    pub threshold: f64,
    /// Upper bound of the uniform step applied per axis.
    pub jitter: f64,
    /// `None` keeps iterating until the labels settle, however long that takes.
    pub max_rounds: Option<usize>,
    pub on_exhausted: OnExhausted,
}

impl Default for Declutter {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            jitter: DEFAULT_JITTER,
            max_rounds: Some(DEFAULT_MAX_ROUNDS),
            on_exhausted: OnExhausted::Fail,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclutterOutcome<K> {
    pub positions: LabelSet<K>,
    pub rounds: usize,
    /// Conflicting pairs left over; non-zero only for best-effort results.
    pub remaining_conflicts: usize,
}

/// Declutter `positions` with the default jitter and round guard.
pub fn declutter<K, R>(positions: &LabelSet<K>, threshold: f64, rng: &mut R) -> Result<LabelSet<K>>
where
    K: Ord + Clone,
    R: Rng + ?Sized,
{
    let declutter = Declutter {
        threshold,
        ..Declutter::default()
    };
    declutter.run(positions, rng).map(|outcome| outcome.positions)
}

/// Pairs `(k0, k1)` with `k0 < k1` closer than `threshold`, in key order.
pub fn conflicts<K: Ord + Clone>(positions: &LabelSet<K>, threshold: f64) -> Vec<(K, K)> {
    let entries: Vec<(&K, Point2D)> = positions.iter().map(|(k, p)| (k, *p)).collect();
    let points: Vec<Point2D> = entries.iter().map(|(_, p)| *p).collect();
    conflict_pairs(&points, threshold)
        .into_iter()
        .map(|(a, b)| (entries[a].0.clone(), entries[b].0.clone()))
        .collect()
}

fn conflict_pairs(points: &[Point2D], threshold: f64) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, a) in points.iter().enumerate() {
        for (j, b) in points.iter().enumerate().skip(i + 1) {
            if a.distance(*b) < threshold {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

impl Declutter {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(GeometryError::InvalidArgument(format!(
                "declutter threshold must be finite, got {}",
                self.threshold
            )));
        }
        if !(self.jitter.is_finite() && self.jitter > 0.0) {
            return Err(GeometryError::InvalidArgument(format!(
                "declutter jitter must be positive, got {}",
                self.jitter
            )));
        }
        Ok(())
    }

    /// Run the repulsion loop on a copy of `positions`.
    ///
    /// The identifier set is preserved; only coordinates change. Results are
    /// reproducible for a seeded `rng`.
    pub fn run<K, R>(&self, positions: &LabelSet<K>, rng: &mut R) -> Result<DeclutterOutcome<K>>
    where
        K: Ord + Clone,
        R: Rng + ?Sized,
    {
        self.validate()?;
        let keys: Vec<K> = positions.keys().cloned().collect();
        let mut points: Vec<Point2D> = positions.values().copied().collect();

        let mut rounds = 0usize;
        let mut pairs = conflict_pairs(&points, self.threshold);
        while !pairs.is_empty() {
            if let Some(max_rounds) = self.max_rounds {
                if rounds >= max_rounds {
                    warn!(
                        rounds,
                        conflicts = pairs.len(),
                        threshold = self.threshold,
                        "label declutter did not settle"
                    );
                    match self.on_exhausted {
                        OnExhausted::Fail => {
                            return Err(GeometryError::Convergence {
                                rounds,
                                conflicts: pairs.len(),
                                threshold: self.threshold,
                            });
                        }
                        OnExhausted::BestEffort => break,
                    }
                }
            }
            trace!(round = rounds, conflicts = pairs.len(), "declutter round");

            let mut modified = vec![false; points.len()];
            for &(first, second) in &pairs {
                if !modified[first] {
                    let point = &mut points[first];
                    point.x += rng.gen_range(0.0..self.jitter);
                    point.y += rng.gen_range(0.0..self.jitter);
                    modified[first] = true;
                }
                if !modified[second] {
                    let point = &mut points[second];
                    point.x -= rng.gen_range(0.0..self.jitter);
                    point.y -= rng.gen_range(0.0..self.jitter);
                    modified[second] = true;
                }
            }
            rounds += 1;
            pairs = conflict_pairs(&points, self.threshold);
        }

        debug!(
            labels = keys.len(),
            rounds,
            remaining = pairs.len(),
            "label declutter finished"
        );
        Ok(DeclutterOutcome {
            positions: keys.into_iter().zip(points).collect(),
            rounds,
            remaining_conflicts: pairs.len(),
        })
    }
}
