//! Least-squares reconstruction of heavy-hitter counts
//!
//! A Count-Min table is a linear measurement of the stream: the flat
//! observation vector y equals the design matrix of item→cell incidences
//! times the vector of true counts. Restricting the unknowns to the
//! tracked heavy hitters gives an overdetermined system whose
//! least-squares solution removes much of the collision bias the min
//! estimator keeps. The design matrix follows directly from the
//! hash-pair indexing `(A + r·B) mod P`, so this estimator is defined
//! over that scheme only — the type makes any other composition
//! unrepresentable.
//!
//! Queries solve the normal equations over the tracked items (at most
//! N×N, with the Gram entries counting shared cells). A singular system
//! falls back to the classical min estimate.

use crate::common::Result;
use crate::frequency::{FrequencySketch, SketchCore};
use crate::hashing::{HashPair, IndexScheme};
use crate::params::SketchConfig;
use crate::tables::{MatrixTable, SketchTable};
use crate::topn::TopNTracker;
use std::hash::Hash;

/// Pivot magnitude below which the normal equations count as singular
const PIVOT_TOLERANCE: f64 = 1e-9;

/// Count-Min sketch whose heavy-hitter estimates come from a
/// least-squares solve over the tracked items
///
/// Inserts behave exactly like [`HashPairCMSketch`]; `get` and `top`
/// re-estimate tracked items by reconstruction and fall back to the min
/// estimate for untracked items or a singular system.
///
/// [`HashPairCMSketch`]: crate::HashPairCMSketch
///
/// # Examples
/// ```
/// use minsketch::{FrequencySketch, LeastSquaresSketch};
///
/// let mut sketch: LeastSquaresSketch<&str> = LeastSquaresSketch::new(0.01, 0.01).unwrap();
/// sketch.insert(&"apple", 40);
/// sketch.insert(&"pear", 10);
/// assert_eq!(sketch.top()[0].0, "apple");
/// ```
#[derive(Clone, Debug)]
pub struct LeastSquaresSketch<I, B = MatrixTable> {
    core: SketchCore<B, HashPair>,
    tracker: TopNTracker<I>,
}

impl<I: Hash + Eq + Clone, B: SketchTable> LeastSquaresSketch<I, B> {
    /// Creates a sketch from an error bound and a failure probability
    ///
    /// # Errors
    /// Returns `InvalidParameter` if either probability is outside (0, 1).
    pub fn new(epsilon: f64, delta: f64) -> Result<Self> {
        Self::with_config(SketchConfig::from_error_bounds(epsilon, delta))
    }

    /// Creates a sketch from a full configuration
    ///
    /// # Errors
    /// Returns `InvalidParameter` if the configuration fails validation.
    pub fn with_config(config: SketchConfig) -> Result<Self> {
        let resolved = config.resolve()?;
        let scheme = match resolved.seed {
            Some(seed) => {
                HashPair::with_seed(resolved.params.depth(), resolved.params.width(), seed)
            }
            None => HashPair::new(resolved.params.depth(), resolved.params.width()),
        };
        Ok(LeastSquaresSketch {
            core: SketchCore::new(resolved.params, scheme, resolved.update, resolved.lossy),
            tracker: TopNTracker::new(resolved.top_n),
        })
    }

    /// Total inserted weight
    pub fn total_count(&self) -> u64 {
        self.core.total_count
    }

    /// Resets counters, tracker, and decay state
    pub fn clear(&mut self) {
        self.core.clear();
        self.tracker.clear();
    }

    /// Re-estimates every tracked item by least squares
    ///
    /// Returns `None` when the normal equations are singular, e.g. two
    /// tracked items hashing to identical paths.
    fn solve_tracked(&self) -> Option<Vec<(I, u64)>> {
        let snapshot = self.tracker.snapshot();
        let m = snapshot.len();
        if m == 0 {
            return Some(Vec::new());
        }

        let paths: Vec<Vec<usize>> = snapshot
            .iter()
            .map(|(item, _, _)| self.core.scheme.indices(item))
            .collect();

        // Gram entry (i, j) counts the cells the two paths share; rows
        // never collide across offsets, so it is a per-row comparison.
        let mut gram = vec![vec![0.0f64; m]; m];
        for i in 0..m {
            for j in i..m {
                let overlap = paths[i]
                    .iter()
                    .zip(&paths[j])
                    .filter(|(a, b)| a == b)
                    .count() as f64;
                gram[i][j] = overlap;
                gram[j][i] = overlap;
            }
        }

        let mut rhs = vec![0.0f64; m];
        for (j, path) in paths.iter().enumerate() {
            rhs[j] = path
                .iter()
                .enumerate()
                .map(|(row, &col)| self.core.table.get(row, col) as f64)
                .sum();
        }

        let solution = solve_normal_equations(gram, rhs)?;

        let mut ranked: Vec<(I, u64, u64)> = snapshot
            .into_iter()
            .zip(solution)
            .map(|((item, _, seq), x)| (item, x.round().max(0.0) as u64, seq))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        Some(ranked.into_iter().map(|(item, est, _)| (item, est)).collect())
    }
}

/// Solves the symmetric system `gram · x = rhs` by Gaussian elimination
/// with partial pivoting
fn solve_normal_equations(mut gram: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Option<Vec<f64>> {
    let n = rhs.len();

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&a, &b| {
            gram[a][col]
                .abs()
                .partial_cmp(&gram[b][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if gram[pivot_row][col].abs() < PIVOT_TOLERANCE {
            return None;
        }
        gram.swap(col, pivot_row);
        rhs.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = gram[row][col] / gram[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                gram[row][k] -= factor * gram[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = vec![0.0f64; n];
    for col in (0..n).rev() {
        let mut value = rhs[col];
        for k in col + 1..n {
            value -= gram[col][k] * solution[k];
        }
        solution[col] = value / gram[col][col];
    }
    Some(solution)
}

impl<I: Hash + Eq + Clone, B: SketchTable> FrequencySketch<I> for LeastSquaresSketch<I, B> {
    fn insert(&mut self, item: &I, count: u64) {
        if count == 0 {
            return;
        }
        let outcome = self.core.raise(item, count);
        if outcome.decayed {
            let core = &self.core;
            self.tracker.refresh(|tracked| core.min_estimate(tracked));
            self.tracker.observe(item, core.min_estimate(item));
        } else {
            self.tracker.observe(item, outcome.estimate);
        }
    }

    fn get(&self, item: &I) -> u64 {
        if self.tracker.contains(item) {
            if let Some(solved) = self.solve_tracked() {
                if let Some((_, estimate)) = solved.into_iter().find(|(tracked, _)| tracked == item)
                {
                    return estimate;
                }
            }
        }
        self.core.min_estimate(item)
    }

    fn top(&self) -> Vec<(I, u64)> {
        self.solve_tracked()
            .unwrap_or_else(|| self.tracker.top())
    }

    fn depth(&self) -> usize {
        self.core.scheme.depth()
    }

    fn width(&self) -> usize {
        self.core.scheme.width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_recovers_known_system() {
        // 2x + y = 5, x + 3y = 10 → x = 1, y = 3
        let gram = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let rhs = vec![5.0, 10.0];
        let solution = solve_normal_equations(gram, rhs).unwrap();
        assert!((solution[0] - 1.0).abs() < 1e-9);
        assert!((solution[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_solver_rejects_singular_system() {
        let gram = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let rhs = vec![3.0, 6.0];
        assert!(solve_normal_equations(gram, rhs).is_none());
    }

    #[test]
    fn test_recovers_exact_counts_without_collisions() {
        // A wide table keeps the tracked paths disjoint, so the Gram
        // matrix is diagonal and reconstruction is exact.
        let config = SketchConfig::from_error_bounds(0.001, 0.01).seed(12).top_n(4);
        let mut sketch: LeastSquaresSketch<&str> =
            LeastSquaresSketch::with_config(config).unwrap();

        sketch.insert(&"a", 40);
        sketch.insert(&"b", 30);
        sketch.insert(&"c", 20);
        sketch.insert(&"d", 10);

        assert_eq!(sketch.get(&"a"), 40);
        assert_eq!(sketch.get(&"d"), 10);
        assert_eq!(
            sketch.top(),
            vec![("a", 40), ("b", 30), ("c", 20), ("d", 10)]
        );
    }

    #[test]
    fn test_untracked_items_fall_back_to_min_estimate() {
        let config = SketchConfig::from_error_bounds(0.001, 0.01).seed(14).top_n(2);
        let mut sketch: LeastSquaresSketch<u64> =
            LeastSquaresSketch::with_config(config).unwrap();

        sketch.insert(&1, 100);
        sketch.insert(&2, 90);
        sketch.insert(&3, 1); // not tracked: capacity 2, estimate below both

        assert!(!sketch.tracker.contains(&3));
        assert_eq!(sketch.get(&3), sketch.core.min_estimate(&3));
        assert!(sketch.get(&3) >= 1);
    }

    #[test]
    fn test_reconstruction_debiases_a_congested_table() {
        // Heavy items plus a noisy background of singletons. The solve
        // attributes each tracked path's mass to the item, so tracked
        // estimates stay within a small band around the truth even though
        // the raw min estimates carry collision noise.
        let config = SketchConfig::from_dimensions(128, 5).seed(16).top_n(3);
        let mut sketch: LeastSquaresSketch<u64> =
            LeastSquaresSketch::with_config(config).unwrap();

        sketch.insert(&1_000_001, 500);
        sketch.insert(&1_000_002, 400);
        sketch.insert(&1_000_003, 300);
        for background in 0..2000u64 {
            sketch.insert(&background, 1);
        }

        let top = sketch.top();
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].0, 1_000_001);
        // 2000 units spread over 128 columns: ~16 expected per cell, so
        // a ±100 band around the truth is generous.
        assert!(top[0].1 >= 480 && top[0].1 <= 600);

        let heavy = sketch.get(&1_000_002);
        assert!(heavy >= 380 && heavy <= 500);
    }

    #[test]
    fn test_empty_sketch_has_empty_top() {
        let sketch: LeastSquaresSketch<u64> = LeastSquaresSketch::new(0.01, 0.01).unwrap();
        assert!(sketch.top().is_empty());
        assert_eq!(sketch.get(&7), 0);
    }
}
