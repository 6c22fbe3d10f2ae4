//! Count-Mean-Min: noise-corrected estimation
//!
//! The classical min estimate is biased upward: every counter on an
//! item's path carries the item's count plus collision noise. Count-Mean
//! (Deng & Rafiei, 2007) estimates that noise per row as
//! `(row_sum − counter) / (w − 1)` — the average weight a colliding item
//! contributes to the cell — subtracts it, and takes the median across
//! rows. The result is clamped to `[0, min]`, so it never exceeds the
//! classical estimate but can dip below the true count.
//!
//! Row sums are maintained incrementally on insert and decay; queries
//! never scan the table.

use crate::common::{Result, SketchError};
use crate::frequency::{FrequencySketch, SketchCore};
use crate::hashing::{HashPair, IndependentHashes, IndexScheme};
use crate::params::SketchConfig;
use crate::tables::{ArrayTable, SketchTable};
use crate::topn::TopNTracker;
use std::hash::Hash;

fn require_mean_width(width: usize) -> Result<()> {
    if width < 2 {
        return Err(SketchError::IncompatibleComposition {
            reason: "count-mean estimator requires width >= 2".to_string(),
        });
    }
    Ok(())
}

macro_rules! count_mean_sketch {
    ($(#[$doc:meta])* $name:ident, $scheme:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug)]
        pub struct $name<I, B = ArrayTable> {
            core: SketchCore<B, $scheme>,
            tracker: TopNTracker<I>,
        }

        impl<I: Hash + Eq + Clone, B: SketchTable> $name<I, B> {
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
            /// Returns `InvalidParameter` on failed validation, or
            /// `IncompatibleComposition` for a width-1 table, which leaves
            /// the noise term undefined.
            pub fn with_config(config: SketchConfig) -> Result<Self> {
                let resolved = config.resolve()?;
                require_mean_width(resolved.params.width())?;
                let scheme = match resolved.seed {
                    Some(seed) => $scheme::with_seed(
                        resolved.params.depth(),
                        resolved.params.width(),
                        seed,
                    ),
                    None => $scheme::new(resolved.params.depth(), resolved.params.width()),
                };
                Ok($name {
                    core: SketchCore::new(
                        resolved.params,
                        scheme,
                        resolved.update,
                        resolved.lossy,
                    ),
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
        }

        impl<I: Hash + Eq + Clone, B: SketchTable> FrequencySketch<I> for $name<I, B> {
            fn insert(&mut self, item: &I, count: u64) {
                if count == 0 {
                    return;
                }
                let outcome = self.core.raise(item, count);
                let core = &self.core;
                if outcome.decayed {
                    self.tracker.refresh(|tracked| core.count_mean_estimate(tracked));
                }
                self.tracker.observe(item, core.count_mean_estimate(item));
            }

            fn get(&self, item: &I) -> u64 {
                self.core.count_mean_estimate(item)
            }

            fn top(&self) -> Vec<(I, u64)> {
                self.tracker.top()
            }

            fn depth(&self) -> usize {
                self.core.scheme.depth()
            }

            fn width(&self) -> usize {
                self.core.scheme.width()
            }
        }
    };
}

count_mean_sketch!(
    /// Count-Mean-Min over independent per-row hashes
    ///
    /// # Examples
    /// ```
    /// use minsketch::{CountMeanMinSketch, FrequencySketch};
    ///
    /// let mut sketch: CountMeanMinSketch<&str> = CountMeanMinSketch::new(0.01, 0.01).unwrap();
    /// sketch.insert(&"apple", 5);
    /// assert!(sketch.get(&"apple") <= 5);
    /// ```
    CountMeanMinSketch,
    IndependentHashes
);

count_mean_sketch!(
    /// Count-Mean-Min over the hash-pair scheme
    ///
    /// Same estimator as [`CountMeanMinSketch`] with the two-digest row
    /// synthesis of [`HashPairCMSketch`](crate::HashPairCMSketch).
    HashPairCountMeanMinSketch,
    HashPair
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_one_is_rejected() {
        let config = SketchConfig::from_dimensions(1, 3);
        assert!(matches!(
            CountMeanMinSketch::<u64>::with_config(config.clone()),
            Err(SketchError::IncompatibleComposition { .. })
        ));
        assert!(matches!(
            HashPairCountMeanMinSketch::<u64>::with_config(config),
            Err(SketchError::IncompatibleComposition { .. })
        ));
    }

    #[test]
    fn test_estimate_bounded_by_min_estimate() {
        // A deliberately congested table so the debiasing has noise to
        // remove; the estimate must stay within [0, min] for every item.
        let config = SketchConfig::from_dimensions(32, 4).seed(3);
        let mut sketch: CountMeanMinSketch<u64> =
            CountMeanMinSketch::with_config(config).unwrap();

        for step in 0..3000u64 {
            sketch.insert(&(step % 200), 1);
        }

        for item in 0..200u64 {
            let mean = sketch.get(&item);
            let min = sketch.core.min_estimate(&item);
            assert!(mean <= min, "count-mean {} exceeded min {}", mean, min);
        }
    }

    #[test]
    fn test_agrees_with_min_on_a_clean_table() {
        // No collisions to correct for: both estimators see the raw count.
        let config = SketchConfig::from_error_bounds(0.001, 0.01).seed(9);
        let mut sketch: CountMeanMinSketch<&str> =
            CountMeanMinSketch::with_config(config).unwrap();

        sketch.insert(&"solo", 42);
        assert_eq!(sketch.get(&"solo"), 42);
    }

    #[test]
    fn test_heavy_item_ranked_first() {
        let config = SketchConfig::from_error_bounds(0.01, 0.01).seed(21);
        let mut sketch: HashPairCountMeanMinSketch<String> =
            HashPairCountMeanMinSketch::with_config(config).unwrap();

        for _ in 0..500 {
            sketch.insert(&"heavy".to_string(), 1);
        }
        for i in 0..200 {
            sketch.insert(&format!("light{}", i), 1);
        }

        assert_eq!(sketch.top()[0].0, "heavy");
    }

    #[test]
    fn test_row_sums_stay_consistent_with_table() {
        let config = SketchConfig::from_dimensions(64, 3).seed(15);
        let mut sketch: CountMeanMinSketch<u64> =
            CountMeanMinSketch::with_config(config).unwrap();

        for step in 0..1000u64 {
            sketch.insert(&(step % 90), 1 + step % 3);
        }

        for row in 0..3 {
            let scanned: u64 = (0..64).map(|col| sketch.core.table.get(row, col)).sum();
            assert_eq!(scanned, sketch.core.row_sums[row]);
        }
    }
}
