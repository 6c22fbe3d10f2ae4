//! Count-Min Sketch with heavy-hitter tracking
//!
//! The standard algorithm for point-query frequency estimation (Cormode
//! & Muthukrishnan, 2003): d independent hash rows of w counters, an
//! estimate is the minimum counter along an item's path. Estimates never
//! underestimate, and overestimate by at most ε·N with probability 1 − δ.
//!
//! This variant also tracks the top-N items by estimate as the stream is
//! consumed, so heavy hitters are available without a second pass.

use crate::common::{Result, SketchError};
use crate::frequency::{FrequencySketch, SketchCore};
use crate::hashing::{IndependentHashes, IndexScheme};
use crate::params::SketchConfig;
use crate::tables::{ArrayTable, SketchTable};
use crate::topn::TopNTracker;
use std::hash::Hash;

/// Count-Min sketch over independent per-row hashes, with a top-N tracker
///
/// The default configuration uses the flat 32-bit [`ArrayTable`] backing,
/// the baseline update strategy, no decay, and a top-20 tracker; all of
/// these are adjustable through [`SketchConfig`].
///
/// # Examples
/// ```
/// use minsketch::{FrequencySketch, TopNCountMinSketch};
///
/// let mut sketch: TopNCountMinSketch<&str> = TopNCountMinSketch::new(0.01, 0.01).unwrap();
/// sketch.insert(&"apple", 3);
/// sketch.insert(&"pear", 1);
///
/// assert!(sketch.get(&"apple") >= 3);
/// assert_eq!(sketch.get(&"missing"), 0);
/// assert_eq!(sketch.top()[0].0, "apple");
/// ```
#[derive(Clone, Debug)]
pub struct TopNCountMinSketch<I, B = ArrayTable> {
    core: SketchCore<B, IndependentHashes>,
    tracker: TopNTracker<I>,
}

impl<I: Hash + Eq + Clone, B: SketchTable> TopNCountMinSketch<I, B> {
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
                IndependentHashes::with_seed(resolved.params.depth(), resolved.params.width(), seed)
            }
            None => IndependentHashes::new(resolved.params.depth(), resolved.params.width()),
        };
        Ok(TopNCountMinSketch {
            core: SketchCore::new(resolved.params, scheme, resolved.update, resolved.lossy),
            tracker: TopNTracker::new(resolved.top_n),
        })
    }

    /// Creates a sketch around a caller-built table backing
    ///
    /// This is how a [`PackedTable`](crate::tables::PackedTable) with a
    /// custom cell width is put to use. The table must be empty and match
    /// the configured shape.
    ///
    /// # Errors
    /// Returns `IncompatibleComposition` if the table shape disagrees with
    /// the configuration.
    pub fn with_table(config: SketchConfig, table: B) -> Result<Self> {
        let mut sketch = Self::with_config(config)?;
        if table.depth() != sketch.core.params.depth()
            || table.width() != sketch.core.params.width()
        {
            return Err(SketchError::IncompatibleComposition {
                reason: format!(
                    "table shape {}x{} does not match configured {}x{}",
                    table.depth(),
                    table.width(),
                    sketch.core.params.depth(),
                    sketch.core.params.width()
                ),
            });
        }
        sketch.core.table = table;
        Ok(sketch)
    }

    /// Error bound ε
    pub fn epsilon(&self) -> f64 {
        self.core.params.epsilon()
    }

    /// Failure probability δ
    pub fn delta(&self) -> f64 {
        self.core.params.delta()
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

impl<I: Hash + Eq + Clone, B: SketchTable> FrequencySketch<I> for TopNCountMinSketch<I, B> {
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
        self.core.min_estimate(item)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lossy::{LossyStrategy, Threshold};
    use crate::tables::{ListTable, PackedTable};
    use crate::update::UpdateStrategy;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn test_dimension_derivation() {
        let sketch: TopNCountMinSketch<u64> = TopNCountMinSketch::new(0.01, 0.01).unwrap();
        assert_eq!(sketch.width(), 272);
        assert_eq!(sketch.depth(), 5);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(TopNCountMinSketch::<u64>::new(0.0, 0.01).is_err());
        assert!(TopNCountMinSketch::<u64>::new(0.01, 1.0).is_err());
    }

    #[test]
    fn test_update_consumes_a_stream() {
        let mut sketch: TopNCountMinSketch<&str> = TopNCountMinSketch::new(0.01, 0.01).unwrap();
        sketch.update(["a", "b", "a"]);
        assert!(sketch.get(&"a") >= 2);
        assert!(sketch.get(&"b") >= 1);
        assert_eq!(sketch.total_count(), 3);
    }

    #[test]
    fn test_zero_count_insert_is_a_noop() {
        let mut sketch: TopNCountMinSketch<&str> = TopNCountMinSketch::new(0.01, 0.01).unwrap();
        sketch.insert(&"a", 0);
        assert_eq!(sketch.get(&"a"), 0);
        assert_eq!(sketch.total_count(), 0);
        assert!(sketch.top().is_empty());
    }

    #[test]
    fn test_singletons_estimate_exactly_one() {
        // 1000 distinct items into a 2719x5 table: the expected number of
        // items whose every row collides is ~3, far under the 50 allowed.
        let config = SketchConfig::from_error_bounds(0.001, 0.01).seed(42);
        let mut sketch: TopNCountMinSketch<u64> =
            TopNCountMinSketch::with_config(config).unwrap();
        for item in 0..1000u64 {
            sketch.insert(&item, 1);
        }

        let mut exact = 0;
        for item in 0..1000u64 {
            let estimate = sketch.get(&item);
            assert!(estimate >= 1);
            if estimate == 1 {
                exact += 1;
            }
        }
        assert!(exact >= 950, "only {} of 1000 estimated exactly", exact);
    }

    #[test]
    fn test_heavy_item_estimated_exactly() {
        let config = SketchConfig::from_error_bounds(0.0001, 0.01).seed(7);
        let mut sketch: TopNCountMinSketch<String> =
            TopNCountMinSketch::with_config(config).unwrap();

        for _ in 0..1000 {
            sketch.insert(&"a".to_string(), 1);
        }
        for _ in 0..10 {
            sketch.insert(&"b".to_string(), 1);
        }
        for i in 0..1000 {
            sketch.insert(&format!("w{}", i), 1);
        }

        assert_eq!(sketch.get(&"a".to_string()), 1000);
        let top = sketch.top();
        assert_eq!(top[0], ("a".to_string(), 1000));
        assert!(top.len() >= 3);
    }

    #[test]
    fn test_never_underestimates() {
        let config = SketchConfig::from_error_bounds(0.01, 0.01).seed(3);
        let mut sketch: TopNCountMinSketch<u64> =
            TopNCountMinSketch::with_config(config).unwrap();

        let mut truth: HashMap<u64, u64> = HashMap::new();
        let mut state = 0xdead_beefu64;
        for _ in 0..10_000 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let item = (state >> 33) % 500;
            sketch.insert(&item, 1);
            *truth.entry(item).or_insert(0) += 1;
        }

        for (item, count) in &truth {
            assert!(sketch.get(item) >= *count);
        }
    }

    #[test]
    fn test_error_bound_holds_for_most_items() {
        // ε = 0.01 over a 10k stream allows at most 100 of overestimate;
        // the per-item failure probability is ≤ δ = 0.01, so demanding 95%
        // leaves a wide margin.
        let config = SketchConfig::from_error_bounds(0.01, 0.01).seed(11);
        let mut sketch: TopNCountMinSketch<u64> =
            TopNCountMinSketch::with_config(config).unwrap();

        let mut truth: HashMap<u64, u64> = HashMap::new();
        let mut state = 99u64;
        for _ in 0..10_000 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let item = (state >> 33) % 2000;
            sketch.insert(&item, 1);
            *truth.entry(item).or_insert(0) += 1;
        }

        let bound = (0.01 * 10_000.0) as u64;
        let within = truth
            .iter()
            .filter(|&(item, count)| sketch.get(item) <= *count + bound)
            .count();
        assert!(within as f64 >= 0.95 * truth.len() as f64);
    }

    #[test]
    fn test_conservative_never_exceeds_baseline() {
        let baseline_config = SketchConfig::from_error_bounds(0.1, 0.1).seed(5);
        let conservative_config = SketchConfig::from_error_bounds(0.1, 0.1)
            .seed(5)
            .update_strategy(UpdateStrategy::Conservative);

        let mut baseline: TopNCountMinSketch<u64> =
            TopNCountMinSketch::with_config(baseline_config).unwrap();
        let mut conservative: TopNCountMinSketch<u64> =
            TopNCountMinSketch::with_config(conservative_config).unwrap();

        let mut truth: HashMap<u64, u64> = HashMap::new();
        for step in 0..2000u64 {
            let item = (step * step) % 50;
            baseline.insert(&item, 1);
            conservative.insert(&item, 1);
            *truth.entry(item).or_insert(0) += 1;
        }

        for (item, count) in &truth {
            let conservative_estimate = conservative.get(item);
            assert!(conservative_estimate >= *count);
            assert!(conservative_estimate <= baseline.get(item));
        }
    }

    #[test]
    fn test_estimates_are_monotone_in_insertions() {
        let config = SketchConfig::from_error_bounds(0.1, 0.1).seed(13);
        let mut sketch: TopNCountMinSketch<u64> =
            TopNCountMinSketch::with_config(config).unwrap();

        let mut previous = 0;
        for step in 0..500u64 {
            sketch.insert(&(step % 7), 1);
            let estimate = sketch.get(&3);
            assert!(estimate >= previous);
            previous = estimate;
        }
    }

    #[test]
    fn test_lossy_window_decay_zeroes_a_singleton_table() {
        // γ = 0.01 and the window-size threshold subtract 100 from every
        // cell each 100 inserts; unique items never accumulate more than
        // 100 in a cell per window, so the table returns to all zeros.
        let lossy = LossyStrategy::new(0.01, Threshold::WindowSize).unwrap();
        let config = SketchConfig::from_error_bounds(0.01, 0.01).seed(17).lossy(lossy);
        let mut sketch: TopNCountMinSketch<u64> =
            TopNCountMinSketch::with_config(config).unwrap();

        for item in 0..1000u64 {
            sketch.insert(&item, 1);
        }

        assert!(sketch.core.table.to_vector().iter().all(|&v| v == 0));
        assert!(sketch.top().is_empty());
    }

    #[test]
    fn test_list_backing_behaves_like_array_backing() {
        let config = SketchConfig::from_error_bounds(0.01, 0.01).seed(23);
        let mut array: TopNCountMinSketch<u64> =
            TopNCountMinSketch::with_config(config.clone()).unwrap();
        let mut list: TopNCountMinSketch<u64, ListTable> =
            TopNCountMinSketch::with_config(config).unwrap();

        for step in 0..1000u64 {
            let item = step % 100;
            array.insert(&item, 2);
            list.insert(&item, 2);
        }
        for item in 0..100u64 {
            assert_eq!(array.get(&item), list.get(&item));
        }
    }

    #[test]
    fn test_packed_backing_via_with_table() {
        let config = SketchConfig::from_dimensions(64, 4).seed(29);
        let table = PackedTable::with_max_count(4, 64, 1 << 20).unwrap();
        let mut sketch: TopNCountMinSketch<u64, PackedTable> =
            TopNCountMinSketch::with_table(config, table).unwrap();

        for step in 0..300u64 {
            sketch.insert(&(step % 10), 1);
        }
        for item in 0..10u64 {
            assert!(sketch.get(&item) >= 30);
        }
    }

    #[test]
    fn test_with_table_rejects_shape_mismatch() {
        let config = SketchConfig::from_dimensions(64, 4);
        let table = PackedTable::with_max_count(4, 32, 1000).unwrap();
        let result: Result<TopNCountMinSketch<u64, PackedTable>> =
            TopNCountMinSketch::with_table(config, table);
        assert!(matches!(
            result,
            Err(SketchError::IncompatibleComposition { .. })
        ));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut sketch: TopNCountMinSketch<&str> = TopNCountMinSketch::new(0.01, 0.01).unwrap();
        sketch.insert(&"a", 5);
        sketch.clear();
        assert_eq!(sketch.get(&"a"), 0);
        assert_eq!(sketch.total_count(), 0);
        assert!(sketch.top().is_empty());
    }

    proptest! {
        #[test]
        fn prop_never_underestimates(stream in prop::collection::vec(0u8..32, 0..400)) {
            let config = SketchConfig::from_error_bounds(0.1, 0.1).seed(31);
            let mut sketch: TopNCountMinSketch<u8> =
                TopNCountMinSketch::with_config(config).unwrap();

            let mut truth: HashMap<u8, u64> = HashMap::new();
            for item in &stream {
                sketch.insert(item, 1);
                *truth.entry(*item).or_insert(0) += 1;
            }
            for (item, count) in &truth {
                prop_assert!(sketch.get(item) >= *count);
            }
        }
    }
}
