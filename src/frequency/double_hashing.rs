//! Count-Min variants over the hash-pair scheme
//!
//! Double hashing (Kirsch & Mitzenmacher, 2006) replaces d independent
//! hash functions with two: row r is indexed by `(A + r·B) mod P`. The
//! guarantees of the classical sketch carry over within constant
//! factors, and the whole table becomes addressable through a single
//! flat offset, which is what makes the bit-packed backing and the
//! least-squares estimator possible.

use crate::common::{Result, SketchError};
use crate::frequency::{FrequencySketch, SketchCore};
use crate::hashing::{HashPair, IndexScheme};
use crate::params::SketchConfig;
use crate::tables::{ArrayTable, SketchTable};
use crate::topn::TopNTracker;
use std::hash::Hash;

/// Sub-sketches held by [`MultiHashPairSketch::new`]
pub const DEFAULT_SKETCH_COUNT: usize = 2;

/// Count-Min sketch over one hash pair, with a top-N tracker
///
/// # Examples
/// ```
/// use minsketch::{FrequencySketch, HashPairCMSketch};
///
/// let mut sketch: HashPairCMSketch<&str> = HashPairCMSketch::new(0.01, 0.01).unwrap();
/// sketch.insert(&"apple", 2);
/// assert!(sketch.get(&"apple") >= 2);
/// ```
#[derive(Clone, Debug)]
pub struct HashPairCMSketch<I, B = ArrayTable> {
    core: SketchCore<B, HashPair>,
    tracker: TopNTracker<I>,
}

impl<I: Hash + Eq + Clone, B: SketchTable> HashPairCMSketch<I, B> {
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
        Ok(HashPairCMSketch {
            core: SketchCore::new(resolved.params, scheme, resolved.update, resolved.lossy),
            tracker: TopNTracker::new(resolved.top_n),
        })
    }

    /// Creates a sketch around a caller-built table backing
    ///
    /// The natural pairing is a [`PackedTable`](crate::tables::PackedTable)
    /// sized by an expected maximum count.
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

impl<I: Hash + Eq + Clone, B: SketchTable> FrequencySketch<I> for HashPairCMSketch<I, B> {
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

/// Minimum over k parallel hash-pair sketches
///
/// Each sub-sketch draws its own hash pair, so a collision must repeat in
/// every one of them to survive into the estimate. Two sub-sketches
/// (the default) already cut the tail of severe overestimates sharply;
/// the price is k tables and k updates per insert.
#[derive(Clone, Debug)]
pub struct MultiHashPairSketch<I, B = ArrayTable> {
    cores: Vec<SketchCore<B, HashPair>>,
    tracker: TopNTracker<I>,
}

impl<I: Hash + Eq + Clone, B: SketchTable> MultiHashPairSketch<I, B> {
    /// Creates a sketch with the default number of sub-sketches
    ///
    /// # Errors
    /// Returns `InvalidParameter` if either probability is outside (0, 1).
    pub fn new(epsilon: f64, delta: f64) -> Result<Self> {
        Self::with_sketches(
            SketchConfig::from_error_bounds(epsilon, delta),
            DEFAULT_SKETCH_COUNT,
        )
    }

    /// Creates a sketch holding `sketches` parallel hash-pair tables
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `sketches` is zero or the
    /// configuration fails validation.
    pub fn with_sketches(config: SketchConfig, sketches: usize) -> Result<Self> {
        if sketches == 0 {
            return Err(SketchError::InvalidParameter {
                param: "sketches".to_string(),
                value: sketches.to_string(),
                constraint: "must be greater than 0".to_string(),
            });
        }
        let resolved = config.resolve()?;
        let cores = (0..sketches)
            .map(|index| {
                let scheme = match resolved.seed {
                    Some(seed) => HashPair::with_seed(
                        resolved.params.depth(),
                        resolved.params.width(),
                        seed.wrapping_add(index as u64),
                    ),
                    None => HashPair::new(resolved.params.depth(), resolved.params.width()),
                };
                SketchCore::new(resolved.params, scheme, resolved.update, resolved.lossy.clone())
            })
            .collect();
        Ok(MultiHashPairSketch {
            cores,
            tracker: TopNTracker::new(resolved.top_n),
        })
    }

    /// Number of parallel sub-sketches
    pub fn sketches(&self) -> usize {
        self.cores.len()
    }

    /// Total inserted weight
    pub fn total_count(&self) -> u64 {
        self.cores[0].total_count
    }

    /// Resets counters, tracker, and decay state
    pub fn clear(&mut self) {
        for core in &mut self.cores {
            core.clear();
        }
        self.tracker.clear();
    }

    fn min_across<T: Hash + ?Sized>(cores: &[SketchCore<B, HashPair>], item: &T) -> u64 {
        cores
            .iter()
            .map(|core| core.min_estimate(item))
            .min()
            .unwrap_or(0)
    }
}

impl<I: Hash + Eq + Clone, B: SketchTable> FrequencySketch<I> for MultiHashPairSketch<I, B> {
    fn insert(&mut self, item: &I, count: u64) {
        if count == 0 {
            return;
        }
        let mut estimate = u64::MAX;
        let mut decayed = false;
        for core in &mut self.cores {
            let outcome = core.raise(item, count);
            estimate = estimate.min(outcome.estimate);
            decayed |= outcome.decayed;
        }
        if decayed {
            let cores = &self.cores;
            self.tracker
                .refresh(|tracked| Self::min_across(cores, tracked));
            self.tracker.observe(item, Self::min_across(cores, item));
        } else {
            self.tracker.observe(item, estimate);
        }
    }

    fn get(&self, item: &I) -> u64 {
        Self::min_across(&self.cores, item)
    }

    fn top(&self) -> Vec<(I, u64)> {
        self.tracker.top()
    }

    fn depth(&self) -> usize {
        self.cores[0].scheme.depth()
    }

    fn width(&self) -> usize {
        self.cores[0].scheme.width()
    }
}
