//! Exact-counter front of a sketch
//!
//! A small map of exact counters for the items that matter, backed by a
//! sketch for everything else. Items are promoted into the exact set
//! when their sketch estimate earns a slot and demoted when something
//! heavier arrives; a demoted item is simply represented by the sketch
//! again. The result keeps heavy-hitter counts exact while the sketch
//! absorbs the long tail.

use crate::common::{validation, Result};
use crate::frequency::FrequencySketch;
use crate::params::DEFAULT_TOP_N;
use std::collections::HashMap;
use std::hash::Hash;

/// Exact counters for up to N items over any backing sketch
///
/// Promotion seeds an item's counter with its current sketch estimate, so
/// the stored value is exact from that point on only if the estimate was;
/// in practice promotions happen while an item is light and its estimate
/// is still collision-free. Demotion picks the smallest exact count,
/// ties broken toward the earliest-promoted item.
///
/// # Examples
/// ```
/// use minsketch::{FrequencySketch, SketchCounterHybrid, TopNCountMinSketch};
///
/// let sketch: TopNCountMinSketch<&str> = TopNCountMinSketch::new(0.01, 0.01).unwrap();
/// let mut hybrid = SketchCounterHybrid::new(sketch);
/// hybrid.insert(&"apple", 2);
/// assert!(hybrid.get(&"apple") >= 2);
/// ```
#[derive(Clone, Debug)]
pub struct SketchCounterHybrid<I, S> {
    sketch: S,
    exact: HashMap<I, ExactEntry>,
    capacity: usize,
    next_seq: u64,
}

#[derive(Debug, Clone, Copy)]
struct ExactEntry {
    count: u64,
    seq: u64,
}

impl<I: Hash + Eq + Clone, S: FrequencySketch<I>> SketchCounterHybrid<I, S> {
    /// Wraps a sketch with the default exact capacity of 20
    pub fn new(sketch: S) -> Self {
        SketchCounterHybrid {
            sketch,
            exact: HashMap::with_capacity(DEFAULT_TOP_N),
            capacity: DEFAULT_TOP_N,
            next_seq: 0,
        }
    }

    /// Wraps a sketch with room for `capacity` exact counters
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `capacity` is zero.
    pub fn with_capacity(sketch: S, capacity: usize) -> Result<Self> {
        validation::validate_top_n(capacity)?;
        Ok(SketchCounterHybrid {
            sketch,
            exact: HashMap::with_capacity(capacity),
            capacity,
            next_seq: 0,
        })
    }

    /// Number of items currently counted exactly
    pub fn exact_len(&self) -> usize {
        self.exact.len()
    }

    /// Whether `item` is currently counted exactly
    pub fn is_exact(&self, item: &I) -> bool {
        self.exact.contains_key(item)
    }

    /// Borrows the wrapped sketch
    pub fn sketch(&self) -> &S {
        &self.sketch
    }

    fn promote(&mut self, item: &I, count: u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.exact.insert(item.clone(), ExactEntry { count, seq });
    }

    // Smallest exact count, earliest promotion first on ties.
    fn exact_min(&self) -> Option<(I, u64)> {
        self.exact
            .iter()
            .min_by(|a, b| a.1.count.cmp(&b.1.count).then(a.1.seq.cmp(&b.1.seq)))
            .map(|(item, entry)| (item.clone(), entry.count))
    }
}

impl<I: Hash + Eq + Clone, S: FrequencySketch<I>> FrequencySketch<I>
    for SketchCounterHybrid<I, S>
{
    fn insert(&mut self, item: &I, count: u64) {
        if count == 0 {
            return;
        }
        self.sketch.insert(item, count);

        if let Some(entry) = self.exact.get_mut(item) {
            entry.count = entry.count.saturating_add(count);
            return;
        }

        let estimate = self.sketch.get(item);
        if self.exact.len() < self.capacity {
            self.promote(item, estimate);
            return;
        }

        if let Some((lightest, lightest_count)) = self.exact_min() {
            if estimate > lightest_count {
                // The demoted item is represented by the sketch alone now.
                self.exact.remove(&lightest);
                self.promote(item, estimate);
            }
        }
    }

    fn get(&self, item: &I) -> u64 {
        match self.exact.get(item) {
            Some(entry) => entry.count,
            None => self.sketch.get(item),
        }
    }

    fn top(&self) -> Vec<(I, u64)> {
        let mut ranked: Vec<(&I, ExactEntry)> =
            self.exact.iter().map(|(item, &entry)| (item, entry)).collect();
        ranked.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.1.seq.cmp(&b.1.seq)));
        ranked
            .into_iter()
            .map(|(item, entry)| (item.clone(), entry.count))
            .collect()
    }

    fn depth(&self) -> usize {
        self.sketch.depth()
    }

    fn width(&self) -> usize {
        self.sketch.width()
    }
}
