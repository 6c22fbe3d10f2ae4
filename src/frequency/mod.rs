//! Frequency sketch variants
//!
//! Every variant composes the same moving parts — a counter table, an
//! index scheme, an update strategy, an optional lossy decay schedule,
//! and a heavy-hitter tracker — and differs only in which scheme it
//! hashes with and how it turns counters into an estimate.

mod count_mean;
mod count_min;
mod double_hashing;
mod hybrid;
mod least_squares;

pub use count_mean::{CountMeanMinSketch, HashPairCountMeanMinSketch};
pub use count_min::TopNCountMinSketch;
pub use double_hashing::{HashPairCMSketch, MultiHashPairSketch};
pub use hybrid::SketchCounterHybrid;
pub use least_squares::LeastSquaresSketch;

use crate::hashing::IndexScheme;
use crate::lossy::{decay_table, LossyStrategy};
use crate::params::SketchParams;
use crate::tables::SketchTable;
use crate::update::UpdateStrategy;
use std::hash::Hash;

/// Common query/update surface of every sketch variant
///
/// Items are opaque values with a stable digest (`Hash`), owned by the
/// sketch only while they sit in its heavy-hitter tracker (`Eq + Clone`).
/// Estimates are non-negative integers; the min-estimator variants never
/// return below the true count (absent lossy decay), while the debiasing
/// estimators trade that guarantee for less overestimation.
pub trait FrequencySketch<I> {
    /// Records `count` occurrences of `item`
    fn insert(&mut self, item: &I, count: u64);

    /// Current estimate for `item`
    fn get(&self, item: &I) -> u64;

    /// Tracked heavy hitters, descending by estimate, at most N entries
    fn top(&self) -> Vec<(I, u64)>;

    /// Number of table rows
    fn depth(&self) -> usize;

    /// Columns per table row
    fn width(&self) -> usize;

    /// Records every item of a stream once
    fn update<S>(&mut self, items: S)
    where
        S: IntoIterator<Item = I>,
        Self: Sized,
    {
        for item in items {
            self.insert(&item, 1);
        }
    }
}

/// What an insert did to the table
pub(crate) struct RaiseOutcome {
    /// Path minimum after the write — the min estimate of the item
    pub(crate) estimate: u64,
    /// Whether a decay window closed on this insert
    pub(crate) decayed: bool,
}

/// The state shared by every table-backed variant
#[derive(Clone, Debug)]
pub(crate) struct SketchCore<B, H> {
    pub(crate) params: SketchParams,
    pub(crate) table: B,
    pub(crate) scheme: H,
    pub(crate) update: UpdateStrategy,
    pub(crate) lossy: Option<LossyStrategy>,
    /// Per-row sums, maintained incrementally for the count-mean estimator
    pub(crate) row_sums: Vec<u64>,
    pub(crate) total_count: u64,
}

impl<B: SketchTable, H: IndexScheme> SketchCore<B, H> {
    pub(crate) fn new(
        params: SketchParams,
        scheme: H,
        update: UpdateStrategy,
        lossy: Option<LossyStrategy>,
    ) -> Self {
        SketchCore {
            table: B::with_shape(params.depth(), params.width()),
            row_sums: vec![0u64; params.depth()],
            params,
            scheme,
            update,
            lossy,
            total_count: 0,
        }
    }

    /// Writes `count` occurrences of `item` into the table and advances
    /// the decay schedule
    pub(crate) fn raise<T: Hash + ?Sized>(&mut self, item: &T, count: u64) -> RaiseOutcome {
        let cols = self.scheme.indices(item);
        self.total_count = self.total_count.saturating_add(count);

        let mut before = Vec::with_capacity(cols.len());
        for (row, &col) in cols.iter().enumerate() {
            before.push(self.table.get(row, col));
        }

        self.update.apply(&mut self.table, &cols, count);

        let mut estimate = u64::MAX;
        for (row, &col) in cols.iter().enumerate() {
            let now = self.table.get(row, col);
            self.row_sums[row] = self.row_sums[row].saturating_add(now - before[row]);
            estimate = estimate.min(now);
        }

        let decayed = self.maybe_decay();
        RaiseOutcome { estimate, decayed }
    }

    /// Classical min estimate
    pub(crate) fn min_estimate<T: Hash + ?Sized>(&self, item: &T) -> u64 {
        self.scheme
            .indices(item)
            .iter()
            .enumerate()
            .map(|(row, &col)| self.table.get(row, col))
            .min()
            .unwrap_or(0)
    }

    /// Count-mean-min estimate: median of noise-corrected row values,
    /// clamped to `[0, min_estimate]`
    pub(crate) fn count_mean_estimate<T: Hash + ?Sized>(&self, item: &T) -> u64 {
        let cols = self.scheme.indices(item);
        let width = self.params.width();

        let mut min = u64::MAX;
        let mut debiased = Vec::with_capacity(cols.len());
        for (row, &col) in cols.iter().enumerate() {
            let value = self.table.get(row, col);
            min = min.min(value);
            let noise = (self.row_sums[row] - value) as f64 / (width - 1) as f64;
            debiased.push(value as f64 - noise);
        }

        debiased.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = debiased.len() / 2;
        let median = if debiased.len() % 2 == 1 {
            debiased[mid]
        } else {
            (debiased[mid - 1] + debiased[mid]) / 2.0
        };

        (median.round().max(0.0) as u64).min(min)
    }

    fn maybe_decay(&mut self) -> bool {
        let Some(lossy) = self.lossy.as_mut() else {
            return false;
        };
        let Some(amount) = lossy.record_insert() else {
            return false;
        };
        decay_table(&mut self.table, amount);
        self.rebuild_row_sums();
        true
    }

    fn rebuild_row_sums(&mut self) {
        for row in 0..self.params.depth() {
            let mut sum = 0u64;
            for col in 0..self.params.width() {
                sum = sum.saturating_add(self.table.get(row, col));
            }
            self.row_sums[row] = sum;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.table.clear();
        self.row_sums.fill(0);
        self.total_count = 0;
        if let Some(lossy) = self.lossy.as_mut() {
            lossy.reset();
        }
    }
}
