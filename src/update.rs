//! Counter update strategies

use crate::tables::SketchTable;

/// How an insert writes into the counter table
///
/// Baseline is the textbook Count-Min update. Conservative update (Estan
/// & Varghese, 2002) raises only the counters that sit at the item's
/// current path minimum, which tightens overestimation — the estimate
/// after an insert is exactly `min + delta` — at the cost of breaking
/// sketch summability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateStrategy {
    /// Add `delta` to every counter on the item's path
    #[default]
    Baseline,
    /// Raise each counter on the path to `max(counter, path_min + delta)`
    Conservative,
}

impl UpdateStrategy {
    /// Applies `delta` to the item's path `cols` (one column per row)
    pub fn apply<B: SketchTable>(&self, table: &mut B, cols: &[usize], delta: u64) {
        match self {
            UpdateStrategy::Baseline => {
                for (row, &col) in cols.iter().enumerate() {
                    table.add(row, col, delta);
                }
            }
            UpdateStrategy::Conservative => {
                let floor = cols
                    .iter()
                    .enumerate()
                    .map(|(row, &col)| table.get(row, col))
                    .min()
                    .unwrap_or(0);
                let target = floor.saturating_add(delta);
                for (row, &col) in cols.iter().enumerate() {
                    if table.get(row, col) < target {
                        table.set(row, col, target);
                    }
                }
            }
        }
    }
}
