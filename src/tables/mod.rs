//! Counter table backings
//!
//! A sketch table is a `depth × width` matrix of non-negative counters.
//! Four backings trade counter range against memory: unbounded-range rows
//! ([`ListTable`]), a flat 32-bit array ([`ArrayTable`]), a dense numeric
//! matrix for the least-squares pipeline ([`MatrixTable`]), and a
//! bit-packed buffer ([`PackedTable`]). All four satisfy the same
//! contract, and all four saturate at their cell maximum on overflow.

mod array;
mod list;
mod matrix;
mod packed;

pub use array::ArrayTable;
pub use list::ListTable;
pub use matrix::MatrixTable;
pub use packed::PackedTable;

/// Contract shared by every counter table backing
///
/// Cells are addressed by `(row, col)` with `row < depth` and
/// `col < width`; out-of-range indices panic. Values pass through the
/// trait as `u64` regardless of the backing's cell size; `set` clamps to
/// the cell maximum and `add` saturates there, so overflow is never
/// observable as a wrap.
pub trait SketchTable {
    /// Allocates a zeroed table of the given shape
    fn with_shape(depth: usize, width: usize) -> Self
    where
        Self: Sized;

    /// Number of rows
    fn depth(&self) -> usize;

    /// Columns per row
    fn width(&self) -> usize;

    /// Reads the counter at `(row, col)`
    fn get(&self, row: usize, col: usize) -> u64;

    /// Overwrites the counter at `(row, col)`, clamping to the cell maximum
    fn set(&mut self, row: usize, col: usize, value: u64);

    /// Adds `delta` to the counter at `(row, col)`, saturating at the cell
    /// maximum, and returns the new value
    fn add(&mut self, row: usize, col: usize, delta: u64) -> u64;

    /// Resets every counter to zero
    fn clear(&mut self);

    /// Flat row-major view of the table, length `depth * width`
    fn to_vector(&self) -> Vec<u64> {
        let mut flat = Vec::with_capacity(self.depth() * self.width());
        for row in 0..self.depth() {
            for col in 0..self.width() {
                flat.push(self.get(row, col));
            }
        }
        flat
    }
}
