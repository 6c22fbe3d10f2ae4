//! Dense numeric matrix backing for the least-squares pipeline

use super::SketchTable;

/// Contiguous 2-D matrix of `u32` counters with numeric views
///
/// Same layout and saturation behavior as [`ArrayTable`], plus row slices
/// and a flat `f64` view. The least-squares estimator reconstructs counts
/// from the flat observation vector, so this backing is its default.
///
/// [`ArrayTable`]: super::ArrayTable
#[derive(Debug, Clone)]
pub struct MatrixTable {
    cells: Vec<u32>,
    depth: usize,
    width: usize,
}

impl MatrixTable {
    /// Borrows one row as a contiguous slice
    pub fn row(&self, row: usize) -> &[u32] {
        let start = row * self.width;
        &self.cells[start..start + self.width]
    }

    /// Flat row-major view as `f64`, the observation vector of a
    /// least-squares solve
    pub fn to_f64_vector(&self) -> Vec<f64> {
        self.cells.iter().map(|&v| f64::from(v)).collect()
    }
}

impl SketchTable for MatrixTable {
    fn with_shape(depth: usize, width: usize) -> Self {
        MatrixTable {
            cells: vec![0u32; depth * width],
            depth,
            width,
        }
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn width(&self) -> usize {
        self.width
    }

    fn get(&self, row: usize, col: usize) -> u64 {
        debug_assert!(row < self.depth && col < self.width);
        u64::from(self.cells[row * self.width + col])
    }

    fn set(&mut self, row: usize, col: usize, value: u64) {
        debug_assert!(row < self.depth && col < self.width);
        self.cells[row * self.width + col] = value.min(u64::from(u32::MAX)) as u32;
    }

    fn add(&mut self, row: usize, col: usize, delta: u64) -> u64 {
        debug_assert!(row < self.depth && col < self.width);
        let idx = row * self.width + col;
        let new = u64::from(self.cells[idx])
            .saturating_add(delta)
            .min(u64::from(u32::MAX));
        self.cells[idx] = new as u32;
        new
    }

    fn clear(&mut self) {
        self.cells.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_slice() {
        let mut table = MatrixTable::with_shape(2, 4);
        table.set(1, 0, 3);
        table.set(1, 3, 8);
        assert_eq!(table.row(1), &[3, 0, 0, 8]);
    }

    #[test]
    fn test_f64_view_matches_flat_vector() {
        let mut table = MatrixTable::with_shape(2, 2);
        table.set(0, 1, 5);
        table.set(1, 0, 2);
        let floats = table.to_f64_vector();
        let ints = table.to_vector();
        assert_eq!(floats.len(), ints.len());
        for (f, i) in floats.iter().zip(ints.iter()) {
            assert_eq!(*f, *i as f64);
        }
    }
}
