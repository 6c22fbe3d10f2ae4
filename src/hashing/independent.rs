//! Independent per-row hashing

use super::IndexScheme;
use crate::common::hash::{digest64, mix64};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::hash::Hash;

/// One seeded hash function per row
///
/// The classical Count-Min construction: d seeds are drawn at build time
/// and row r's column is the item's digest under seed r, reduced mod w.
/// Seeds come from the thread RNG by default; `with_seed` derives them
/// from a master seed for reproducible sketches.
#[derive(Debug, Clone)]
pub struct IndependentHashes {
    seeds: Vec<u64>,
    width: usize,
}

impl IndependentHashes {
    /// Draws `depth` fresh row seeds
    pub fn new(depth: usize, width: usize) -> Self {
        let mut rng = rand::rng();
        IndependentHashes {
            seeds: (0..depth).map(|_| rng.random()).collect(),
            width,
        }
    }

    /// Derives `depth` row seeds deterministically from a master seed
    pub fn with_seed(depth: usize, width: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(mix64(seed));
        IndependentHashes {
            seeds: (0..depth).map(|_| rng.random()).collect(),
            width,
        }
    }
}

impl IndexScheme for IndependentHashes {
    fn depth(&self) -> usize {
        self.seeds.len()
    }

    fn width(&self) -> usize {
        self.width
    }

    fn fill_indices<T: Hash + ?Sized>(&self, item: &T, out: &mut Vec<usize>) {
        for &seed in &self.seeds {
            out.push((digest64(item, seed) % self.width as u64) as usize);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_hash_independently() {
        // With distinct row seeds the per-row columns of one item should
        // not all coincide for a wide table.
        let scheme = IndependentHashes::with_seed(6, 10_000, 3);
        let cols = scheme.indices(&"collision-probe");
        let first = cols[0];
        assert!(cols.iter().any(|&c| c != first));
    }

    #[test]
    fn test_fresh_sketches_get_fresh_seeds() {
        let a = IndependentHashes::new(4, 1000);
        let b = IndependentHashes::new(4, 1000);
        assert_ne!(a.seeds, b.seeds);
    }
}
