//! Double hashing: d rows from two base digests

use super::IndexScheme;
use crate::common::hash::{digest64, mix64};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::hash::Hash;

/// Modulus for the hash-pair family: the Mersenne prime 2^61 − 1
pub const MERSENNE_PRIME_61: u64 = (1 << 61) - 1;

/// Two base hashes synthesizing one hash per row
///
/// An item is digested twice, A and B in `[0, P)` with P = 2^61 − 1; row
/// r's column is `((A + r·B) mod P) mod w`. This preserves the Count-Min
/// guarantees within constant factors (Kirsch & Mitzenmacher, 2006) while
/// computing two digests per item instead of d, and it makes the flat
/// cell offset `r·w + col` a pure function of (A, B, r) — the property
/// the bit-packed backing and the least-squares estimator rely on.
#[derive(Debug, Clone)]
pub struct HashPair {
    a_seed: u64,
    b_seed: u64,
    depth: usize,
    width: usize,
}

impl HashPair {
    /// Draws a fresh base-seed pair
    pub fn new(depth: usize, width: usize) -> Self {
        let mut rng = rand::rng();
        HashPair {
            a_seed: rng.random(),
            b_seed: rng.random(),
            depth,
            width,
        }
    }

    /// Derives the base-seed pair deterministically from a master seed
    pub fn with_seed(depth: usize, width: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(mix64(seed));
        HashPair {
            a_seed: rng.random(),
            b_seed: rng.random(),
            depth,
            width,
        }
    }
}

impl IndexScheme for HashPair {
    fn depth(&self) -> usize {
        self.depth
    }

    fn width(&self) -> usize {
        self.width
    }

    fn fill_indices<T: Hash + ?Sized>(&self, item: &T, out: &mut Vec<usize>) {
        let a = digest64(item, self.a_seed) % MERSENNE_PRIME_61;
        let mut b = digest64(item, self.b_seed) % MERSENNE_PRIME_61;
        // A zero step would collapse every row onto one column.
        if b == 0 {
            b = 1;
        }

        let prime = u128::from(MERSENNE_PRIME_61);
        let width = self.width as u64;
        for row in 0..self.depth {
            let mixed = (u128::from(a) + u128::from(row as u64) * u128::from(b)) % prime;
            out.push((mixed as u64 % width) as usize);
        }
    }
}
