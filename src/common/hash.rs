//! Hash primitives for the sketch families
//!
//! Every scheme in this crate reduces an opaque `Hash` item to a stable
//! 64-bit digest under a seed, then maps digests to column indices. The
//! digest is `XxHash64`; independent hash functions are obtained by
//! varying the seed.

use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

/// Stable 64-bit digest of any hashable item under a seed
///
/// Two calls with the same item and seed always produce the same digest;
/// distinct seeds give (empirically) independent digests. This is the
/// building block for both the independent and the hash-pair schemes.
///
/// # Examples
/// ```
/// use minsketch::common::hash::digest64;
///
/// let a = digest64(&"item", 1);
/// let b = digest64(&"item", 1);
/// assert_eq!(a, b);
/// assert_ne!(digest64(&"item", 1), digest64(&"item", 2));
/// ```
#[inline]
pub fn digest64<T: Hash + ?Sized>(item: &T, seed: u64) -> u64 {
    let mut hasher = XxHash64::with_seed(seed);
    item.hash(&mut hasher);
    hasher.finish()
}

/// SplitMix64 finalizer
///
/// Used to derive a sequence of well-separated row seeds from a single
/// master seed, so a sketch seeded with one `u64` is fully reproducible.
#[inline]
pub fn mix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
