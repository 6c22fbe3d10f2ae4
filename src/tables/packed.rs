//! Bit-packed table backing

use super::SketchTable;
use crate::common::{Result, SketchError};

/// Cell width used by the generic constructor
pub const DEFAULT_CELL_BITS: u32 = 32;

/// Bit-packed table: every cell occupies a fixed number of bits in one
/// contiguous buffer
///
/// With [`with_max_count`](PackedTable::with_max_count) the cell width is
/// ⌈log2(max_count + 1)⌉ bits, so a table expected to hold counts up to
/// 1000 spends 10 bits per cell instead of 32. Increments clamp at
/// 2^bits − 1. Cells may straddle word boundaries; reads and writes
/// handle the split.
#[derive(Debug, Clone)]
pub struct PackedTable {
    words: Vec<u64>,
    depth: usize,
    width: usize,
    bits: u32,
    max_value: u64,
}

impl PackedTable {
    /// Allocates a table whose cells are just wide enough to hold
    /// `max_count`
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `max_count` is zero.
    pub fn with_max_count(depth: usize, width: usize, max_count: u64) -> Result<Self> {
        if max_count == 0 {
            return Err(SketchError::InvalidParameter {
                param: "max_count".to_string(),
                value: max_count.to_string(),
                constraint: "must be greater than 0".to_string(),
            });
        }
        let bits = 64 - max_count.leading_zeros();
        Ok(Self::with_cell_bits(depth, width, bits))
    }

    /// Bits per cell
    pub fn cell_bits(&self) -> u32 {
        self.bits
    }

    /// Largest value a cell can hold (2^bits − 1)
    pub fn max_value(&self) -> u64 {
        self.max_value
    }

    fn with_cell_bits(depth: usize, width: usize, bits: u32) -> Self {
        debug_assert!((1..=64).contains(&bits));
        let total_bits = depth * width * bits as usize;
        let max_value = if bits == 64 {
            u64::MAX
        } else {
            (1u64 << bits) - 1
        };
        PackedTable {
            words: vec![0u64; total_bits.div_ceil(64)],
            depth,
            width,
            bits,
            max_value,
        }
    }

    #[inline]
    fn bit_offset(&self, row: usize, col: usize) -> usize {
        assert!(row < self.depth && col < self.width);
        (row * self.width + col) * self.bits as usize
    }
}

impl SketchTable for PackedTable {
    fn with_shape(depth: usize, width: usize) -> Self {
        Self::with_cell_bits(depth, width, DEFAULT_CELL_BITS)
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn width(&self) -> usize {
        self.width
    }

    fn get(&self, row: usize, col: usize) -> u64 {
        let offset = self.bit_offset(row, col);
        let word = offset / 64;
        let shift = offset % 64;
        let bits = self.bits as usize;

        let low = self.words[word] >> shift;
        if shift + bits <= 64 {
            low & self.max_value
        } else {
            // Cell straddles a word boundary; shift is nonzero here.
            let high = self.words[word + 1] << (64 - shift);
            (low | high) & self.max_value
        }
    }

    fn set(&mut self, row: usize, col: usize, value: u64) {
        let value = value.min(self.max_value);
        let offset = self.bit_offset(row, col);
        let word = offset / 64;
        let shift = offset % 64;
        let bits = self.bits as usize;

        self.words[word] &= !(self.max_value << shift);
        self.words[word] |= value << shift;
        if shift + bits > 64 {
            let spill = 64 - shift;
            self.words[word + 1] &= !(self.max_value >> spill);
            self.words[word + 1] |= value >> spill;
        }
    }

    fn add(&mut self, row: usize, col: usize, delta: u64) -> u64 {
        let new = self
            .get(row, col)
            .saturating_add(delta)
            .min(self.max_value);
        self.set(row, col, new);
        new
    }

    fn clear(&mut self) {
        self.words.fill(0);
    }
}
