//! Lossy decay: periodic global decrement of the counter table
//!
//! Modeled after lossy counting (Manku & Motwani, 2002) as adapted to
//! Count-Min tables by Goyal & Daumé (2010): the stream is cut into
//! windows of W = ⌈1/γ⌉ inserts, and at every window boundary the whole
//! table is decremented by a threshold amount and clamped at zero. Rare
//! items fade out; heavy items keep their counters well above the
//! accumulated decrement.

use crate::common::{validation, Result};
use crate::tables::SketchTable;

/// Amount subtracted from every cell at a window boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Threshold {
    /// No decay; windows are still counted
    #[default]
    None,
    /// Subtract 1 per window
    One,
    /// Subtract the window size W per window
    WindowSize,
    /// Subtract ⌈√W⌉ per window
    SqrtWindowSize,
}

/// Windowed decay state for one sketch
///
/// Tracks the insert count and window index; the owning sketch asks it
/// after every insert whether a decay is due and applies the decrement to
/// its table via [`decay_table`].
#[derive(Debug, Clone, PartialEq)]
pub struct LossyStrategy {
    gamma: f64,
    window: u64,
    threshold: Threshold,
    inserted: u64,
    window_index: u64,
}

impl LossyStrategy {
    /// Creates a decay schedule with rate `gamma` and the given threshold
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `gamma` is outside (0, 1).
    pub fn new(gamma: f64, threshold: Threshold) -> Result<Self> {
        validation::validate_decay_rate(gamma)?;
        Ok(LossyStrategy {
            gamma,
            window: (1.0 / gamma).ceil() as u64,
            threshold,
            inserted: 0,
            window_index: 0,
        })
    }

    /// Decay rate γ
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Window size W = ⌈1/γ⌉
    pub fn window(&self) -> u64 {
        self.window
    }

    /// Windows completed so far
    pub fn window_index(&self) -> u64 {
        self.window_index
    }

    /// Records one insert; returns the decrement to apply if this insert
    /// closed a window
    pub(crate) fn record_insert(&mut self) -> Option<u64> {
        self.inserted += 1;
        if self.inserted % self.window != 0 {
            return None;
        }
        self.window_index += 1;
        let amount = self.decrement();
        (amount > 0).then_some(amount)
    }

    pub(crate) fn reset(&mut self) {
        self.inserted = 0;
        self.window_index = 0;
    }

    fn decrement(&self) -> u64 {
        match self.threshold {
            Threshold::None => 0,
            Threshold::One => 1,
            Threshold::WindowSize => self.window,
            Threshold::SqrtWindowSize => (self.window as f64).sqrt().ceil() as u64,
        }
    }
}

/// Subtracts `amount` from every cell, clamping at zero
pub(crate) fn decay_table<B: SketchTable>(table: &mut B, amount: u64) {
    for row in 0..table.depth() {
        for col in 0..table.width() {
            let value = table.get(row, col);
            if value > 0 {
                table.set(row, col, value.saturating_sub(amount));
            }
        }
    }
}
