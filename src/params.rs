//! Sketch parameter derivation and configuration
//!
//! A Count-Min table is shaped by an error bound ε and a failure
//! probability δ: estimates exceed the true count by at most ε·N with
//! probability at least 1 − δ, where N is the total stream weight. The
//! standard derivation (Cormode & Muthukrishnan, 2003) is
//! w = ⌈e/ε⌉ columns and d = ⌈ln(1/δ)⌉ rows.

use crate::common::{validation, Result};
use crate::lossy::LossyStrategy;
use crate::update::UpdateStrategy;

/// Default heavy-hitter capacity when none is configured
pub const DEFAULT_TOP_N: usize = 20;

/// Table shape together with the accuracy guarantees it encodes
///
/// Parameters can be supplied either as probabilities (ε, δ) or as an
/// explicit shape (width, depth); the other pair is derived so both views
/// are always available.
///
/// # Examples
/// ```
/// use minsketch::SketchParams;
///
/// let params = SketchParams::from_error_bounds(0.01, 0.01).unwrap();
/// assert_eq!(params.width(), 272); // ⌈e / 0.01⌉
/// assert_eq!(params.depth(), 5);   // ⌈ln 100⌉
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchParams {
    epsilon: f64,
    delta: f64,
    width: usize,
    depth: usize,
}

impl SketchParams {
    /// Derives a table shape from an error bound and a failure probability
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `epsilon` or `delta` is outside (0, 1),
    /// or if the derived width exceeds the dimension cap.
    pub fn from_error_bounds(epsilon: f64, delta: f64) -> Result<Self> {
        validation::validate_probability(epsilon, "epsilon")?;
        validation::validate_probability(delta, "delta")?;

        let width = ((std::f64::consts::E / epsilon).ceil() as usize).max(2);
        let depth = (((1.0 / delta).ln()).ceil() as usize).max(1);
        validation::validate_width_depth(width, depth)?;

        Ok(SketchParams {
            epsilon,
            delta,
            width,
            depth,
        })
    }

    /// Builds parameters from an explicit shape, deriving ε = e/w and δ = e^(−d)
    ///
    /// # Errors
    /// Returns `InvalidParameter` if either dimension is zero or above the cap.
    pub fn from_dimensions(width: usize, depth: usize) -> Result<Self> {
        validation::validate_width_depth(width, depth)?;

        let epsilon = std::f64::consts::E / width as f64;
        let delta = (-(depth as f64)).exp();

        Ok(SketchParams {
            epsilon,
            delta,
            width,
            depth,
        })
    }

    /// Error bound ε
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Failure probability δ
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Columns per row
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows (independent hash functions)
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Configuration for any sketch variant
///
/// Carries the knobs that are orthogonal to the variant itself: the table
/// shape (via error bounds or explicit dimensions), the heavy-hitter
/// capacity, the update strategy, an optional lossy decay strategy, and an
/// optional master seed for reproducible hashing. Setters are chainable;
/// validation happens when a sketch resolves the configuration.
///
/// # Examples
/// ```
/// use minsketch::{FrequencySketch, SketchConfig, TopNCountMinSketch, UpdateStrategy};
///
/// let config = SketchConfig::from_error_bounds(0.01, 0.01)
///     .top_n(10)
///     .update_strategy(UpdateStrategy::Conservative)
///     .seed(42);
/// let sketch: TopNCountMinSketch<String> = TopNCountMinSketch::with_config(config).unwrap();
/// assert_eq!(sketch.depth(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct SketchConfig {
    shape: Shape,
    top_n: usize,
    update: UpdateStrategy,
    lossy: Option<LossyStrategy>,
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    ErrorBounds { epsilon: f64, delta: f64 },
    Dimensions { width: usize, depth: usize },
}

impl SketchConfig {
    /// Configuration shaped by an error bound and a failure probability
    pub fn from_error_bounds(epsilon: f64, delta: f64) -> Self {
        SketchConfig {
            shape: Shape::ErrorBounds { epsilon, delta },
            top_n: DEFAULT_TOP_N,
            update: UpdateStrategy::Baseline,
            lossy: None,
            seed: None,
        }
    }

    /// Configuration shaped by explicit table dimensions
    pub fn from_dimensions(width: usize, depth: usize) -> Self {
        SketchConfig {
            shape: Shape::Dimensions { width, depth },
            top_n: DEFAULT_TOP_N,
            update: UpdateStrategy::Baseline,
            lossy: None,
            seed: None,
        }
    }

    /// Sets the heavy-hitter capacity (default 20)
    #[must_use]
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    /// Sets the update strategy (default baseline)
    #[must_use]
    pub fn update_strategy(mut self, update: UpdateStrategy) -> Self {
        self.update = update;
        self
    }

    /// Enables lossy decay
    #[must_use]
    pub fn lossy(mut self, lossy: LossyStrategy) -> Self {
        self.lossy = Some(lossy);
        self
    }

    /// Fixes the master hash seed, making the sketch fully reproducible
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration and derives the table shape
    pub(crate) fn resolve(self) -> Result<ResolvedConfig> {
        let params = match self.shape {
            Shape::ErrorBounds { epsilon, delta } => SketchParams::from_error_bounds(epsilon, delta),
            Shape::Dimensions { width, depth } => SketchParams::from_dimensions(width, depth),
        }?;
        validation::validate_top_n(self.top_n)?;

        Ok(ResolvedConfig {
            params,
            top_n: self.top_n,
            update: self.update,
            lossy: self.lossy,
            seed: self.seed,
        })
    }
}

/// A validated configuration, ready to construct a sketch from
pub(crate) struct ResolvedConfig {
    pub(crate) params: SketchParams,
    pub(crate) top_n: usize,
    pub(crate) update: UpdateStrategy,
    pub(crate) lossy: Option<LossyStrategy>,
    pub(crate) seed: Option<u64>,
}
