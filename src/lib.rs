//! minsketch: Count-Min Sketch family for streaming frequency estimation
//!
//! Approximate frequency counting in sublinear memory: a sketch summarizes
//! a stream of items into a small counter table and answers point queries
//! (`get`) and heavy-hitter queries (`top`) with bounded overestimation.
//! The crate covers the classical Count-Min Sketch and its main refinements
//! as composable pieces:
//!
//! - counter tables with four storage backings, from unbounded-range rows
//!   to a bit-packed buffer ([`tables`])
//! - independent per-row hashing and the two-digest hash-pair scheme
//!   ([`hashing`])
//! - baseline and conservative update strategies ([`UpdateStrategy`])
//! - optional windowed lossy decay ([`LossyStrategy`])
//! - min, count-mean-min, least-squares, and exact-hybrid estimators
//!   ([`frequency`])
//!
//! # Example
//! ```
//! use minsketch::{FrequencySketch, TopNCountMinSketch};
//!
//! let mut sketch: TopNCountMinSketch<&str> = TopNCountMinSketch::new(0.001, 0.01).unwrap();
//! sketch.update(["to", "be", "or", "not", "to", "be"]);
//!
//! assert!(sketch.get(&"be") >= 2);
//! assert_eq!(sketch.top()[0].0, "to");
//! ```

pub mod common;
pub mod frequency;
pub mod hashing;
pub mod lossy;
pub mod params;
pub mod tables;
pub mod topn;
pub mod update;

pub use common::{Result, SketchError};
pub use frequency::{
    CountMeanMinSketch, FrequencySketch, HashPairCMSketch, HashPairCountMeanMinSketch,
    LeastSquaresSketch, MultiHashPairSketch, SketchCounterHybrid, TopNCountMinSketch,
};
pub use lossy::{LossyStrategy, Threshold};
pub use params::{SketchConfig, SketchParams, DEFAULT_TOP_N};
pub use tables::{ArrayTable, ListTable, MatrixTable, PackedTable, SketchTable};
pub use topn::TopNTracker;
pub use update::UpdateStrategy;
