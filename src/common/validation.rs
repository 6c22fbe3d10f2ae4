//! Parameter bounds checking shared by all sketch constructors

use crate::common::{Result, SketchError};

/// Maximum table dimension per axis (2^26 cells)
pub const MAX_DIM: usize = 1 << 26;

/// Validate that a value is a valid probability (0.0 < p < 1.0)
///
/// Used for epsilon (error bound), delta (failure probability), and
/// gamma (lossy decay rate).
pub fn validate_probability(value: f64, param_name: &str) -> Result<()> {
    if !(0.0 < value && value < 1.0) {
        return Err(SketchError::InvalidParameter {
            param: param_name.to_string(),
            value: value.to_string(),
            constraint: "must be in range (0.0, 1.0) (exclusive)".to_string(),
        });
    }
    Ok(())
}

/// Validate table dimensions
pub fn validate_width_depth(width: usize, depth: usize) -> Result<()> {
    if width == 0 || width > MAX_DIM {
        return Err(SketchError::InvalidParameter {
            param: "width".to_string(),
            value: width.to_string(),
            constraint: format!("must be in range [1, {}]", MAX_DIM),
        });
    }
    if depth == 0 || depth > MAX_DIM {
        return Err(SketchError::InvalidParameter {
            param: "depth".to_string(),
            value: depth.to_string(),
            constraint: format!("must be in range [1, {}]", MAX_DIM),
        });
    }
    Ok(())
}

/// Validate a lossy decay rate (0.0 < γ < 1.0)
pub fn validate_decay_rate(gamma: f64) -> Result<()> {
    validate_probability(gamma, "gamma")
}

/// Validate a heavy-hitter capacity
pub fn validate_top_n(n: usize) -> Result<()> {
    if n == 0 {
        return Err(SketchError::InvalidParameter {
            param: "n".to_string(),
            value: n.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}
