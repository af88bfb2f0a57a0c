//! Math utilities and types
//!
//! Provides the vector and matrix types the collision code is written against,
//! plus the scalar helpers used for epsilon comparisons.

pub use nalgebra::{Matrix3, Quaternion, Unit, Vector3};
use thiserror::Error;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type (columns are basis vectors)
pub type Mat3 = Matrix3<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Tolerance used by the `near_zero` and `approx_equal` helpers
pub const EPSILON: f32 = 1e-6;

/// Errors raised by checked numeric operations
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MathError {
    /// Matrix determinant is too close to zero to invert
    #[error("Singular matrix: determinant {0} is near zero")]
    SingularMatrix(f32),

    /// Divisor is too close to zero
    #[error("Division by near-zero value {0}")]
    DivisionByZero(f32),
}

/// True if `value` is within [`EPSILON`] of zero
#[inline]
pub fn near_zero(value: f32) -> bool {
    value.abs() <= EPSILON
}

/// Compare two scalars with a tolerance scaled by their magnitude
#[inline]
pub fn approx_equal(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() <= tolerance * 1.0_f32.max(a.abs()).max(b.abs())
}

/// Clamp a value between min and max
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min { min } else if value > max { max } else { value }
}

/// Divide, reporting a near-zero divisor instead of producing `inf`/`NaN`
pub fn safe_div(numerator: f32, denominator: f32) -> Result<f32, MathError> {
    if near_zero(denominator) {
        return Err(MathError::DivisionByZero(denominator));
    }
    Ok(numerator / denominator)
}

/// Invert a 3x3 matrix, reporting a singular matrix as an error
pub fn safe_inverse(matrix: &Mat3) -> Result<Mat3, MathError> {
    let determinant = matrix.determinant();
    if near_zero(determinant) {
        return Err(MathError::SingularMatrix(determinant));
    }
    matrix
        .try_inverse()
        .ok_or(MathError::SingularMatrix(determinant))
}

/// Column `index` of an orientation matrix
///
/// # Panics
///
/// Panics if `index` is not 0, 1 or 2.
#[inline]
pub fn axis(matrix: &Mat3, index: usize) -> Vec3 {
    assert!(index < 3, "axis index {index} out of range (expected < 3)");
    matrix.column(index).into_owned()
}

/// Component-wise minimum of two vectors
#[inline]
pub fn component_min(a: &Vec3, b: &Vec3) -> Vec3 {
    a.inf(b)
}

/// Component-wise maximum of two vectors
#[inline]
pub fn component_max(a: &Vec3, b: &Vec3) -> Vec3 {
    a.sup(b)
}
