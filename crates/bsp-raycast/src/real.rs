//! Scalar precision and the tolerances that depend on it.

/// Floating point type used for positions, directions and distances.
#[cfg(not(feature = "double-precision"))]
pub type Real = f32;

/// Floating point type used for positions, directions and distances.
#[cfg(feature = "double-precision")]
pub type Real = f64;

/// Tolerance for scene-bounds inflation, ray range widening and on-plane
/// detection during traversal.
#[cfg(not(feature = "double-precision"))]
pub const VECTOR_EPSILON: Real = 1e-5;

/// Tolerance for scene-bounds inflation, ray range widening and on-plane
/// detection during traversal.
#[cfg(feature = "double-precision")]
pub const VECTOR_EPSILON: Real = 1e-10;

/// Tolerance on the determinant and barycentric range of the leaf-level
/// ray/triangle test.
#[cfg(not(feature = "double-precision"))]
pub const TRIANGLE_EPSILON: Real = 1e-6;

/// Tolerance on the determinant and barycentric range of the leaf-level
/// ray/triangle test.
#[cfg(feature = "double-precision")]
pub const TRIANGLE_EPSILON: Real = 1e-12;
