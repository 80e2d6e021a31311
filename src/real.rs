//! Scalar selection and robustness constants.
//!
//! The whole crate computes in a single real type, chosen at compile time:
//! `f64` by default, `f32` with the `f32` cargo feature. The tolerance
//! constants scale with the scalar width.

/// The floating-point type used throughout the crate.
#[cfg(not(feature = "f32"))]
pub type Real = f64;
/// The floating-point type used throughout the crate.
#[cfg(feature = "f32")]
pub type Real = f32;

#[cfg(not(feature = "f32"))]
pub(crate) type RVec3 = glam::DVec3;
#[cfg(feature = "f32")]
pub(crate) type RVec3 = glam::Vec3;

/// Half-width of the on-plane band: a vertex whose signed distance to a
/// cutting plane is within `TOL` is treated as lying on the plane.
#[cfg(not(feature = "f32"))]
pub const TOL: Real = 1e-11;
#[cfg(feature = "f32")]
pub const TOL: Real = 1e-5;

/// The marginal band. Verdicts for vertices within `TOL2` of the plane are
/// memoised for the duration of one cut so that re-testing the same vertex
/// can never flip its classification mid-cut.
pub const TOL2: Real = 2.0 * TOL;

/// Hard upper bound on the vertex count of a single cell. Exceeding it is a
/// fatal error rather than an allocation failure.
pub const MAX_VERTICES: usize = 1 << 16;
