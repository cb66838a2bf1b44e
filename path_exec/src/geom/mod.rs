//! # Geometry
//!
//! Planar value types used by the path model. Points and vectors are nalgebra's `Point2` and
//! `Vector2`, which already provide the add/subtract/scale/length algebra. The only addition is a
//! normalisation that degrades to zero for near-zero vectors instead of producing NaNs.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod bezier;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Point2, Vector2};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Vectors shorter than this normalise to the zero vector.
pub const MIN_UNIT_LENGTH: f64 = 1e-3;

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// A position in the plane, canvas pixels while editing and meters once converted.
pub type Point = Point2<f64>;

/// A displacement in the plane.
pub type Vector = Vector2<f64>;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

pub trait VectorExt {
    /// Unit vector in the same direction, or the zero vector if the length is below
    /// [`MIN_UNIT_LENGTH`].
    fn unit(&self) -> Vector;
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl VectorExt for Vector {
    fn unit(&self) -> Vector {
        let length = self.norm();

        if length < MIN_UNIT_LENGTH {
            Vector::zeros()
        } else {
            self / length
        }
    }
}
