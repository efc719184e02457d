#![warn(missing_docs)]

//! Placement math for the cadex exchange-document builder.
//!
//! Thin wrappers around nalgebra providing the domain-specific types
//! needed to position assembly components: points, vectors, directions,
//! and rigid placements.

use nalgebra::{Isometry3, Translation3, Unit, UnitQuaternion, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A rigid placement: rotation followed by translation.
///
/// Positions a component instance relative to its parent in an assembly.
/// Unlike a general affine transform, a placement carries no scale or
/// shear, so its inverse always exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    iso: Isometry3<f64>,
}

impl Location {
    /// Identity placement.
    pub fn identity() -> Self {
        Self {
            iso: Isometry3::identity(),
        }
    }

    /// Pure translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            iso: Isometry3::translation(dx, dy, dz),
        }
    }

    /// Pure rotation about an axis through the origin by `angle` radians.
    pub fn rotation(axis: &Dir3, angle: f64) -> Self {
        Self {
            iso: Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(axis, angle),
            ),
        }
    }

    /// Rotation about `axis` by `angle` radians, then translation by `offset`.
    pub fn new(axis: &Dir3, angle: f64, offset: Vec3) -> Self {
        Self {
            iso: Isometry3::from_parts(
                Translation3::from(offset),
                UnitQuaternion::from_axis_angle(axis, angle),
            ),
        }
    }

    /// Whether this is the identity placement.
    pub fn is_identity(&self) -> bool {
        self.iso == Isometry3::identity()
    }

    /// Compose: `self` then `other` (self * other).
    pub fn then(&self, other: &Location) -> Self {
        Self {
            iso: self.iso * other.iso,
        }
    }

    /// Inverse placement.
    pub fn inverse(&self) -> Self {
        Self {
            iso: self.iso.inverse(),
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        self.iso * p
    }

    /// Transform a vector (rotation only, ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        self.iso.rotation * v
    }

    /// The translation component of this placement.
    pub fn translation_part(&self) -> Vec3 {
        self.iso.translation.vector
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::identity()
    }
}
