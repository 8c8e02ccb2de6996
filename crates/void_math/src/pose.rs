//! Rigid poses (position + orientation, no scale)

use crate::quaternion::Quat;
use crate::vector::Vec3;

/// Position and orientation of a rigid object in world space
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    #[inline]
    pub const fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }

    #[inline]
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Map a point from this pose's local frame into world space
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.orientation * local
    }

    /// Compose `self * local`: a pose expressed relative to `self`
    pub fn compose(&self, local: &Pose) -> Pose {
        Pose::new(
            self.transform_point(local.position),
            self.orientation * local.orientation,
        )
    }

    /// Approximate equality: positions within `epsilon`, rotations within `epsilon`
    pub fn approx_eq(&self, other: &Pose, epsilon: f32) -> bool {
        self.position.abs_diff_eq(other.position, epsilon)
            && self.orientation.same_rotation(other.orientation, epsilon)
    }
}
