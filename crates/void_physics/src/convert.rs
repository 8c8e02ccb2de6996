//! Conversions between `void_math` types and Rapier/nalgebra types
//!
//! Rapier stores quaternions as `(w, i, j, k)`; `Quat` is `(x, y, z, w)`.

use crate::error::{PhysicsError, Result};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::parry::bounding_volume::Aabb;
use rapier3d::prelude as rapier;
use void_math::{Pose, Quat, Vec3, AABB};

#[inline]
pub fn to_vector(v: Vec3) -> rapier::Vector<f32> {
    rapier::Vector::new(v.x, v.y, v.z)
}

#[inline]
pub fn from_vector(v: &rapier::Vector<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[inline]
pub fn from_point(p: &rapier::Point<f32>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

/// Host quaternion to a unit quaternion (renormalized)
#[inline]
pub fn to_rotation(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

#[inline]
pub fn from_rotation(r: &UnitQuaternion<f32>) -> Quat {
    Quat::new(r.i, r.j, r.k, r.w)
}

pub fn to_isometry(pose: &Pose) -> rapier::Isometry<f32> {
    rapier::Isometry::from_parts(
        rapier::Translation::new(pose.position.x, pose.position.y, pose.position.z),
        to_rotation(pose.orientation),
    )
}

/// Like [`to_isometry`], but rejects poses that would put NaN into the engine:
/// non-finite components or a quaternion too short to normalize.
pub fn try_to_isometry(pose: &Pose) -> Result<rapier::Isometry<f32>> {
    if !pose.position.is_finite() {
        return Err(PhysicsError::InvalidPose(format!(
            "non-finite position {:?}",
            pose.position
        )));
    }
    if !pose.orientation.is_finite() || pose.orientation.length_squared() < f32::EPSILON {
        return Err(PhysicsError::InvalidPose(format!(
            "degenerate orientation {:?}",
            pose.orientation
        )));
    }
    Ok(to_isometry(pose))
}

pub fn from_isometry(iso: &rapier::Isometry<f32>) -> Pose {
    Pose::new(from_vector(&iso.translation.vector), from_rotation(&iso.rotation))
}

pub fn from_aabb(aabb: &Aabb) -> AABB {
    AABB::new(from_point(&aabb.mins), from_point(&aabb.maxs))
}
