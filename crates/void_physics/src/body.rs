//! Rigid body types and the owning body handle

use crate::convert;
use crossbeam_channel::Sender;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};
use std::fmt;
use void_math::{Pose, Quat, Vec3};

/// Identity of a rigid body in the physics world.
///
/// This is a plain lookup key; ownership of the body is carried by
/// [`OwnedBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub(crate) rapier::RigidBodyHandle);

impl RigidBodyHandle {
    /// Create from raw Rapier handle
    pub fn from_raw(handle: rapier::RigidBodyHandle) -> Self {
        Self(handle)
    }

    /// Get the raw Rapier handle
    pub fn raw(&self) -> rapier::RigidBodyHandle {
        self.0
    }
}

/// Type of rigid body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RigidBodyType {
    /// Static body - never moves, infinite mass
    Static,
    /// Dynamic body - fully simulated
    #[default]
    Dynamic,
    /// Kinematic position-based - moved by user, affects dynamic bodies
    KinematicPositionBased,
    /// Kinematic velocity-based - velocity set by user
    KinematicVelocityBased,
}

impl From<RigidBodyType> for rapier::RigidBodyType {
    fn from(t: RigidBodyType) -> Self {
        match t {
            RigidBodyType::Static => rapier::RigidBodyType::Fixed,
            RigidBodyType::Dynamic => rapier::RigidBodyType::Dynamic,
            RigidBodyType::KinematicPositionBased => rapier::RigidBodyType::KinematicPositionBased,
            RigidBodyType::KinematicVelocityBased => rapier::RigidBodyType::KinematicVelocityBased,
        }
    }
}

impl From<rapier::RigidBodyType> for RigidBodyType {
    fn from(t: rapier::RigidBodyType) -> Self {
        match t {
            rapier::RigidBodyType::Fixed => RigidBodyType::Static,
            rapier::RigidBodyType::Dynamic => RigidBodyType::Dynamic,
            rapier::RigidBodyType::KinematicPositionBased => RigidBodyType::KinematicPositionBased,
            rapier::RigidBodyType::KinematicVelocityBased => RigidBodyType::KinematicVelocityBased,
        }
    }
}

/// Description for creating a rigid body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBodyDesc {
    /// Type of rigid body
    pub body_type: RigidBodyType,
    /// Initial position
    pub position: Vec3,
    /// Initial orientation
    pub orientation: Quat,
    /// Initial linear velocity
    pub linear_velocity: Vec3,
    /// Initial angular velocity
    pub angular_velocity: Vec3,
    /// Gravity scale (0 = no gravity, 1 = normal, 2 = double)
    pub gravity_scale: f32,
    /// Linear damping (air resistance)
    pub linear_damping: f32,
    /// Angular damping (rotational resistance)
    pub angular_damping: f32,
    /// Enable continuous collision detection
    pub ccd_enabled: bool,
    /// Can this body sleep when inactive
    pub can_sleep: bool,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            gravity_scale: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            ccd_enabled: false,
            can_sleep: true,
        }
    }
}

impl RigidBodyDesc {
    /// Create a static body description
    pub fn fixed() -> Self {
        Self {
            body_type: RigidBodyType::Static,
            ..Default::default()
        }
    }

    /// Create a dynamic body description
    pub fn dynamic() -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            ..Default::default()
        }
    }

    /// Set position
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    /// Set position and orientation
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.position = pose.position;
        self.orientation = pose.orientation;
        self
    }

    /// Set linear velocity
    pub fn with_linear_velocity(mut self, x: f32, y: f32, z: f32) -> Self {
        self.linear_velocity = Vec3::new(x, y, z);
        self
    }

    /// Set gravity scale
    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Enable CCD
    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd_enabled = enabled;
        self
    }

    /// Build a Rapier rigid body builder
    pub(crate) fn to_rapier_builder(&self) -> rapier::RigidBodyBuilder {
        rapier::RigidBodyBuilder::new(self.body_type.into())
            .position(convert::to_isometry(&Pose::new(self.position, self.orientation)))
            .linvel(convert::to_vector(self.linear_velocity))
            .angvel(convert::to_vector(self.angular_velocity))
            .gravity_scale(self.gravity_scale)
            .linear_damping(self.linear_damping)
            .angular_damping(self.angular_damping)
            .ccd_enabled(self.ccd_enabled)
            .can_sleep(self.can_sleep)
    }
}

/// Exclusive owner of a rigid body in the physics world.
///
/// Only [`crate::PhysicsWorld::create_body`] hands these out, so an
/// `OwnedBody` always refers to a body that was really created. It is neither
/// `Clone` nor `Copy`. Dropping it queues the body for removal; the world
/// removes queued bodies, together with their colliders, on its next
/// [`crate::PhysicsWorld::flush_releases`] or step. Release therefore happens
/// exactly once.
pub struct OwnedBody {
    handle: RigidBodyHandle,
    release: Sender<RigidBodyHandle>,
}

impl OwnedBody {
    pub(crate) fn new(handle: RigidBodyHandle, release: Sender<RigidBodyHandle>) -> Self {
        Self { handle, release }
    }

    /// Lookup key of the owned body
    pub fn handle(&self) -> RigidBodyHandle {
        self.handle
    }
}

impl Drop for OwnedBody {
    fn drop(&mut self) {
        // The world may already be gone, in which case so is the body.
        let _ = self.release.send(self.handle);
    }
}

impl fmt::Debug for OwnedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedBody").field(&self.handle).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_type_roundtrip() {
        for t in [
            RigidBodyType::Static,
            RigidBodyType::Dynamic,
            RigidBodyType::KinematicPositionBased,
            RigidBodyType::KinematicVelocityBased,
        ] {
            assert_eq!(RigidBodyType::from(rapier::RigidBodyType::from(t)), t);
        }
    }

    #[test]
    fn test_drop_queues_release_once() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = RigidBodyHandle(rapier::RigidBodyHandle::from_raw_parts(3, 0));
        let body = OwnedBody::new(handle, tx);
        assert!(rx.try_recv().is_err());
        drop(body);
        assert_eq!(rx.try_recv().ok(), Some(handle));
        assert!(rx.try_recv().is_err());
    }
}
