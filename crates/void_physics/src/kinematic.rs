//! Scoped kinematic mode for direct pose writes

use crate::body::RigidBodyHandle;
use crate::error::Result;
use crate::world::PhysicsWorld;
use std::ops::{Deref, DerefMut};

/// Holds a dynamic body in kinematic mode for as long as it lives.
///
/// The body is switched back to dynamic mode when the guard drops, on every
/// exit path including `?` returns. The guard borrows the world mutably, so
/// it cannot be nested.
pub struct KinematicGuard<'w> {
    world: &'w mut PhysicsWorld,
    body: RigidBodyHandle,
}

impl<'w> KinematicGuard<'w> {
    /// Switch `body` to kinematic mode
    pub fn enter(world: &'w mut PhysicsWorld, body: RigidBodyHandle) -> Result<Self> {
        world.set_kinematic(body, true)?;
        Ok(Self { world, body })
    }

    /// The guarded body
    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }
}

impl Deref for KinematicGuard<'_> {
    type Target = PhysicsWorld;

    fn deref(&self) -> &Self::Target {
        self.world
    }
}

impl DerefMut for KinematicGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.world
    }
}

impl Drop for KinematicGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.world.set_kinematic(self.body, false) {
            log::warn!("Failed to restore dynamic mode on {:?}: {}", self.body, e);
        }
    }
}
