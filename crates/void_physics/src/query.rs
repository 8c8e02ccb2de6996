//! Overlap queries against the physics world

use crate::collider::{ColliderHandle, ColliderShape};
use crate::convert;
use crate::error::{PhysicsError, Result};
use crate::filter::IgnoreSet;
use rapier3d::parry::shape::Shape;
use rapier3d::prelude as rapier;
use void_math::Pose;

/// Which kinds of world geometry a query looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryScope {
    /// Colliders on fixed bodies (and free colliders)
    pub fixed: bool,
    /// Colliders on kinematic bodies
    pub kinematic: bool,
    /// Colliders on dynamic bodies
    pub dynamic: bool,
    /// Sensor colliders
    pub sensors: bool,
}

impl QueryScope {
    /// Every solid collider, static or moving
    pub const SOLID: Self = Self {
        fixed: true,
        kinematic: true,
        dynamic: true,
        sensors: false,
    };

    /// Only static geometry
    pub const STATIC: Self = Self {
        fixed: true,
        kinematic: false,
        dynamic: false,
        sensors: false,
    };

    /// Set whether sensors are reported
    pub fn with_sensors(mut self, sensors: bool) -> Self {
        self.sensors = sensors;
        self
    }

    fn apply<'a>(&self, mut filter: rapier::QueryFilter<'a>) -> rapier::QueryFilter<'a> {
        if !self.fixed {
            filter.flags |= rapier::QueryFilterFlags::EXCLUDE_FIXED;
        }
        if !self.kinematic {
            filter.flags |= rapier::QueryFilterFlags::EXCLUDE_KINEMATIC;
        }
        if !self.dynamic {
            filter.flags |= rapier::QueryFilterFlags::EXCLUDE_DYNAMIC;
        }
        if !self.sensors {
            filter = filter.exclude_sensors();
        }
        filter
    }
}

impl Default for QueryScope {
    fn default() -> Self {
        Self::SOLID
    }
}

/// Query interface for physics world.
///
/// Queries are reads: nothing here mutates bodies, colliders or the
/// acceleration structure.
pub struct PhysicsQuery<'a> {
    pub(crate) query_pipeline: &'a rapier::QueryPipeline,
    pub(crate) colliders: &'a rapier::ColliderSet,
    pub(crate) bodies: &'a rapier::RigidBodySet,
}

impl<'a> PhysicsQuery<'a> {
    /// First collider overlapping `shape` at `pose`, if any
    pub fn overlap_any(
        &self,
        shape: &dyn Shape,
        pose: &rapier::Isometry<f32>,
        scope: QueryScope,
        ignore: &IgnoreSet,
    ) -> Option<ColliderHandle> {
        let predicate =
            |handle: rapier::ColliderHandle, _: &rapier::Collider| !ignore.contains(ColliderHandle(handle));
        let filter = scope.apply(rapier::QueryFilter::new()).predicate(&predicate);

        self.query_pipeline
            .intersection_with_shape(self.bodies, self.colliders, pose, shape, filter)
            .map(ColliderHandle)
    }

    /// First collider overlapping one of a body's colliders.
    ///
    /// The collider's shape is placed at `body_pose` composed with its offset
    /// from the body, so this answers "would this shape collide if the body
    /// stood at `body_pose`" regardless of where the body currently is.
    pub fn collider_overlap_any(
        &self,
        collider: ColliderHandle,
        body_pose: &rapier::Isometry<f32>,
        scope: QueryScope,
        ignore: &IgnoreSet,
    ) -> Result<Option<ColliderHandle>> {
        let co = self
            .colliders
            .get(collider.0)
            .ok_or(PhysicsError::ColliderNotFound(collider))?;
        let pose = match co.position_wrt_parent() {
            Some(local) => body_pose * local,
            None => *co.position(),
        };
        Ok(self.overlap_any(co.shape(), &pose, scope, ignore))
    }

    /// All colliders that overlap a shape at a pose
    pub fn overlapping(
        &self,
        shape: &ColliderShape,
        pose: &Pose,
        scope: QueryScope,
        ignore: &IgnoreSet,
    ) -> Result<Vec<ColliderHandle>> {
        let rapier_shape = shape.to_rapier()?;
        let pos = convert::to_isometry(pose);
        let predicate =
            |handle: rapier::ColliderHandle, _: &rapier::Collider| !ignore.contains(ColliderHandle(handle));
        let filter = scope.apply(rapier::QueryFilter::new()).predicate(&predicate);

        let mut results = Vec::new();
        self.query_pipeline.intersections_with_shape(
            self.bodies,
            self.colliders,
            &pos,
            rapier_shape.as_ref(),
            filter,
            |handle| {
                results.push(ColliderHandle(handle));
                true // Continue
            },
        );

        Ok(results)
    }
}
