//! Single-body physics model
//!
//! Binds one rigid body to one embodied entity. The entity's origin anchor is
//! the logical pose; the rigid body is its physical stand-in. Moves requested
//! by motion logic are tried on the body first and only kept when the body
//! does not overlap anything but itself and the ground.

use crate::body::OwnedBody;
use crate::convert;
use crate::error::Result;
use crate::filter::IgnoreSet;
use crate::kinematic::KinematicGuard;
use crate::model::{update_entity_status_generic, AnchorMethods, MoveOutcome, PhysicsModel};
use crate::query::QueryScope;
use crate::world::PhysicsWorld;
use void_entity::{Anchor, SharedEntity, ORIGIN_ANCHOR_INDEX};
use void_math::{Pose, Quat, Vec3, AABB};

/// A physics model made of exactly one rigid body
pub struct SingleBodyModel {
    entity: SharedEntity,
    body: OwnedBody,
    dynamic: bool,
    bounding_box: AABB,
    anchor_methods: AnchorMethods<Self>,
}

impl SingleBodyModel {
    /// Bind an entity to a body.
    ///
    /// The model takes ownership of the body; it is released when the model
    /// is dropped.
    pub fn bind(world: &PhysicsWorld, entity: SharedEntity, body: OwnedBody) -> Result<Self> {
        let dynamic = world.is_dynamic(body.handle())?;

        let mut anchor_methods = AnchorMethods::new();
        anchor_methods.register(ORIGIN_ANCHOR_INDEX, Self::update_origin_anchor);

        let mut model = Self {
            entity,
            body,
            dynamic,
            bounding_box: AABB::EMPTY,
            anchor_methods,
        };
        model.calculate_bounding_box(world)?;

        log::debug!(
            "Bound entity {} to {} body {:?}",
            model.entity.read().id(),
            if dynamic { "dynamic" } else { "static" },
            model.body.handle()
        );
        Ok(model)
    }

    /// The owned body
    pub fn body(&self) -> &OwnedBody {
        &self.body
    }

    /// Whether the body is simulated; static bodies ignore moves and resets
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Copy the body's engine pose into the origin anchor
    pub fn update_origin_anchor(&self, world: &PhysicsWorld, anchor: &mut Anchor) -> Result<()> {
        anchor.set_pose(world.body_pose(self.body.handle())?);
        Ok(())
    }
}

impl PhysicsModel for SingleBodyModel {
    fn entity(&self) -> &SharedEntity {
        &self.entity
    }

    fn anchor_methods(&self) -> &AnchorMethods<Self> {
        &self.anchor_methods
    }

    fn bounding_box(&self) -> &AABB {
        &self.bounding_box
    }

    fn calculate_bounding_box(&mut self, world: &PhysicsWorld) -> Result<()> {
        self.bounding_box = world.body_world_bounds(self.body.handle())?;
        Ok(())
    }

    fn reset(&mut self, world: &mut PhysicsWorld) -> Result<()> {
        if !self.dynamic {
            return Ok(());
        }
        let handle = self.body.handle();
        let pose = self.entity.read().pose();

        {
            let mut guard = KinematicGuard::enter(world, handle)?;
            guard.set_body_pose(handle, &pose)?;
        }
        world.clear_forces(handle)?;
        world.clear_velocities(handle)?;
        self.calculate_bounding_box(world)?;

        log::debug!("Reset body {:?} to {:?}", handle, pose.position);
        Ok(())
    }

    fn move_to(
        &mut self,
        world: &mut PhysicsWorld,
        position: Vec3,
        orientation: Quat,
        check_only: bool,
    ) -> Result<MoveOutcome> {
        if !self.dynamic {
            return Ok(MoveOutcome::Immovable);
        }
        let handle = self.body.handle();
        let candidate = convert::try_to_isometry(&Pose::new(position, orientation))?;
        let previous = world.body_isometry(handle)?;

        // The pre-check places the shapes itself and ignores the body's own
        // colliders, so the query structure is only refreshed for a kept pose.
        let colliding = {
            let mut guard = KinematicGuard::enter(world, handle)?;
            guard.place_body(handle, candidate)?;

            let colliding = match self.is_colliding_with_something(&guard) {
                Ok(colliding) => colliding,
                Err(e) => {
                    guard.place_body(handle, previous)?;
                    return Err(e);
                }
            };
            if check_only || colliding {
                guard.place_body(handle, previous)?;
            } else {
                guard.refresh_body(handle)?;
            }
            colliding
        };

        let outcome = MoveOutcome::new(colliding, check_only);
        match outcome {
            MoveOutcome::Accepted => {
                self.update_entity_status(world)?;
                log::trace!("Moved body {:?} to {:?}", handle, position);
            }
            MoveOutcome::Blocked => {
                log::debug!("Move of body {:?} to {:?} blocked", handle, position);
            }
            _ => {}
        }
        Ok(outcome)
    }

    fn is_colliding_with_something(&self, world: &PhysicsWorld) -> Result<bool> {
        let handle = self.body.handle();
        let shapes = world.body_colliders(handle)?;

        let mut ignore = IgnoreSet::with_capacity(shapes.len() + 1);
        ignore.extend(world.ground_collider());
        ignore.extend(shapes.iter().copied());

        let scope = QueryScope::SOLID.with_sensors(world.config().query_sensors);
        let pose = world.body_isometry(handle)?;
        let query = world.query();
        for shape in shapes {
            if let Some(hit) = query.collider_overlap_any(shape, &pose, scope, &ignore)? {
                log::trace!("Body {:?} overlaps {:?}", handle, hit);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn update_entity_status(&mut self, world: &PhysicsWorld) -> Result<()> {
        if !self.dynamic {
            return Ok(());
        }
        update_entity_status_generic(self, world)
    }
}

impl std::fmt::Debug for SingleBodyModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleBodyModel")
            .field("body", &self.body)
            .field("dynamic", &self.dynamic)
            .field("bounding_box", &self.bounding_box)
            .finish_non_exhaustive()
    }
}
