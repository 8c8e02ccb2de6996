//! Physics models - the link between an embodied entity and its bodies
//!
//! A model owns the engine-side bodies of one entity. It answers two kinds of
//! requests: speculative moves from motion logic, and the per-step status
//! update that copies the engine's poses back into the entity's anchors.

use crate::error::Result;
use crate::world::PhysicsWorld;
use void_entity::{Anchor, SharedEntity};
use void_math::{Quat, Vec3, AABB};

/// Result of a [`PhysicsModel::move_to`] request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The body now stands at the requested pose
    Accepted,
    /// The requested pose collides; the body was left where it was
    Blocked,
    /// Check-only request, the pose is free
    CheckClear,
    /// Check-only request, the pose collides
    CheckBlocked,
    /// The body is static and cannot be moved
    Immovable,
}

impl MoveOutcome {
    /// Outcome of a move against a movable body
    pub fn new(colliding: bool, check_only: bool) -> Self {
        match (colliding, check_only) {
            (false, false) => Self::Accepted,
            (true, false) => Self::Blocked,
            (false, true) => Self::CheckClear,
            (true, true) => Self::CheckBlocked,
        }
    }

    /// Whether the requested pose was found free of collisions
    pub fn is_collision_free(&self) -> bool {
        matches!(self, Self::Accepted | Self::CheckClear)
    }

    /// Whether the body was actually moved
    pub fn is_applied(&self) -> bool {
        *self == Self::Accepted
    }
}

/// Copies engine state into one anchor of the model's entity
pub type AnchorMethod<M> = fn(&M, &PhysicsWorld, &mut Anchor) -> Result<()>;

/// Anchor index to update method
pub struct AnchorMethods<M> {
    methods: Vec<(usize, AnchorMethod<M>)>,
}

impl<M> AnchorMethods<M> {
    pub fn new() -> Self {
        Self { methods: Vec::new() }
    }

    /// Register the method for an anchor, replacing any previous one
    pub fn register(&mut self, anchor_index: usize, method: AnchorMethod<M>) {
        match self.methods.iter_mut().find(|(index, _)| *index == anchor_index) {
            Some(entry) => entry.1 = method,
            None => self.methods.push((anchor_index, method)),
        }
    }

    pub fn get(&self, anchor_index: usize) -> Option<AnchorMethod<M>> {
        self.methods
            .iter()
            .find(|(index, _)| *index == anchor_index)
            .map(|(_, method)| *method)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<M> Default for AnchorMethods<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Behaviour shared by all physics models
pub trait PhysicsModel: Sized {
    /// Entity this model moves
    fn entity(&self) -> &SharedEntity;

    /// Registered anchor update methods
    fn anchor_methods(&self) -> &AnchorMethods<Self>;

    /// Cached world bounds of the model
    fn bounding_box(&self) -> &AABB;

    /// Recompute the cached bounds from the engine
    fn calculate_bounding_box(&mut self, world: &PhysicsWorld) -> Result<()>;

    /// Put the bodies back at the entity's pose, at rest
    fn reset(&mut self, world: &mut PhysicsWorld) -> Result<()>;

    /// Try to place the model at a new pose.
    ///
    /// With `check_only` the pose is only tested and the model is left
    /// untouched. A colliding pose is never kept.
    fn move_to(
        &mut self,
        world: &mut PhysicsWorld,
        position: Vec3,
        orientation: Quat,
        check_only: bool,
    ) -> Result<MoveOutcome>;

    /// Whether the model currently overlaps any other geometry
    fn is_colliding_with_something(&self, world: &PhysicsWorld) -> Result<bool>;

    /// Bring the entity up to date with the engine
    fn update_entity_status(&mut self, world: &PhysicsWorld) -> Result<()> {
        update_entity_status_generic(self, world)
    }
}

/// Recompute the bounding box, then run every anchor method
pub fn update_entity_status_generic<M: PhysicsModel>(model: &mut M, world: &PhysicsWorld) -> Result<()> {
    model.calculate_bounding_box(world)?;
    update_anchors(model, world)
}

/// Run the registered method of every enabled anchor
pub fn update_anchors<M: PhysicsModel>(model: &M, world: &PhysicsWorld) -> Result<()> {
    let mut entity = model.entity().write();
    let enabled: Vec<usize> = entity.enabled_anchors().collect();
    for index in enabled {
        let Some(method) = model.anchor_methods().get(index) else {
            continue;
        };
        if let Some(anchor) = entity.anchor_mut(index) {
            method(model, world, anchor)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_table() {
        assert_eq!(MoveOutcome::new(false, false), MoveOutcome::Accepted);
        assert_eq!(MoveOutcome::new(true, false), MoveOutcome::Blocked);
        assert_eq!(MoveOutcome::new(false, true), MoveOutcome::CheckClear);
        assert_eq!(MoveOutcome::new(true, true), MoveOutcome::CheckBlocked);

        assert!(MoveOutcome::Accepted.is_collision_free());
        assert!(MoveOutcome::CheckClear.is_collision_free());
        assert!(!MoveOutcome::Blocked.is_collision_free());
        assert!(!MoveOutcome::CheckBlocked.is_collision_free());
        assert!(!MoveOutcome::Immovable.is_collision_free());

        assert!(MoveOutcome::Accepted.is_applied());
        assert!(!MoveOutcome::CheckClear.is_applied());
    }

    struct Dummy;

    fn first(_: &Dummy, _: &PhysicsWorld, _: &mut Anchor) -> Result<()> {
        Ok(())
    }

    fn second(_: &Dummy, _: &PhysicsWorld, anchor: &mut Anchor) -> Result<()> {
        anchor.position = Vec3::ONE;
        Ok(())
    }

    #[test]
    fn test_register_replaces() {
        let mut methods = AnchorMethods::<Dummy>::new();
        methods.register(0, first);
        methods.register(2, first);
        methods.register(0, second);
        assert_eq!(methods.len(), 2);
        assert!(methods.get(0).is_some());
        assert!(methods.get(1).is_none());
        assert!(methods.get(2).is_some());

        let world = PhysicsWorld::new(crate::config::PhysicsConfig::default()).unwrap();
        let mut entity = void_entity::EmbodiedEntity::new("dummy", Vec3::ZERO, Quat::IDENTITY);
        let method = methods.get(0).unwrap();
        method(&Dummy, &world, entity.origin_anchor_mut()).unwrap();
        assert_eq!(entity.origin_anchor().position, Vec3::ONE);
    }
}
