//! Per-step driver for physics models

use crate::body::{RigidBodyDesc, RigidBodyHandle};
use crate::collider::{ColliderDesc, ColliderHandle};
use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, Result};
use crate::events::CollisionEvent;
use crate::model::{MoveOutcome, PhysicsModel};
use crate::single_body::SingleBodyModel;
use crate::world::PhysicsWorld;
use std::collections::{BTreeMap, HashMap};
use void_entity::SharedEntity;
use void_math::{Quat, Vec3};

/// Identity of a model inside a [`PhysicsSimulation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u32);

impl ModelId {
    pub fn index(&self) -> u32 {
        self.0
    }
}

/// A collision event with both sides resolved to models where possible
#[derive(Debug, Clone)]
pub struct ModelCollision {
    pub event: CollisionEvent,
    /// Model owning the first collider
    pub model1: Option<ModelId>,
    /// Model owning the second collider
    pub model2: Option<ModelId>,
}

impl ModelCollision {
    pub fn involves(&self, model: ModelId) -> bool {
        self.model1 == Some(model) || self.model2 == Some(model)
    }
}

/// Owns the world and every model in it.
///
/// Each [`step`](Self::step) advances the world, then brings every model's
/// entity up to date with the engine.
pub struct PhysicsSimulation {
    world: PhysicsWorld,
    models: BTreeMap<ModelId, SingleBodyModel>,
    body_to_model: HashMap<RigidBodyHandle, ModelId>,
    next_id: u32,
    collisions: Vec<ModelCollision>,
}

impl PhysicsSimulation {
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        Ok(Self {
            world: PhysicsWorld::new(config)?,
            models: BTreeMap::new(),
            body_to_model: HashMap::new(),
            next_id: 0,
            collisions: Vec::new(),
        })
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    /// Create a body at the entity's pose and bind the two
    pub fn spawn(
        &mut self,
        entity: SharedEntity,
        desc: &RigidBodyDesc,
        colliders: &[ColliderDesc],
    ) -> Result<ModelId> {
        let pose = entity.read().pose();
        let body = self.world.create_body(&desc.clone().with_pose(pose), colliders)?;
        let model = SingleBodyModel::bind(&self.world, entity, body)?;
        Ok(self.add_model(model))
    }

    /// Take ownership of a bound model
    pub fn add_model(&mut self, model: SingleBodyModel) -> ModelId {
        let id = ModelId(self.next_id);
        self.next_id += 1;
        self.body_to_model.insert(model.body().handle(), id);
        self.models.insert(id, model);
        id
    }

    /// Remove a model; its body is released once the returned model is dropped
    pub fn remove_model(&mut self, id: ModelId) -> Option<SingleBodyModel> {
        let model = self.models.remove(&id)?;
        self.body_to_model.remove(&model.body().handle());
        log::debug!("Removed model {:?}", id);
        Some(model)
    }

    pub fn model(&self, id: ModelId) -> Option<&SingleBodyModel> {
        self.models.get(&id)
    }

    pub fn model_mut(&mut self, id: ModelId) -> Option<&mut SingleBodyModel> {
        self.models.get_mut(&id)
    }

    pub fn models(&self) -> impl Iterator<Item = (ModelId, &SingleBodyModel)> {
        self.models.iter().map(|(id, model)| (*id, model))
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Forward a move request to a model
    pub fn move_model(
        &mut self,
        id: ModelId,
        position: Vec3,
        orientation: Quat,
        check_only: bool,
    ) -> Result<MoveOutcome> {
        let model = self.models.get_mut(&id).ok_or(PhysicsError::ModelNotFound(id))?;
        model.move_to(&mut self.world, position, orientation, check_only)
    }

    /// Reset one model to its entity's pose
    pub fn reset_model(&mut self, id: ModelId) -> Result<()> {
        let model = self.models.get_mut(&id).ok_or(PhysicsError::ModelNotFound(id))?;
        model.reset(&mut self.world)
    }

    /// Reset every model to its entity's pose
    pub fn reset_models(&mut self) -> Result<()> {
        for model in self.models.values_mut() {
            model.reset(&mut self.world)?;
        }
        Ok(())
    }

    /// Advance the world and sync every entity
    pub fn step(&mut self, delta_time: f32) -> Result<()> {
        self.world.step(delta_time);

        for model in self.models.values_mut() {
            model.update_entity_status(&self.world)?;
        }

        self.collisions = self
            .world
            .collision_events()
            .iter()
            .map(|event| ModelCollision {
                event: event.clone(),
                model1: event.body1.and_then(|b| self.body_to_model.get(&b).copied()),
                model2: event.body2.and_then(|b| self.body_to_model.get(&b).copied()),
            })
            .collect();
        Ok(())
    }

    /// Model owning a body
    pub fn model_for_body(&self, body: RigidBodyHandle) -> Option<ModelId> {
        self.body_to_model.get(&body).copied()
    }

    /// Model owning the body a collider is attached to
    pub fn model_for_collider(&self, collider: ColliderHandle) -> Option<ModelId> {
        self.world
            .collider_parent(collider)
            .and_then(|body| self.model_for_body(body))
    }

    /// Collision events of the last step
    pub fn collisions(&self) -> &[ModelCollision] {
        &self.collisions
    }
}
