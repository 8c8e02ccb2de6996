//! Void Physics - Rapier 3D backed physical models
//!
//! This crate keeps embodied entities and their rigid bodies in agreement.
//!
//! # Features
//!
//! - Single-body models bound to an [`void_entity::EmbodiedEntity`]
//! - Speculative moves with exact rollback on collision
//! - Collision pre-checks that ignore the body itself and the ground
//! - Per-step anchor synchronization from engine poses
//! - Collision events resolved back to models
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               PhysicsSimulation                  │
//! │  ┌───────────────┐  ┌─────────────────────────┐ │
//! │  │ ModelId table │  │ SingleBodyModel ...     │ │
//! │  └───────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌─────────────────────────────────────────────────┐
//! │                 PhysicsWorld                     │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────┐ │
//! │  │ RigidBodySet│  │ ColliderSet │  │ Queries │ │
//! │  └─────────────┘  └─────────────┘  └─────────┘ │
//! │  ┌─────────────────────────────────────────────┐│
//! │  │           PhysicsPipeline                   ││
//! │  │  (integration, collision, solver)          ││
//! │  └─────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use void_physics::prelude::*;
//! use void_entity::EmbodiedEntity;
//!
//! let mut sim = PhysicsSimulation::new(PhysicsConfig::default())?;
//!
//! let entity = EmbodiedEntity::new("crate", Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY).into_shared();
//! let id = sim.spawn(
//!     entity.clone(),
//!     &RigidBodyDesc::dynamic(),
//!     &[ColliderDesc::new(ColliderShape::cuboid(0.5, 0.5, 0.5))],
//! )?;
//!
//! // Test a pose without moving
//! let check = sim.move_model(id, Vec3::new(2.0, 1.0, 0.0), Quat::IDENTITY, true)?;
//! if check.is_collision_free() {
//!     sim.move_model(id, Vec3::new(2.0, 1.0, 0.0), Quat::IDENTITY, false)?;
//! }
//!
//! sim.step(1.0 / 60.0)?;
//! ```

pub mod body;
pub mod collider;
pub mod config;
pub mod convert;
pub mod error;
pub mod events;
pub mod filter;
pub mod kinematic;
pub mod model;
pub mod query;
pub mod simulation;
pub mod single_body;
pub mod world;

pub mod prelude {
    //! Common imports for physics functionality
    pub use crate::body::{OwnedBody, RigidBodyDesc, RigidBodyHandle, RigidBodyType};
    pub use crate::collider::{ColliderDesc, ColliderHandle, ColliderShape};
    pub use crate::config::{GroundConfig, PhysicsConfig};
    pub use crate::error::{PhysicsError, Result};
    pub use crate::events::{CollisionEvent, CollisionEventType};
    pub use crate::filter::IgnoreSet;
    pub use crate::kinematic::KinematicGuard;
    pub use crate::model::{MoveOutcome, PhysicsModel};
    pub use crate::query::{PhysicsQuery, QueryScope};
    pub use crate::simulation::{ModelCollision, ModelId, PhysicsSimulation};
    pub use crate::single_body::SingleBodyModel;
    pub use crate::world::PhysicsWorld;
    pub use void_math::{Pose, Quat, Vec3, AABB};
}

pub use prelude::*;
