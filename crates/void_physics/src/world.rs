//! Physics world - main simulation container

use crate::body::{OwnedBody, RigidBodyDesc, RigidBodyHandle, RigidBodyType};
use crate::collider::{ColliderDesc, ColliderHandle};
use crate::config::PhysicsConfig;
use crate::convert;
use crate::error::{PhysicsError, Result};
use crate::events::{ChannelEventCollector, CollisionEvent};
use crate::query::PhysicsQuery;
use crossbeam_channel::{Receiver, Sender};
use rapier3d::prelude as rapier;
use std::num::NonZeroUsize;
use void_math::{Pose, Vec3, AABB};

/// The ground fixture created from [`crate::config::GroundConfig`]
#[derive(Debug, Clone, Copy)]
struct Ground {
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

/// The main physics world containing all simulation state
pub struct PhysicsWorld {
    /// Configuration
    config: PhysicsConfig,

    /// Rapier physics pipeline
    pipeline: rapier::PhysicsPipeline,

    /// Gravity
    gravity: rapier::Vector<f32>,

    /// Integration parameters
    integration_params: rapier::IntegrationParameters,

    /// Island manager
    islands: rapier::IslandManager,

    /// Broad phase
    broad_phase: rapier::DefaultBroadPhase,

    /// Narrow phase
    narrow_phase: rapier::NarrowPhase,

    /// Impulse joint set (unused, required by the pipeline)
    impulse_joints: rapier::ImpulseJointSet,

    /// Multibody joint set (unused, required by the pipeline)
    multibody_joints: rapier::MultibodyJointSet,

    /// CCD solver
    ccd_solver: rapier::CCDSolver,

    /// Query pipeline
    query_pipeline: rapier::QueryPipeline,

    /// Rigid body set
    bodies: rapier::RigidBodySet,

    /// Collider set
    colliders: rapier::ColliderSet,

    /// Collision events of the last step
    collision_events: Vec<CollisionEvent>,

    /// Ground fixture, if enabled
    ground: Option<Ground>,

    /// Bodies whose owner was dropped
    release_tx: Sender<RigidBodyHandle>,
    release_rx: Receiver<RigidBodyHandle>,

    /// Accumulated time for fixed timestep
    accumulated_time: f32,
}

impl PhysicsWorld {
    /// Create a new physics world
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;

        let gravity = rapier::Vector::new(config.gravity[0], config.gravity[1], config.gravity[2]);

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = config.timestep;
        integration_params.num_solver_iterations =
            NonZeroUsize::new(config.solver_iterations).unwrap_or(NonZeroUsize::MIN);

        let (release_tx, release_rx) = crossbeam_channel::unbounded();

        let mut world = Self {
            config,
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            query_pipeline: rapier::QueryPipeline::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            collision_events: Vec::new(),
            ground: None,
            release_tx,
            release_rx,
            accumulated_time: 0.0,
        };

        if world.config.ground.enabled {
            world.spawn_ground();
        }
        world.query_pipeline.update(&world.colliders);

        Ok(world)
    }

    fn spawn_ground(&mut self) {
        let [hx, hy, hz] = self.config.ground.half_extents;
        let body = self
            .bodies
            .insert(rapier::RigidBodyBuilder::fixed().translation(rapier::Vector::new(0.0, -hy, 0.0)));
        let collider = self.colliders.insert_with_parent(
            rapier::ColliderBuilder::cuboid(hx, hy, hz),
            body,
            &mut self.bodies,
        );
        log::debug!("Spawned ground fixture {:?} (half extents {:?})", collider, [hx, hy, hz]);
        self.ground = Some(Ground {
            body: RigidBodyHandle(body),
            collider: ColliderHandle(collider),
        });
    }

    /// Get the physics configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Set gravity
    pub fn set_gravity(&mut self, x: f32, y: f32, z: f32) {
        self.gravity = rapier::Vector::new(x, y, z);
    }

    /// Get gravity
    pub fn gravity(&self) -> [f32; 3] {
        [self.gravity.x, self.gravity.y, self.gravity.z]
    }

    // ==================== Ground ====================

    /// Collider of the ground fixture
    pub fn ground_collider(&self) -> Option<ColliderHandle> {
        self.ground.map(|g| g.collider)
    }

    /// Body of the ground fixture
    pub fn ground_body(&self) -> Option<RigidBodyHandle> {
        self.ground.map(|g| g.body)
    }

    // ==================== Body lifecycle ====================

    /// Create a rigid body with its colliders.
    ///
    /// The returned [`OwnedBody`] is the only owner of the body; dropping it
    /// releases the body.
    pub fn create_body(&mut self, desc: &RigidBodyDesc, colliders: &[ColliderDesc]) -> Result<OwnedBody> {
        // Build every shape first so a bad shape leaves the world untouched.
        let builders = colliders
            .iter()
            .map(ColliderDesc::to_rapier_builder)
            .collect::<Result<Vec<_>>>()?;

        let handle = self.bodies.insert(desc.to_rapier_builder());
        for builder in builders {
            self.colliders.insert_with_parent(builder, handle, &mut self.bodies);
        }
        self.query_pipeline.update(&self.colliders);

        log::debug!(
            "Created {:?} body {:?} with {} collider(s)",
            desc.body_type,
            handle,
            colliders.len()
        );
        Ok(OwnedBody::new(RigidBodyHandle(handle), self.release_tx.clone()))
    }

    /// Add another collider to an owned body
    pub fn attach_collider(&mut self, body: &OwnedBody, desc: &ColliderDesc) -> Result<ColliderHandle> {
        let handle = body.handle();
        if !self.bodies.contains(handle.0) {
            return Err(PhysicsError::BodyNotFound(handle));
        }
        let collider = self
            .colliders
            .insert_with_parent(desc.to_rapier_builder()?, handle.0, &mut self.bodies);
        self.query_pipeline.update(&self.colliders);
        Ok(ColliderHandle(collider))
    }

    /// Remove every body whose [`OwnedBody`] has been dropped.
    ///
    /// Returns the number of bodies removed.
    pub fn flush_releases(&mut self) -> usize {
        let mut released = 0;
        while let Ok(handle) = self.release_rx.try_recv() {
            let removed = self.bodies.remove(
                handle.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true, // Remove attached colliders
            );
            if removed.is_some() {
                log::debug!("Released body {:?}", handle);
                released += 1;
            }
        }
        if released > 0 {
            self.query_pipeline.update(&self.colliders);
        }
        released
    }

    // ==================== Body state ====================

    fn body(&self, handle: RigidBodyHandle) -> Result<&rapier::RigidBody> {
        self.bodies.get(handle.0).ok_or(PhysicsError::BodyNotFound(handle))
    }

    fn body_mut(&mut self, handle: RigidBodyHandle) -> Result<&mut rapier::RigidBody> {
        self.bodies.get_mut(handle.0).ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Whether the body is a dynamic-kind body
    pub fn is_dynamic(&self, handle: RigidBodyHandle) -> Result<bool> {
        Ok(self.body(handle)?.is_dynamic())
    }

    /// Current type of the body
    pub fn body_type(&self, handle: RigidBodyHandle) -> Result<RigidBodyType> {
        Ok(self.body(handle)?.body_type().into())
    }

    /// Get the world pose of a body
    pub fn body_pose(&self, handle: RigidBodyHandle) -> Result<Pose> {
        Ok(convert::from_isometry(self.body(handle)?.position()))
    }

    /// Set the world pose of a body immediately.
    ///
    /// Queries see the new pose right away, without waiting for a step.
    pub fn set_body_pose(&mut self, handle: RigidBodyHandle, pose: &Pose) -> Result<()> {
        self.place_body(handle, convert::try_to_isometry(pose)?)?;
        self.refresh_body(handle)
    }

    pub(crate) fn body_isometry(&self, handle: RigidBodyHandle) -> Result<rapier::Isometry<f32>> {
        Ok(*self.body(handle)?.position())
    }

    /// Write a body pose and move its colliders along.
    ///
    /// The query acceleration structure is left as it was; call
    /// [`refresh_body`](Self::refresh_body) once the pose is final.
    pub(crate) fn place_body(
        &mut self,
        handle: RigidBodyHandle,
        pose: rapier::Isometry<f32>,
    ) -> Result<()> {
        let body = self
            .bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::BodyNotFound(handle))?;
        body.set_position(pose, true);

        for collider in body.colliders() {
            if let Some(co) = self.colliders.get_mut(*collider) {
                if let Some(local) = co.position_wrt_parent().copied() {
                    co.set_position(pose * local);
                }
            }
        }
        Ok(())
    }

    /// Update the query acceleration structure for one body's colliders only
    pub(crate) fn refresh_body(&mut self, handle: RigidBodyHandle) -> Result<()> {
        let colliders = self.body(handle)?.colliders().to_vec();
        self.query_pipeline
            .update_incremental(&self.colliders, &colliders, &[], true);
        Ok(())
    }

    /// Switch a dynamic body in or out of kinematic mode.
    ///
    /// While kinematic the solver does not integrate forces on the body and
    /// pose writes are authoritative.
    pub fn set_kinematic(&mut self, handle: RigidBodyHandle, kinematic: bool) -> Result<()> {
        let body_type = if kinematic {
            rapier::RigidBodyType::KinematicPositionBased
        } else {
            rapier::RigidBodyType::Dynamic
        };
        self.body_mut(handle)?.set_body_type(body_type, true);
        Ok(())
    }

    /// Clear accumulated forces and torques
    pub fn clear_forces(&mut self, handle: RigidBodyHandle) -> Result<()> {
        let body = self.body_mut(handle)?;
        body.reset_forces(true);
        body.reset_torques(true);
        Ok(())
    }

    /// Zero linear and angular velocity
    pub fn clear_velocities(&mut self, handle: RigidBodyHandle) -> Result<()> {
        let body = self.body_mut(handle)?;
        body.set_linvel(rapier::Vector::zeros(), true);
        body.set_angvel(rapier::Vector::zeros(), true);
        Ok(())
    }

    /// Accumulated user force and torque
    pub fn body_forces(&self, handle: RigidBodyHandle) -> Result<(Vec3, Vec3)> {
        let body = self.body(handle)?;
        Ok((
            convert::from_vector(&body.user_force()),
            convert::from_vector(&body.user_torque()),
        ))
    }

    /// Get rigid body linear velocity
    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Result<Vec3> {
        Ok(convert::from_vector(self.body(handle)?.linvel()))
    }

    /// Set rigid body linear velocity
    pub fn set_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) -> Result<()> {
        self.body_mut(handle)?.set_linvel(convert::to_vector(velocity), true);
        Ok(())
    }

    /// Add a persistent force to a rigid body
    pub fn add_force(&mut self, handle: RigidBodyHandle, force: Vec3) -> Result<()> {
        self.body_mut(handle)?.add_force(convert::to_vector(force), true);
        Ok(())
    }

    /// Add a persistent torque to a rigid body
    pub fn add_torque(&mut self, handle: RigidBodyHandle, torque: Vec3) -> Result<()> {
        self.body_mut(handle)?.add_torque(convert::to_vector(torque), true);
        Ok(())
    }

    /// Colliders attached to a body
    pub fn body_colliders(&self, handle: RigidBodyHandle) -> Result<Vec<ColliderHandle>> {
        Ok(self
            .body(handle)?
            .colliders()
            .iter()
            .copied()
            .map(ColliderHandle)
            .collect())
    }

    /// World-space bounds of all colliders of a body; empty if it has none
    pub fn body_world_bounds(&self, handle: RigidBodyHandle) -> Result<AABB> {
        let mut bounds = AABB::EMPTY;
        for collider in self.body(handle)?.colliders() {
            let co = self
                .colliders
                .get(*collider)
                .ok_or(PhysicsError::ColliderNotFound(ColliderHandle(*collider)))?;
            bounds = bounds.union(&convert::from_aabb(&co.compute_aabb()));
        }
        Ok(bounds)
    }

    /// Body a collider is attached to
    pub fn collider_parent(&self, collider: ColliderHandle) -> Option<RigidBodyHandle> {
        self.colliders
            .get(collider.0)
            .and_then(|c| c.parent())
            .map(RigidBodyHandle)
    }

    // ==================== Simulation ====================

    /// Step the physics simulation with fixed timestep
    pub fn step(&mut self, delta_time: f32) {
        self.flush_releases();
        self.collision_events.clear();
        self.accumulated_time += delta_time;

        let mut steps = 0;
        while self.accumulated_time >= self.config.timestep && steps < self.config.max_substeps {
            self.step_internal();
            self.accumulated_time -= self.config.timestep;
            steps += 1;
        }
        // Drop the backlog a capped frame could not simulate
        self.accumulated_time = self
            .accumulated_time
            .min(self.config.timestep * self.config.max_substeps as f32);

        // Update query pipeline after stepping
        self.query_pipeline.update(&self.colliders);
    }

    /// Internal fixed timestep
    fn step_internal(&mut self) {
        let (collision_send, collision_recv) = crossbeam_channel::unbounded();
        let event_handler = ChannelEventCollector {
            collision_events: collision_send,
        };

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &event_handler,
        );

        while let Ok(event) = collision_recv.try_recv() {
            self.collision_events
                .push(CollisionEvent::from_rapier(event, &self.colliders));
        }
    }

    // ==================== Queries ====================

    /// Get a query interface for overlap queries
    pub fn query(&self) -> PhysicsQuery<'_> {
        PhysicsQuery {
            query_pipeline: &self.query_pipeline,
            colliders: &self.colliders,
            bodies: &self.bodies,
        }
    }

    // ==================== Events ====================

    /// Get collision events from the last step
    pub fn collision_events(&self) -> &[CollisionEvent] {
        &self.collision_events
    }

    // ==================== Debug ====================

    /// Get number of rigid bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Get number of colliders
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }
}
