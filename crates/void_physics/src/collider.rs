//! Collider types

use crate::convert;
use crate::error::{PhysicsError, Result};
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};
use void_math::{Pose, Quat, Vec3};

/// Identity of a collider (one shape of a body) in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub(crate) rapier::ColliderHandle);

impl ColliderHandle {
    /// Create from raw Rapier handle
    pub fn from_raw(handle: rapier::ColliderHandle) -> Self {
        Self(handle)
    }

    /// Get the raw Rapier handle
    pub fn raw(&self) -> rapier::ColliderHandle {
        self.0
    }
}

/// Collision shape type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Sphere with radius
    Sphere {
        radius: f32,
    },
    /// Box with half-extents
    Box {
        half_extents: [f32; 3],
    },
    /// Capsule aligned along Y axis
    CapsuleY {
        half_height: f32,
        radius: f32,
    },
    /// Cylinder aligned along Y axis
    CylinderY {
        half_height: f32,
        radius: f32,
    },
    /// Convex hull from points
    ConvexHull {
        points: Vec<[f32; 3]>,
    },
}

impl Default for ColliderShape {
    fn default() -> Self {
        Self::Box {
            half_extents: [0.5, 0.5, 0.5],
        }
    }
}

impl ColliderShape {
    /// Create a sphere shape
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Create a box shape from half-extents
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::Box {
            half_extents: [hx, hy, hz],
        }
    }

    /// Create a capsule shape (Y-aligned)
    pub fn capsule(half_height: f32, radius: f32) -> Self {
        Self::CapsuleY { half_height, radius }
    }

    /// Create a cylinder shape (Y-aligned)
    pub fn cylinder(half_height: f32, radius: f32) -> Self {
        Self::CylinderY { half_height, radius }
    }

    /// Build a Rapier shared shape
    pub(crate) fn to_rapier(&self) -> Result<rapier::SharedShape> {
        let shape = match self {
            Self::Sphere { radius } => rapier::SharedShape::ball(*radius),
            Self::Box { half_extents } => {
                rapier::SharedShape::cuboid(half_extents[0], half_extents[1], half_extents[2])
            }
            Self::CapsuleY { half_height, radius } => {
                rapier::SharedShape::capsule_y(*half_height, *radius)
            }
            Self::CylinderY { half_height, radius } => {
                rapier::SharedShape::cylinder(*half_height, *radius)
            }
            Self::ConvexHull { points } => {
                let rapier_points: Vec<_> = points
                    .iter()
                    .map(|p| rapier::Point::new(p[0], p[1], p[2]))
                    .collect();
                rapier::SharedShape::convex_hull(&rapier_points).ok_or_else(|| {
                    PhysicsError::ShapeCreationFailed(format!(
                        "degenerate convex hull ({} points)",
                        points.len()
                    ))
                })?
            }
        };
        Ok(shape)
    }
}

/// Description for creating a collider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColliderDesc {
    /// Collision shape
    pub shape: ColliderShape,
    /// Position offset from parent body
    pub position_offset: Vec3,
    /// Rotation offset from parent body
    pub rotation_offset: Quat,
    /// Is this a sensor/trigger (no physical response)
    pub is_sensor: bool,
    /// Friction coefficient (0 = frictionless, 1 = high friction)
    pub friction: f32,
    /// Restitution/bounciness (0 = no bounce, 1 = perfect bounce)
    pub restitution: f32,
    /// Density for mass calculation (kg/m³)
    pub density: f32,
}

impl Default for ColliderDesc {
    fn default() -> Self {
        Self {
            shape: ColliderShape::default(),
            position_offset: Vec3::ZERO,
            rotation_offset: Quat::IDENTITY,
            is_sensor: false,
            friction: 0.5,
            restitution: 0.0,
            density: 1.0,
        }
    }
}

impl ColliderDesc {
    /// Create a new collider description with a shape
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            ..Default::default()
        }
    }

    /// Create a sensor (trigger volume)
    pub fn sensor(shape: ColliderShape) -> Self {
        Self {
            shape,
            is_sensor: true,
            ..Default::default()
        }
    }

    /// Set position offset
    pub fn with_offset(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position_offset = Vec3::new(x, y, z);
        self
    }

    /// Set rotation offset
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation_offset = rotation;
        self
    }

    /// Set friction and restitution
    pub fn with_material(mut self, friction: f32, restitution: f32) -> Self {
        self.friction = friction.clamp(0.0, 1.0);
        self.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    /// Set density
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density.max(0.001);
        self
    }

    /// Build a Rapier collider builder
    pub(crate) fn to_rapier_builder(&self) -> Result<rapier::ColliderBuilder> {
        let builder = rapier::ColliderBuilder::new(self.shape.to_rapier()?)
            .position(convert::to_isometry(&Pose::new(self.position_offset, self.rotation_offset)))
            .sensor(self.is_sensor)
            .friction(self.friction)
            .restitution(self.restitution)
            .density(self.density)
            .active_events(rapier::ActiveEvents::COLLISION_EVENTS);
        Ok(builder)
    }
}
