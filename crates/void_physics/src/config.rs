//! Physics configuration

use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};

/// Static ground fixture created with the world.
///
/// The ground is a fixed box whose top face lies on the plane y = 0. It never
/// counts as an obstacle in collision pre-checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    /// Create the ground fixture
    pub enabled: bool,
    /// Half-extents of the ground box
    pub half_extents: [f32; 3],
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            half_extents: [50.0, 0.5, 50.0],
        }
    }
}

/// Physics world configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.81 in Y)
    pub gravity: [f32; 3],

    /// Fixed timestep for physics simulation
    pub timestep: f32,

    /// Maximum number of substeps per frame
    pub max_substeps: u32,

    /// Solver iterations per substep
    pub solver_iterations: usize,

    /// Ground fixture
    pub ground: GroundConfig,

    /// Whether sensor colliders count as obstacles in collision pre-checks
    pub query_sensors: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            timestep: 1.0 / 60.0,
            max_substeps: 4,
            solver_iterations: 4,
            ground: GroundConfig::default(),
            query_sensors: false,
        }
    }
}

impl PhysicsConfig {
    /// Create a configuration for high-precision simulation
    pub fn high_precision() -> Self {
        Self {
            solver_iterations: 8,
            max_substeps: 8,
            ..Default::default()
        }
    }

    /// Create a configuration for fast simulation (lower quality)
    pub fn fast() -> Self {
        Self {
            solver_iterations: 2,
            max_substeps: 2,
            ..Default::default()
        }
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PhysicsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.timestep > 0.0) || !self.timestep.is_finite() {
            return Err(PhysicsError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.solver_iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "solver_iterations must be at least 1".to_string(),
            ));
        }
        if self.ground.enabled && self.ground.half_extents.iter().any(|e| !(*e > 0.0)) {
            return Err(PhysicsError::InvalidConfig(format!(
                "ground half extents must be positive, got {:?}",
                self.ground.half_extents
            )));
        }
        Ok(())
    }

    /// Set gravity
    pub fn with_gravity(mut self, x: f32, y: f32, z: f32) -> Self {
        self.gravity = [x, y, z];
        self
    }

    /// Set timestep
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Disable the ground fixture
    pub fn without_ground(mut self) -> Self {
        self.ground.enabled = false;
        self
    }

    /// Let sensors block speculative moves
    pub fn with_query_sensors(mut self, enabled: bool) -> Self {
        self.query_sensors = enabled;
        self
    }
}
