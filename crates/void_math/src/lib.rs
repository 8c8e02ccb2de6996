//! # void_math - Host Math Types
//!
//! Position, orientation and bounds types used on the simulation side of the
//! physics boundary. Engine-native types never leak past `void_physics`; they
//! are converted to and from the types in this crate.

pub mod bounds;
pub mod pose;
pub mod quaternion;
pub mod vector;

pub use bounds::*;
pub use pose::*;
pub use quaternion::*;
pub use vector::*;

/// Common math constants
pub mod consts {
    pub const PI: f32 = core::f32::consts::PI;
    pub const FRAC_PI_2: f32 = PI / 2.0;
    pub const DEG_TO_RAD: f32 = PI / 180.0;
    pub const EPSILON: f32 = 1e-6;
}

/// Convert degrees to radians
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * consts::DEG_TO_RAD
}

pub mod prelude {
    pub use crate::bounds::AABB;
    pub use crate::pose::Pose;
    pub use crate::quaternion::Quat;
    pub use crate::radians;
    pub use crate::vector::Vec3;
}
