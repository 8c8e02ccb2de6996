//! # void_entity - Embodied Entities
//!
//! The simulation-side record of where an object is. An [`EmbodiedEntity`]
//! carries a list of [`Anchor`]s; the first one, the origin anchor, is the
//! authoritative logical pose of the object. Physics models write into the
//! anchors once per step and after every accepted move.

pub mod anchor;
pub mod entity;
pub mod error;

pub use anchor::{Anchor, ORIGIN_ANCHOR_ID, ORIGIN_ANCHOR_INDEX};
pub use entity::{EmbodiedEntity, SharedEntity};
pub use error::{EntityError, Result};
