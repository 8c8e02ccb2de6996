//! Embodied entity - an object with a physical presence in the simulation

use crate::anchor::{Anchor, ORIGIN_ANCHOR_INDEX};
use crate::error::{EntityError, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use void_math::{Pose, Quat, Vec3};

/// Entity shared between the simulation and the physics model bound to it
pub type SharedEntity = Arc<RwLock<EmbodiedEntity>>;

/// Simulation-side pose state of an object.
///
/// Anchor indices are stable: anchors are only ever appended, and the origin
/// anchor always sits at [`ORIGIN_ANCHOR_INDEX`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmbodiedEntity {
    id: String,
    anchors: Vec<Anchor>,
}

impl EmbodiedEntity {
    /// Create an entity whose origin anchor sits at `position`/`orientation`
    pub fn new(id: impl Into<String>, position: Vec3, orientation: Quat) -> Self {
        Self {
            id: id.into(),
            anchors: vec![Anchor::origin(position, orientation)],
        }
    }

    /// Create an entity at a pose
    pub fn at(id: impl Into<String>, pose: Pose) -> Self {
        Self::new(id, pose.position, pose.orientation)
    }

    /// Wrap into a [`SharedEntity`]
    pub fn into_shared(self) -> SharedEntity {
        Arc::new(RwLock::new(self))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn origin_anchor(&self) -> &Anchor {
        &self.anchors[ORIGIN_ANCHOR_INDEX]
    }

    pub fn origin_anchor_mut(&mut self) -> &mut Anchor {
        &mut self.anchors[ORIGIN_ANCHOR_INDEX]
    }

    /// Logical pose of the entity (the origin anchor's pose)
    pub fn pose(&self) -> Pose {
        self.origin_anchor().pose()
    }

    /// Add a disabled anchor at a fixed offset from the origin
    pub fn add_anchor(
        &mut self,
        id: impl Into<String>,
        offset_position: Vec3,
        offset_orientation: Quat,
    ) -> Result<usize> {
        let id = id.into();
        if self.anchor_index(&id).is_some() {
            return Err(EntityError::DuplicateAnchor(id));
        }
        let index = self.anchors.len();
        let mut anchor = Anchor::new(id, index, offset_position, offset_orientation);
        anchor.set_pose(self.pose().compose(&anchor.offset()));
        log::trace!("Entity {}: added anchor {} at index {}", self.id, anchor.id(), index);
        self.anchors.push(anchor);
        Ok(index)
    }

    pub fn anchor_index(&self, id: &str) -> Option<usize> {
        self.anchors.iter().position(|a| a.id() == id)
    }

    pub fn anchor(&self, index: usize) -> Option<&Anchor> {
        self.anchors.get(index)
    }

    pub fn anchor_mut(&mut self, index: usize) -> Option<&mut Anchor> {
        self.anchors.get_mut(index)
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Indices of the anchors currently in use
    pub fn enabled_anchors(&self) -> impl Iterator<Item = usize> + '_ {
        self.anchors.iter().filter(|a| a.is_enabled()).map(|a| a.index())
    }

    /// Mark an anchor as used; anchors are reference counted
    pub fn enable_anchor(&mut self, id: &str) -> Result<()> {
        let index = self
            .anchor_index(id)
            .ok_or_else(|| EntityError::AnchorNotFound(id.to_string()))?;
        self.anchors[index].acquire();
        Ok(())
    }

    /// Drop one use of an anchor
    pub fn disable_anchor(&mut self, id: &str) -> Result<()> {
        let index = self
            .anchor_index(id)
            .ok_or_else(|| EntityError::AnchorNotFound(id.to_string()))?;
        if index == ORIGIN_ANCHOR_INDEX {
            return Err(EntityError::OriginAnchorDisabled);
        }
        self.anchors[index].release();
        Ok(())
    }
}
