//! Anchors - named pose records attached to an entity

use void_math::{Pose, Quat, Vec3};

/// Id of the origin anchor
pub const ORIGIN_ANCHOR_ID: &str = "origin";

/// Index of the origin anchor in [`crate::EmbodiedEntity::anchors`]
pub const ORIGIN_ANCHOR_INDEX: usize = 0;

/// A pose record on an entity.
///
/// `offset_position` and `offset_orientation` locate the anchor relative to the
/// origin anchor and are fixed at creation. `position` and `orientation` are
/// the current world pose, written by whichever physics model owns the anchor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Anchor {
    id: String,
    index: usize,
    offset_position: Vec3,
    offset_orientation: Quat,
    /// World position
    pub position: Vec3,
    /// World orientation
    pub orientation: Quat,
    in_use: u32,
}

impl Anchor {
    pub(crate) fn new(
        id: impl Into<String>,
        index: usize,
        offset_position: Vec3,
        offset_orientation: Quat,
    ) -> Self {
        Self {
            id: id.into(),
            index,
            offset_position,
            offset_orientation,
            position: offset_position,
            orientation: offset_orientation,
            in_use: 0,
        }
    }

    pub(crate) fn origin(position: Vec3, orientation: Quat) -> Self {
        let mut anchor = Self::new(ORIGIN_ANCHOR_ID, ORIGIN_ANCHOR_INDEX, Vec3::ZERO, Quat::IDENTITY);
        anchor.position = position;
        anchor.orientation = orientation;
        // always enabled
        anchor.in_use = 1;
        anchor
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_origin(&self) -> bool {
        self.index == ORIGIN_ANCHOR_INDEX
    }

    pub fn offset_position(&self) -> Vec3 {
        self.offset_position
    }

    pub fn offset_orientation(&self) -> Quat {
        self.offset_orientation
    }

    /// Offset from the origin anchor as a pose
    pub fn offset(&self) -> Pose {
        Pose::new(self.offset_position, self.offset_orientation)
    }

    /// Current world pose
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.orientation)
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.position = pose.position;
        self.orientation = pose.orientation;
    }

    /// Anchors are updated only while someone uses them
    pub fn is_enabled(&self) -> bool {
        self.in_use > 0
    }

    pub(crate) fn acquire(&mut self) -> u32 {
        self.in_use += 1;
        self.in_use
    }

    pub(crate) fn release(&mut self) -> u32 {
        self.in_use = self.in_use.saturating_sub(1);
        self.in_use
    }
}
