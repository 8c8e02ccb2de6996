//! Per-query collider exclusion

use crate::collider::ColliderHandle;

/// Colliders an overlap query must not report.
///
/// Built fresh for every query and dropped afterwards. Holds a handful of
/// handles (one body's shapes plus fixtures), so lookup is a linear scan.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    shapes: Vec<ColliderHandle>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            shapes: Vec::with_capacity(capacity),
        }
    }

    /// Exclude a collider; ignoring the same collider twice is harmless
    pub fn ignore(&mut self, shape: ColliderHandle) {
        if !self.contains(shape) {
            self.shapes.push(shape);
        }
    }

    pub fn contains(&self, shape: ColliderHandle) -> bool {
        self.shapes.contains(&shape)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ColliderHandle> + '_ {
        self.shapes.iter().copied()
    }
}

impl Extend<ColliderHandle> for IgnoreSet {
    fn extend<T: IntoIterator<Item = ColliderHandle>>(&mut self, iter: T) {
        for shape in iter {
            self.ignore(shape);
        }
    }
}

impl FromIterator<ColliderHandle> for IgnoreSet {
    fn from_iter<T: IntoIterator<Item = ColliderHandle>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
