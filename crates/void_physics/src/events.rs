//! Collision events collected while stepping

use crate::body::RigidBodyHandle;
use crate::collider::ColliderHandle;
use crossbeam_channel::Sender;
use rapier3d::prelude as rapier;

/// Type of collision event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEventType {
    /// Collision started
    Started,
    /// Collision ended
    Stopped,
}

/// A collision event between two colliders
#[derive(Debug, Clone)]
pub struct CollisionEvent {
    /// First collider
    pub collider1: ColliderHandle,
    /// Second collider
    pub collider2: ColliderHandle,
    /// Body owning the first collider, if it still exists
    pub body1: Option<RigidBodyHandle>,
    /// Body owning the second collider, if it still exists
    pub body2: Option<RigidBodyHandle>,
    /// Event type
    pub event_type: CollisionEventType,
    /// Whether this is a sensor event (trigger)
    pub is_sensor: bool,
}

impl CollisionEvent {
    /// Check if this is a start event
    pub fn is_started(&self) -> bool {
        self.event_type == CollisionEventType::Started
    }

    /// Check if this is a stop event
    pub fn is_stopped(&self) -> bool {
        self.event_type == CollisionEventType::Stopped
    }

    /// Whether either side is the given body
    pub fn involves(&self, body: RigidBodyHandle) -> bool {
        self.body1 == Some(body) || self.body2 == Some(body)
    }

    pub(crate) fn from_rapier(event: rapier::CollisionEvent, colliders: &rapier::ColliderSet) -> Self {
        let (h1, h2, started) = match event {
            rapier::CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
            rapier::CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
        };

        let c1 = colliders.get(h1);
        let c2 = colliders.get(h2);

        Self {
            collider1: ColliderHandle(h1),
            collider2: ColliderHandle(h2),
            body1: c1.and_then(|c| c.parent()).map(RigidBodyHandle),
            body2: c2.and_then(|c| c.parent()).map(RigidBodyHandle),
            event_type: if started {
                CollisionEventType::Started
            } else {
                CollisionEventType::Stopped
            },
            is_sensor: event.sensor(),
        }
    }
}

/// Channel-based event collector handed to the Rapier pipeline
pub(crate) struct ChannelEventCollector {
    pub(crate) collision_events: Sender<rapier::CollisionEvent>,
}

impl rapier::EventHandler for ChannelEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        event: rapier::CollisionEvent,
        _contact_pair: Option<&rapier::ContactPair>,
    ) {
        let _ = self.collision_events.send(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        _contact_pair: &rapier::ContactPair,
        _total_force_magnitude: f32,
    ) {
        // not collected
    }
}
