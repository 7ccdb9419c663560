//! Contact Events
//!
//! The resolver reports every enter/stay/exit transition twice over:
//! - as a `ContactEvent` pushed onto the world's queue, for systems that
//!   poll once per frame
//! - as a call into the target entity's `CollisionListener`, if it has one
//!
//! Entities without a listener are simply skipped; that is not an error.

use super::entity::Entity;

/// A queue for events of a single type, drained or cleared once per frame.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactPhase {
    Enter,
    Stay,
    Exit,
}

/// Which hook family fires. Chosen by the *receiving* entity's own
/// collider: trigger colliders hear `Trigger`, solid ones hear `Collision`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactKind {
    Collision,
    Trigger,
}

impl ContactKind {
    pub fn for_trigger_flag(is_trigger: bool) -> Self {
        if is_trigger {
            ContactKind::Trigger
        } else {
            ContactKind::Collision
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    /// Entity being notified
    pub target: Entity,
    /// Entity it touched
    pub other: Entity,
    pub phase: ContactPhase,
    pub kind: ContactKind,
}

/// Optional capability an entity can carry to react to contacts.
///
/// Every hook defaults to a no-op, so implementors override only what
/// they care about.
pub trait CollisionListener {
    fn on_collision_enter(&mut self, _other: Entity) {}
    fn on_collision_stay(&mut self, _other: Entity) {}
    fn on_collision_exit(&mut self, _other: Entity) {}
    fn on_trigger_enter(&mut self, _other: Entity) {}
    fn on_trigger_stay(&mut self, _other: Entity) {}
    fn on_trigger_exit(&mut self, _other: Entity) {}
}

impl<'a> dyn CollisionListener + 'a {
    /// Route an event to the matching hook.
    pub fn notify(&mut self, event: &ContactEvent) {
        let other = event.other;
        match (event.kind, event.phase) {
            (ContactKind::Collision, ContactPhase::Enter) => self.on_collision_enter(other),
            (ContactKind::Collision, ContactPhase::Stay) => self.on_collision_stay(other),
            (ContactKind::Collision, ContactPhase::Exit) => self.on_collision_exit(other),
            (ContactKind::Trigger, ContactPhase::Enter) => self.on_trigger_enter(other),
            (ContactKind::Trigger, ContactPhase::Stay) => self.on_trigger_stay(other),
            (ContactKind::Trigger, ContactPhase::Exit) => self.on_trigger_exit(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Tally {
        collision_enter: u32,
        trigger_exit: u32,
    }

    impl CollisionListener for Tally {
        fn on_collision_enter(&mut self, _other: Entity) {
            self.collision_enter += 1;
        }
        fn on_trigger_exit(&mut self, _other: Entity) {
            self.trigger_exit += 1;
        }
    }

    #[test]
    fn test_event_queue() {
        let mut queue: EventQueue<i32> = EventQueue::new();
        queue.send(1);
        queue.send(2);
        assert_eq!(queue.len(), 2);

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained, vec![1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_notify_routes_to_hook() {
        let mut tally = Tally::default();
        let listener: &mut dyn CollisionListener = &mut tally;
        let base = ContactEvent {
            target: Entity::new(0, 0),
            other: Entity::new(1, 0),
            phase: ContactPhase::Enter,
            kind: ContactKind::Collision,
        };
        listener.notify(&base);
        listener.notify(&ContactEvent { phase: ContactPhase::Exit, kind: ContactKind::Trigger, ..base });
        // Unimplemented hooks are silent
        listener.notify(&ContactEvent { phase: ContactPhase::Stay, ..base });

        assert_eq!(tally.collision_enter, 1);
        assert_eq!(tally.trigger_exit, 1);
    }
}
