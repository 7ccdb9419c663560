//! Collision Registry
//!
//! The set of entities whose colliders can currently be hit. It stores
//! handles only; the collider itself stays owned by its entity's
//! component storage, and a handle that went stale is skipped by readers.
//!
//! Backed by an ordered set so visiting order follows entity index.

use std::collections::BTreeSet;
use crate::game::Entity;

#[derive(Debug, Default)]
pub struct CollisionRegistry {
    colliders: BTreeSet<Entity>,
}

impl CollisionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity. Returns false if it was already registered.
    pub fn register(&mut self, entity: Entity) -> bool {
        self.colliders.insert(entity)
    }

    /// Remove an entity. Returns false if it was not registered.
    pub fn unregister(&mut self, entity: Entity) -> bool {
        self.colliders.remove(&entity)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.colliders.contains(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.colliders.iter().copied()
    }

    /// Snapshot of the current members, for callers that move bodies
    /// while walking the set.
    pub fn snapshot(&self) -> Vec<Entity> {
        self.iter().collect()
    }

    /// Every unordered pair once, `(a, b)` with `a < b`.
    pub fn pairs(&self) -> impl Iterator<Item = (Entity, Entity)> + '_ {
        self.colliders.iter().enumerate().flat_map(move |(i, &a)| {
            self.colliders.iter().skip(i + 1).map(move |&b| (a, b))
        })
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}
