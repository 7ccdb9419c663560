//! Game World
//!
//! The World owns everything one simulation needs:
//! - entity allocation and deferred despawn
//! - typed component storage (transforms, hierarchy, sprites, physics)
//! - the collision registry and physics tuning
//! - the contact event queue
//!
//! Components live in named fields rather than a type-keyed map; the set of
//! component kinds is fixed at compile time. Several worlds can coexist in
//! one process since nothing here is global.

use crate::error::PhysicsError;
use crate::math::Vec2;
use crate::physics::{self, Bounds, Collider, CollisionRegistry, PhysicsConfig, Rigidbody};
use super::component::ComponentStorage;
use super::components::Sprite;
use super::entity::{Entity, EntityAllocator};
use super::event::{CollisionListener, ContactEvent, EventQueue};
use super::transform::{self, Transform};

pub struct World {
    entities: EntityAllocator,

    /// Entities queued for despawn at end of frame
    despawn_queue: Vec<Entity>,

    // =========================================================================
    // Scene graph
    // =========================================================================

    pub transforms: ComponentStorage<Transform>,
    pub parents: ComponentStorage<Entity>,
    pub children: ComponentStorage<Vec<Entity>>,
    pub names: ComponentStorage<String>,
    pub sprites: ComponentStorage<Sprite>,

    // =========================================================================
    // Physics
    // =========================================================================

    pub colliders: ComponentStorage<Collider>,
    pub rigidbodies: ComponentStorage<Rigidbody>,
    pub listeners: ComponentStorage<Box<dyn CollisionListener>>,

    /// Colliders that can currently be hit
    pub registry: CollisionRegistry,
    pub physics: PhysicsConfig,

    /// Contact events fired since the queue was last cleared
    pub contacts: EventQueue<ContactEvent>,
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            despawn_queue: Vec::new(),
            transforms: ComponentStorage::new(),
            parents: ComponentStorage::new(),
            children: ComponentStorage::new(),
            names: ComponentStorage::new(),
            sprites: ComponentStorage::new(),
            colliders: ComponentStorage::new(),
            rigidbodies: ComponentStorage::new(),
            listeners: ComponentStorage::new(),
            registry: CollisionRegistry::new(),
            physics: PhysicsConfig::default(),
            contacts: EventQueue::new(),
        }
    }

    pub fn with_config(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        let mut world = Self::new();
        world.physics = config;
        Ok(world)
    }

    // =========================================================================
    // Entity Management
    // =========================================================================

    pub fn spawn(&mut self) -> Entity {
        self.spawn_at(Vec2::ZERO)
    }

    pub fn spawn_at(&mut self, position: Vec2) -> Entity {
        let entity = self.entities.allocate();
        self.transforms.insert(entity, Transform::from_position(position));
        entity
    }

    /// Queue an entity for despawn at end of frame.
    pub fn despawn(&mut self, entity: Entity) {
        if self.is_alive(entity) && !self.despawn_queue.contains(&entity) {
            self.despawn_queue.push(entity);
        }
    }

    /// Despawn an entity and its children right away, unregistering any
    /// colliders they carried.
    pub fn despawn_immediate(&mut self, entity: Entity) {
        if !self.entities.free(entity) {
            return;
        }

        if let Some(parent) = self.parents.remove(entity) {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.retain(|&e| e != entity);
            }
        }
        if let Some(child_list) = self.children.remove(entity) {
            for child in child_list {
                self.despawn_immediate(child);
            }
        }

        self.registry.unregister(entity);
        self.transforms.remove(entity);
        self.names.remove(entity);
        self.sprites.remove(entity);
        self.colliders.remove(entity);
        self.rigidbodies.remove(entity);
        self.listeners.remove(entity);
    }

    pub fn flush_despawns(&mut self) {
        let queue = std::mem::take(&mut self.despawn_queue);
        for entity in queue {
            self.despawn_immediate(entity);
        }
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entity_count(&self) -> u32 {
        self.entities.alive_count()
    }

    pub fn iter_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    // =========================================================================
    // Hierarchy and Naming
    // =========================================================================

    /// Parent `child` under `parent`. Refuses (returns false) when either is
    /// dead or when the link would create a cycle.
    pub fn set_parent(&mut self, child: Entity, parent: Entity) -> bool {
        if !self.is_alive(child) || !self.is_alive(parent) {
            return false;
        }
        let mut ancestor = Some(parent);
        while let Some(a) = ancestor {
            if a == child {
                log::warn!("refusing to parent {} under its own descendant {}", child, parent);
                return false;
            }
            ancestor = self.parents.get(a).copied();
        }

        self.remove_parent(child);
        self.parents.insert(child, parent);
        match self.children.get_mut(parent) {
            Some(list) => list.push(child),
            None => {
                self.children.insert(parent, vec![child]);
            }
        }
        true
    }

    pub fn remove_parent(&mut self, child: Entity) {
        if let Some(old_parent) = self.parents.remove(child) {
            if let Some(siblings) = self.children.get_mut(old_parent) {
                siblings.retain(|&e| e != child);
            }
        }
    }

    pub fn children_of(&self, entity: Entity) -> &[Entity] {
        self.children.get(entity).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Is `ancestor` somewhere up `entity`'s parent chain?
    pub fn is_descendant_of(&self, entity: Entity, ancestor: Entity) -> bool {
        let mut current = self.parents.get(entity).copied();
        for _ in 0..transform::MAX_HIERARCHY_DEPTH {
            match current {
                Some(parent) if parent == ancestor => return true,
                Some(parent) => current = self.parents.get(parent).copied(),
                None => return false,
            }
        }
        false
    }

    pub fn set_name(&mut self, entity: Entity, name: impl Into<String>) {
        if self.is_alive(entity) {
            self.names.insert(entity, name.into());
        }
    }

    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.names.get(entity).map(String::as_str)
    }

    pub fn find_by_name(&self, name: &str) -> Option<Entity> {
        self.names.iter().find(|(_, n)| n.as_str() == name).map(|(e, _)| e)
    }

    // =========================================================================
    // Positions
    // =========================================================================

    /// Position relative to the parent.
    pub fn local_position(&self, entity: Entity) -> Option<Vec2> {
        self.transforms.get(entity).map(|t| t.position)
    }

    pub fn set_local_position(&mut self, entity: Entity, position: Vec2) {
        if let Some(t) = self.transforms.get_mut(entity) {
            t.position = position;
        }
    }

    pub fn translate(&mut self, entity: Entity, offset: Vec2) {
        if let Some(t) = self.transforms.get_mut(entity) {
            t.translate(offset);
        }
    }

    pub fn global_position(&self, entity: Entity) -> Vec2 {
        transform::global_position(&self.transforms, &self.parents, entity)
    }

    pub fn global_rotation(&self, entity: Entity) -> f32 {
        transform::global_rotation(&self.transforms, &self.parents, entity)
    }

    // =========================================================================
    // Component Attachment
    // =========================================================================

    /// Attach (or replace) a collider and register it.
    pub fn attach_collider(&mut self, entity: Entity, collider: Collider) -> Result<(), PhysicsError> {
        if !self.is_alive(entity) {
            return Err(PhysicsError::DeadEntity(entity));
        }
        if collider.needs_sprite_size() && !self.sprites.contains(entity) {
            log::warn!("{} has a collider sized from a sprite but no sprite; size falls back to 0", entity);
        }
        self.colliders.insert(entity, collider);
        self.registry.register(entity);
        Ok(())
    }

    /// Remove an entity's collider and unregister it.
    pub fn detach_collider(&mut self, entity: Entity) -> Option<Collider> {
        self.registry.unregister(entity);
        self.colliders.remove(entity)
    }

    /// Put an entity back in the registry. It must carry a collider.
    pub fn register(&mut self, entity: Entity) -> Result<bool, PhysicsError> {
        if !self.is_alive(entity) {
            return Err(PhysicsError::DeadEntity(entity));
        }
        if !self.colliders.contains(entity) {
            return Err(PhysicsError::MissingCollider(entity));
        }
        Ok(self.registry.register(entity))
    }

    /// Take an entity out of the registry without removing its collider.
    pub fn unregister(&mut self, entity: Entity) -> bool {
        self.registry.unregister(entity)
    }

    pub fn attach_rigidbody(&mut self, entity: Entity, body: Rigidbody) -> Result<(), PhysicsError> {
        if !self.is_alive(entity) {
            return Err(PhysicsError::DeadEntity(entity));
        }
        if !self.colliders.contains(entity) {
            log::warn!("{} has a rigidbody but no collider; it will move without collision", entity);
        }
        self.rigidbodies.insert(entity, body);
        Ok(())
    }

    pub fn attach_sprite(&mut self, entity: Entity, sprite: Sprite) -> Result<(), PhysicsError> {
        if !self.is_alive(entity) {
            return Err(PhysicsError::DeadEntity(entity));
        }
        self.sprites.insert(entity, sprite);
        Ok(())
    }

    pub fn attach_listener(
        &mut self,
        entity: Entity,
        listener: Box<dyn CollisionListener>,
    ) -> Result<(), PhysicsError> {
        if !self.is_alive(entity) {
            return Err(PhysicsError::DeadEntity(entity));
        }
        self.listeners.insert(entity, listener);
        Ok(())
    }

    // =========================================================================
    // Collision Queries
    // =========================================================================

    /// Current world-space bounds of an entity's collider.
    pub fn collider_bounds(&self, entity: Entity) -> Option<Bounds> {
        let collider = self.colliders.get(entity)?;
        let sprite_size = self.sprites.get(entity).map(Sprite::size);
        Some(collider.bounds(self.global_position(entity), sprite_size))
    }

    /// Do the colliders of `a` and `b` overlap right now?
    pub fn check_collision(&self, a: Entity, b: Entity) -> bool {
        let (Some(first), Some(second)) = (self.colliders.get(a), self.colliders.get(b)) else {
            return false;
        };
        first.check_collision_with(
            self.global_position(a),
            self.sprites.get(a).map(Sprite::size),
            second,
            self.global_position(b),
            self.sprites.get(b).map(Sprite::size),
            self.physics.contact_epsilon,
        )
    }

    /// Every registered pair overlapping right now, each pair once.
    pub fn overlapping_pairs(&self) -> Vec<(Entity, Entity)> {
        self.registry
            .pairs()
            .filter(|&(a, b)| self.check_collision(a, b))
            .collect()
    }

    /// Move a rigidbody with collision resolution. See `physics::move_body`.
    pub fn move_body(&mut self, entity: Entity, delta: Vec2) -> bool {
        physics::move_body(self, entity, delta)
    }

    /// Record a contact event and call the target's listener, if any.
    pub fn dispatch(&mut self, event: ContactEvent) {
        log::trace!("{:?} {:?}: {} -> {}", event.kind, event.phase, event.target, event.other);
        if let Some(listener) = self.listeners.get_mut(event.target) {
            listener.notify(&event);
        }
        self.contacts.send(event);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
