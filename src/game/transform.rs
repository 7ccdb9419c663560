//! Transforms
//!
//! Every entity carries a local `Transform` relative to its parent (or the
//! world for roots). Global position is the sum of local positions up the
//! parent chain. Rotation is kept for drawing only; it does not rotate
//! child offsets and it never reaches collider bounds, so an axis-aligned
//! box stays axis-aligned however its entity is turned.

use serde::{Serialize, Deserialize};
use crate::math::Vec2;
use super::component::ComponentStorage;
use super::entity::Entity;

/// Parent chains deeper than this are treated as corrupt and cut off.
pub const MAX_HIERARCHY_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    /// Degrees, clockwise in screen space
    pub rotation: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { position: Vec2::ZERO, rotation: 0.0 };

    pub fn from_position(position: Vec2) -> Self {
        Self { position, rotation: 0.0 }
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }

    pub fn rotate(&mut self, degrees: f32) {
        self.rotation += degrees;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Resolve an entity's world-space position by walking its parents.
///
/// Entities without a transform contribute nothing; the walk stops at a
/// missing parent or at `MAX_HIERARCHY_DEPTH`.
pub fn global_position(
    transforms: &ComponentStorage<Transform>,
    parents: &ComponentStorage<Entity>,
    entity: Entity,
) -> Vec2 {
    let mut position = Vec2::ZERO;
    let mut current = Some(entity);
    let mut depth = 0;
    while let Some(e) = current {
        if depth >= MAX_HIERARCHY_DEPTH {
            log::warn!("hierarchy above {} is deeper than {}, truncating", entity, MAX_HIERARCHY_DEPTH);
            break;
        }
        if let Some(t) = transforms.get(e) {
            position += t.position;
        }
        current = parents.get(e).copied();
        depth += 1;
    }
    position
}

/// Sum of rotations up the parent chain, for drawing.
pub fn global_rotation(
    transforms: &ComponentStorage<Transform>,
    parents: &ComponentStorage<Entity>,
    entity: Entity,
) -> f32 {
    let mut rotation = 0.0;
    let mut current = Some(entity);
    for _ in 0..MAX_HIERARCHY_DEPTH {
        let Some(e) = current else { break };
        rotation += transforms.get(e).map_or(0.0, |t| t.rotation);
        current = parents.get(e).copied();
    }
    rotation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_global_is_local() {
        let mut transforms = ComponentStorage::new();
        let parents = ComponentStorage::new();
        let e = Entity::new(0, 0);
        transforms.insert(e, Transform::from_position(Vec2::new(3.0, 4.0)));

        assert_eq!(global_position(&transforms, &parents, e), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_parent_chain_composes_positions() {
        let mut transforms = ComponentStorage::new();
        let mut parents = ComponentStorage::new();
        let root = Entity::new(0, 0);
        let mid = Entity::new(1, 0);
        let leaf = Entity::new(2, 0);

        transforms.insert(root, Transform { position: Vec2::new(100.0, 0.0), rotation: 90.0 });
        transforms.insert(mid, Transform::from_position(Vec2::new(10.0, 5.0)));
        transforms.insert(leaf, Transform::from_position(Vec2::new(1.0, 1.0)));
        parents.insert(mid, root);
        parents.insert(leaf, mid);

        // Parent rotation does not swing the child offset around
        assert_eq!(global_position(&transforms, &parents, leaf), Vec2::new(111.0, 6.0));
        assert_eq!(global_rotation(&transforms, &parents, leaf), 90.0);
    }
}
