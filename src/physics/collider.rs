//! Collider Component
//!
//! A closed set of shapes, so dispatch is a `match` rather than a lookup by
//! type. Bounds are recomputed from the owner's global position on every
//! call; nothing is cached between frames.

use serde::{Serialize, Deserialize};
use crate::math::Vec2;
use super::shapes::{Bounds, BoxBounds, CircleBounds};

/// Box collider. A missing dimension falls back to the owner's sprite size,
/// or 0 when there is no sprite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxCollider {
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub trigger: bool,
}

/// Circle collider. A missing radius falls back to half the sprite's larger
/// side, or 0 when there is no sprite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CircleCollider {
    #[serde(default)]
    pub radius: Option<f32>,
    #[serde(default)]
    pub trigger: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    Box(BoxCollider),
    Circle(CircleCollider),
}

impl Collider {
    pub fn solid_box(width: f32, height: f32) -> Self {
        Collider::Box(BoxCollider { width: Some(width), height: Some(height), trigger: false })
    }

    pub fn trigger_box(width: f32, height: f32) -> Self {
        Collider::Box(BoxCollider { width: Some(width), height: Some(height), trigger: true })
    }

    pub fn solid_circle(radius: f32) -> Self {
        Collider::Circle(CircleCollider { radius: Some(radius), trigger: false })
    }

    pub fn trigger_circle(radius: f32) -> Self {
        Collider::Circle(CircleCollider { radius: Some(radius), trigger: true })
    }

    pub fn is_trigger(&self) -> bool {
        match self {
            Collider::Box(b) => b.trigger,
            Collider::Circle(c) => c.trigger,
        }
    }

    /// True if some dimension has to come from a sprite.
    pub fn needs_sprite_size(&self) -> bool {
        match self {
            Collider::Box(b) => b.width.is_none() || b.height.is_none(),
            Collider::Circle(c) => c.radius.is_none(),
        }
    }

    /// World-space bounds for an owner at `position`.
    pub fn bounds(&self, position: Vec2, sprite_size: Option<Vec2>) -> Bounds {
        let fallback = sprite_size.unwrap_or(Vec2::ZERO);
        match self {
            Collider::Box(b) => {
                let width = b.width.unwrap_or(fallback.x);
                let height = b.height.unwrap_or(fallback.y);
                Bounds::Box(BoxBounds::centered(position, width, height))
            }
            Collider::Circle(c) => Bounds::Circle(CircleBounds {
                x: position.x,
                y: position.y,
                radius: c.radius.unwrap_or(fallback.x.max(fallback.y) / 2.0),
            }),
        }
    }

    /// Overlap test between this collider at `position` and `other` at
    /// `other_position`. Sprite sizes fill in any unset dimension, the same
    /// way `bounds` does.
    pub fn check_collision_with(
        &self,
        position: Vec2,
        sprite_size: Option<Vec2>,
        other: &Collider,
        other_position: Vec2,
        other_sprite_size: Option<Vec2>,
        epsilon: f32,
    ) -> bool {
        self.bounds(position, sprite_size)
            .overlaps(&other.bounds(other_position, other_sprite_size), epsilon)
    }
}
