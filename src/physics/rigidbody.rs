//! Rigidbody Component
//!
//! Velocity, gravity settings, bounce, and the set of entities the body was
//! touching at the end of its last move. Only the resolver writes that set.

use std::collections::BTreeSet;
use crate::game::Entity;
use crate::math::Vec2;

/// Downward acceleration in units per second squared.
pub const DEFAULT_GRAVITY_SCALE: f32 = 980.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Rigidbody {
    pub velocity: Vec2,
    pub gravity: bool,
    pub gravity_scale: f32,
    /// Fraction of speed kept, reversed, along the blocked axis. 0..=1.
    pub bounciness: f32,
    pub(crate) last_collisions: BTreeSet<Entity>,
}

impl Rigidbody {
    pub fn new() -> Self {
        Self {
            velocity: Vec2::ZERO,
            gravity: true,
            gravity_scale: DEFAULT_GRAVITY_SCALE,
            bounciness: 0.0,
            last_collisions: BTreeSet::new(),
        }
    }

    /// A body that only moves when told to.
    pub fn kinematic() -> Self {
        Self { gravity: false, ..Self::new() }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_bounciness(mut self, bounciness: f32) -> Self {
        self.bounciness = bounciness.clamp(0.0, 1.0);
        self
    }

    /// Entities this body was touching after its most recent move.
    pub fn contacts(&self) -> impl Iterator<Item = Entity> + '_ {
        self.last_collisions.iter().copied()
    }

    pub fn is_touching(&self, other: Entity) -> bool {
        self.last_collisions.contains(&other)
    }

    /// Add `gravity_scale * dt` to the vertical velocity when gravity is on.
    ///
    /// Does not move anything. A non-finite velocity is zeroed (with a
    /// warning) so it cannot leak into movement.
    pub fn integrate(&mut self, dt: f32) {
        if self.gravity {
            self.velocity.y += self.gravity_scale * dt;
        }
        if !self.velocity.is_finite() {
            log::warn!("rigidbody velocity became non-finite ({:?}), resetting to zero", self.velocity);
            self.velocity = Vec2::ZERO;
        }
    }

    /// Reverse and damp the velocity along one axis after a blocked step.
    pub(crate) fn bounce(&mut self, vertical: bool) {
        if vertical {
            self.velocity.y *= -self.bounciness;
        } else {
            self.velocity.x *= -self.bounciness;
        }
    }
}

impl Default for Rigidbody {
    fn default() -> Self {
        Self::new()
    }
}
