//! Collider Geometry
//!
//! World-space bounds for the two collider shapes and the pairwise overlap
//! tests between them:
//! - box vs box: AABB test, each comparison widened by a small epsilon so
//!   boxes that exactly touch still count as colliding
//! - circle vs circle: strict `distance < r1 + r2`, tangent circles miss
//! - circle vs box: clamp the circle center into the box, then a strict
//!   point-distance test. Box vs circle routes through the same function.
//!
//! Boxes are center-anchored: `x, y` is the top-left corner computed as
//! `position - size / 2`. Circles store their center.

use serde::{Serialize, Deserialize};
use crate::math::Vec2;

/// Axis-aligned rectangle, `x, y` at the top-left (min) corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoxBounds {
    /// Rectangle of the given size centered on `center`.
    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleBounds {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl CircleBounds {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    Box(BoxBounds),
    Circle(CircleBounds),
}

impl Bounds {
    pub fn center(&self) -> Vec2 {
        match self {
            Bounds::Box(b) => b.center(),
            Bounds::Circle(c) => c.center(),
        }
    }

    /// Contact test used while moving.
    pub fn overlaps(&self, other: &Bounds, epsilon: f32) -> bool {
        self.test(other, epsilon, 0.0)
    }

    /// Looser test used before reporting that a contact ended: both shapes
    /// are treated as `margin` larger than they are.
    pub fn within(&self, other: &Bounds, epsilon: f32, margin: f32) -> bool {
        self.test(other, epsilon + margin, margin)
    }

    fn test(&self, other: &Bounds, box_slack: f32, round_slack: f32) -> bool {
        match (self, other) {
            (Bounds::Box(a), Bounds::Box(b)) => box_box(a, b, box_slack),
            (Bounds::Circle(a), Bounds::Circle(b)) => circle_circle(a, b, round_slack),
            (Bounds::Circle(c), Bounds::Box(b)) => circle_box(c, b, round_slack),
            (Bounds::Box(b), Bounds::Circle(c)) => circle_box(c, b, round_slack),
        }
    }
}

/// AABB overlap with `slack` added on each compared edge.
///
/// Zero-size boxes are not special-cased: two of them within `slack` of
/// each other still report a hit.
pub fn box_box(a: &BoxBounds, b: &BoxBounds, slack: f32) -> bool {
    a.x < b.x + b.width + slack
        && a.x + a.width + slack > b.x
        && a.y < b.y + b.height + slack
        && a.y + a.height + slack > b.y
}

pub fn circle_circle(a: &CircleBounds, b: &CircleBounds, slack: f32) -> bool {
    a.center().distance(b.center()) < a.radius + b.radius + slack
}

/// Closest-point test. A box without area never overlaps a circle.
pub fn circle_box(c: &CircleBounds, b: &BoxBounds, slack: f32) -> bool {
    if !b.has_area() {
        return false;
    }
    let center = c.center();
    let closest = center.clamp(b.min(), b.max());
    center.distance(closest) < c.radius + slack
}
