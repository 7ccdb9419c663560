//! Plain-data components that are not physics.

use serde::{Serialize, Deserialize};
use crate::math::Vec2;

/// Drawable rectangle. Its size doubles as the fallback size for colliders
/// that leave a dimension unset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub width: f32,
    pub height: f32,
    /// RGBA
    #[serde(default = "default_color")]
    pub color: [u8; 4],
    /// Higher layers draw on top
    #[serde(default)]
    pub layer: i32,
}

fn default_color() -> [u8; 4] {
    [255, 255, 255, 255]
}

impl Sprite {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height, color: default_color(), layer: 0 }
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}
