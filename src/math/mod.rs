//! Math primitives shared by the game framework and physics.

pub mod vec2;

pub use vec2::Vec2;
