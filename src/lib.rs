//! brisk2d: a small component-based 2D game engine
//!
//! Entities carry plain-data components (transform, sprite, collider,
//! rigidbody). Rigidbodies move in small sub-steps against every registered
//! collider, rolling back and bouncing on solid hits and reporting
//! enter/stay/exit contacts for both collisions and triggers.
//!
//! Coordinates are y-down: positive y points toward the bottom of the
//! screen, so gravity adds to `velocity.y`.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod game;
pub mod math;
pub mod physics;
pub mod render;
pub mod runtime;
pub mod scene;

pub use error::PhysicsError;
pub use game::{Entity, World};
pub use math::Vec2;
pub use runtime::{Behavior, FrameContext, InputState, Runtime};
pub use scene::{SceneDesc, SceneError};
