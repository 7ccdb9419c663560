//! Collision and rigidbody physics
//!
//! - `shapes`: world-space bounds and pairwise overlap tests
//! - `collider`: the box/circle collider component
//! - `registry`: which colliders can currently be hit
//! - `rigidbody`: velocity, gravity, bounce, contact memory
//! - `resolver`: stepped movement with rollback and contact events
//!
//! Everything runs on the simulation thread, once per frame, to completion.

pub mod collider;
pub mod config;
pub mod registry;
pub mod resolver;
pub mod rigidbody;
pub mod shapes;

pub use collider::{BoxCollider, CircleCollider, Collider};
pub use config::PhysicsConfig;
pub use registry::CollisionRegistry;
pub use resolver::{move_body, step};
pub use rigidbody::Rigidbody;
pub use shapes::{Bounds, BoxBounds, CircleBounds};
