//! Game Foundation Module
//!
//! A small component framework for 2D games:
//! - Entity: generational handle, safe to hold across despawns
//! - Component: plain data in sparse per-type storage
//! - World: owns entities, components, and the physics context
//! - Event: contact events, queued and delivered to listeners
//!
//! Component kinds are fixed at compile time; there is no runtime type
//! registration.

pub mod component;
pub mod components;
pub mod entity;
pub mod event;
pub mod transform;
pub mod world;

pub use component::ComponentStorage;
pub use components::Sprite;
pub use entity::Entity;
pub use event::{CollisionListener, ContactEvent, ContactKind, ContactPhase, EventQueue};
pub use transform::Transform;
pub use world::World;
