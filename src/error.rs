//! Physics Error Types
//!
//! Returned by setup-time operations (attaching, registering, validating
//! config). The per-frame step never returns these; it logs and degrades.

use std::fmt;
use crate::game::Entity;

#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// The handle refers to a despawned or never-spawned entity
    DeadEntity(Entity),
    /// Tried to register an entity that carries no collider
    MissingCollider(Entity),
    /// A physics tuning value is out of range
    InvalidConfig(String),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::DeadEntity(e) => write!(f, "{} is not alive", e),
            PhysicsError::MissingCollider(e) => write!(f, "{} has no collider to register", e),
            PhysicsError::InvalidConfig(msg) => write!(f, "Invalid physics config: {}", msg),
        }
    }
}

impl std::error::Error for PhysicsError {}
