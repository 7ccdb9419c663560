//! Physics tuning
//!
//! Distances are world units (pixels in the sandbox), times are seconds.

use serde::{Serialize, Deserialize};
use crate::error::PhysicsError;

/// Default values, exposed so tests and scenes can reason about them.
pub mod defaults {
    /// Longest displacement a single sub-step may cover
    pub const STEP_SIZE: f32 = 0.5;
    /// Slack added to box-box overlap so touching boxes count as colliding
    pub const CONTACT_EPSILON: f32 = 0.01;
    /// Extra reach used only when deciding whether a contact has ended
    pub const EXIT_TOLERANCE: f32 = 2.5;
    /// Frame time ceiling, keeps a long stall from launching bodies
    pub const MAX_DELTA_TIME: f32 = 0.1;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub step_size: f32,
    pub contact_epsilon: f32,
    pub exit_tolerance: f32,
    pub max_delta_time: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            step_size: defaults::STEP_SIZE,
            contact_epsilon: defaults::CONTACT_EPSILON,
            exit_tolerance: defaults::EXIT_TOLERANCE,
            max_delta_time: defaults::MAX_DELTA_TIME,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let fields = [
            ("step_size", self.step_size),
            ("contact_epsilon", self.contact_epsilon),
            ("exit_tolerance", self.exit_tolerance),
            ("max_delta_time", self.max_delta_time),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(PhysicsError::InvalidConfig(format!("{} must be finite, got {}", name, value)));
            }
        }
        if self.step_size <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!("step_size must be positive, got {}", self.step_size)));
        }
        if self.max_delta_time <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!("max_delta_time must be positive, got {}", self.max_delta_time)));
        }
        if self.contact_epsilon < 0.0 || self.exit_tolerance < 0.0 {
            return Err(PhysicsError::InvalidConfig("tolerances cannot be negative".to_string()));
        }
        Ok(())
    }

    /// Clamp a raw frame time into `[0, max_delta_time]`. NaN becomes 0.
    pub fn clamp_delta_time(&self, dt: f32) -> f32 {
        if dt.is_nan() {
            return 0.0;
        }
        dt.clamp(0.0, self.max_delta_time)
    }
}
