//! Scene loading
//!
//! Scenes are RON (Rusty Object Notation) descriptions of entities and the
//! components they start with. A scene is validated completely before any
//! entity is spawned, so a bad file fails at load time with a message
//! instead of misbehaving inside the frame loop.
//!
//! ```ron
//! (
//!     name: "drop",
//!     entities: [
//!         (name: "floor", position: (x: 0.0, y: 200.0),
//!          collider: Some(Box((width: Some(400.0), height: Some(20.0))))),
//!         (name: "ball", position: (x: 0.0, y: 0.0),
//!          collider: Some(Circle((radius: Some(10.0)))),
//!          rigidbody: Some((bounciness: 0.3))),
//!     ],
//! )
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::error::PhysicsError;
use crate::game::{Entity, Sprite, World};
use crate::math::Vec2;
use crate::physics::{Collider, PhysicsConfig, Rigidbody};
use crate::physics::rigidbody::DEFAULT_GRAVITY_SCALE;

/// Validation limits to keep a malformed file from exhausting memory
pub mod limits {
    pub const MAX_ENTITIES: usize = 4096;
    pub const MAX_NAME_LEN: usize = 128;
    /// Largest coordinate, size, or speed accepted
    pub const MAX_COORD: f32 = 1_000_000.0;
}

#[derive(Debug)]
pub enum SceneError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Validation(String),
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneError::Parse(e)
    }
}

impl From<PhysicsError> for SceneError {
    fn from(e: PhysicsError) -> Self {
        SceneError::Validation(e.to_string())
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Io(e) => write!(f, "IO error: {}", e),
            SceneError::Parse(e) => write!(f, "Parse error: {}", e),
            SceneError::Validation(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for SceneError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidbodyDesc {
    #[serde(default)]
    pub velocity: Vec2,
    #[serde(default = "default_true")]
    pub gravity: bool,
    #[serde(default = "default_gravity_scale")]
    pub gravity_scale: f32,
    #[serde(default)]
    pub bounciness: f32,
}

fn default_true() -> bool {
    true
}

fn default_gravity_scale() -> f32 {
    DEFAULT_GRAVITY_SCALE
}

impl RigidbodyDesc {
    fn to_rigidbody(&self) -> Rigidbody {
        let mut body = Rigidbody::new()
            .with_velocity(self.velocity)
            .with_gravity_scale(self.gravity_scale)
            .with_bounciness(self.bounciness);
        body.gravity = self.gravity;
        body
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDesc {
    pub name: String,
    #[serde(default)]
    pub position: Vec2,
    #[serde(default)]
    pub rotation: f32,
    /// Name of an entity listed earlier in the same scene
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub collider: Option<Collider>,
    #[serde(default)]
    pub rigidbody: Option<RigidbodyDesc>,
    #[serde(default)]
    pub sprite: Option<Sprite>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDesc {
    pub name: String,
    #[serde(default)]
    pub physics: Option<PhysicsConfig>,
    pub entities: Vec<EntityDesc>,
}

/// Scene entity names mapped to the entities spawned for them.
pub type SceneHandles = HashMap<String, Entity>;

/// Finite and within `limits::MAX_COORD`
fn is_valid_float(f: f32) -> bool {
    f.is_finite() && f.abs() <= limits::MAX_COORD
}

fn validate_vec(v: Vec2, what: &str) -> Result<(), String> {
    if !is_valid_float(v.x) || !is_valid_float(v.y) {
        return Err(format!("{}: invalid vector ({}, {})", what, v.x, v.y));
    }
    Ok(())
}

fn validate_size(value: Option<f32>, what: &str) -> Result<(), String> {
    match value {
        Some(v) if !is_valid_float(v) || v < 0.0 => Err(format!("{}: invalid size {}", what, v)),
        _ => Ok(()),
    }
}

fn validate_collider(collider: &Collider, context: &str) -> Result<(), String> {
    match collider {
        Collider::Box(b) => {
            validate_size(b.width, &format!("{} collider width", context))?;
            validate_size(b.height, &format!("{} collider height", context))
        }
        Collider::Circle(c) => validate_size(c.radius, &format!("{} collider radius", context)),
    }
}

fn validate_rigidbody(body: &RigidbodyDesc, context: &str) -> Result<(), String> {
    validate_vec(body.velocity, &format!("{} velocity", context))?;
    if !is_valid_float(body.gravity_scale) {
        return Err(format!("{}: invalid gravity_scale {}", context, body.gravity_scale));
    }
    if !(0.0..=1.0).contains(&body.bounciness) {
        return Err(format!("{}: bounciness {} outside 0..=1", context, body.bounciness));
    }
    Ok(())
}

fn validate_sprite(sprite: &Sprite, context: &str) -> Result<(), String> {
    validate_size(Some(sprite.width), &format!("{} sprite width", context))?;
    validate_size(Some(sprite.height), &format!("{} sprite height", context))
}

impl SceneDesc {
    pub fn from_ron(text: &str) -> Result<Self, SceneError> {
        let scene: SceneDesc = ron::from_str(text)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let text = fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::Validation(format!("serialize failed: {}", e)))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Check the whole scene without touching a world.
    pub fn validate(&self) -> Result<(), SceneError> {
        if let Some(config) = &self.physics {
            config.validate()?;
        }
        if self.entities.len() > limits::MAX_ENTITIES {
            return Err(SceneError::Validation(format!(
                "too many entities ({} > {})", self.entities.len(), limits::MAX_ENTITIES)));
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (i, desc) in self.entities.iter().enumerate() {
            let context = format!("entity[{}] '{}'", i, desc.name);
            if desc.name.is_empty() || desc.name.len() > limits::MAX_NAME_LEN {
                return Err(SceneError::Validation(format!("{}: name must be 1..={} bytes", context, limits::MAX_NAME_LEN)));
            }
            if seen.contains_key(desc.name.as_str()) {
                return Err(SceneError::Validation(format!("{}: duplicate name", context)));
            }
            if let Some(parent) = &desc.parent {
                if !seen.contains_key(parent.as_str()) {
                    return Err(SceneError::Validation(format!(
                        "{}: parent '{}' must be an entity listed earlier", context, parent)));
                }
            }
            validate_vec(desc.position, &context).map_err(SceneError::Validation)?;
            if !is_valid_float(desc.rotation) {
                return Err(SceneError::Validation(format!("{}: invalid rotation {}", context, desc.rotation)));
            }
            if let Some(collider) = &desc.collider {
                validate_collider(collider, &context).map_err(SceneError::Validation)?;
            }
            if let Some(body) = &desc.rigidbody {
                validate_rigidbody(body, &context).map_err(SceneError::Validation)?;
            }
            if let Some(sprite) = &desc.sprite {
                validate_sprite(sprite, &context).map_err(SceneError::Validation)?;
            }
            seen.insert(desc.name.as_str(), i);
        }
        Ok(())
    }

    /// Validate, then spawn every entity into `world`.
    ///
    /// Sprites are attached before colliders so sprite-sized colliders
    /// find their size. A scene physics config replaces the world's.
    pub fn build(&self, world: &mut World) -> Result<SceneHandles, SceneError> {
        self.validate()?;
        if let Some(config) = self.physics {
            world.physics = config;
        }

        let mut handles = SceneHandles::new();
        for desc in &self.entities {
            let entity = world.spawn_at(desc.position);
            world.set_name(entity, desc.name.clone());
            if let Some(t) = world.transforms.get_mut(entity) {
                t.rotation = desc.rotation;
            }
            if let Some(parent) = desc.parent.as_ref().and_then(|p| handles.get(p)) {
                world.set_parent(entity, *parent);
            }
            if let Some(sprite) = desc.sprite {
                world.attach_sprite(entity, sprite)?;
            }
            if let Some(collider) = desc.collider {
                world.attach_collider(entity, collider)?;
            }
            if let Some(body) = &desc.rigidbody {
                world.attach_rigidbody(entity, body.to_rigidbody())?;
            }
            handles.insert(desc.name.clone(), entity);
        }
        log::debug!("built scene '{}' with {} entities", self.name, handles.len());
        Ok(handles)
    }
}
