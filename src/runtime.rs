//! Frame Runtime
//!
//! Drives one World through a fixed per-frame order:
//! 1. clear last frame's contact events
//! 2. clamp the frame time
//! 3. behaviors update (input already sampled by the caller)
//! 4. physics step: gravity, then collision-resolved movement
//! 5. flush queued despawns
//!
//! Drawing happens after `tick` returns, so renderers see the settled
//! positions and this frame's contacts.

use crate::game::{Entity, World};
use crate::math::Vec2;
use crate::physics;

/// Input sampled once per frame by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    /// Directional input, each axis in -1..=1
    pub axis: Vec2,
    pub jump: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Clamped frame time in seconds
    pub dt: f32,
    pub input: InputState,
    /// Frames simulated before this one
    pub frame: u64,
}

/// Per-entity logic run once per frame before physics.
pub trait Behavior {
    fn update(&mut self, entity: Entity, world: &mut World, ctx: &FrameContext);
}

/// FPS limit setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FpsLimit {
    Fps30,
    #[default]
    Fps60,
    Unlocked,
}

impl FpsLimit {
    /// Target frame time in seconds (None = unlocked)
    pub fn frame_time(&self) -> Option<f64> {
        match self {
            FpsLimit::Fps30 => Some(1.0 / 30.0),
            FpsLimit::Fps60 => Some(1.0 / 60.0),
            FpsLimit::Unlocked => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            FpsLimit::Fps30 => FpsLimit::Fps60,
            FpsLimit::Fps60 => FpsLimit::Unlocked,
            FpsLimit::Unlocked => FpsLimit::Fps30,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FpsLimit::Fps30 => "30",
            FpsLimit::Fps60 => "60",
            FpsLimit::Unlocked => "unlocked",
        }
    }
}

pub struct Runtime {
    pub world: World,
    behaviors: Vec<(Entity, Box<dyn Behavior>)>,
    frame: u64,
    pub paused: bool,
}

impl Runtime {
    pub fn new(world: World) -> Self {
        Self {
            world,
            behaviors: Vec::new(),
            frame: 0,
            paused: false,
        }
    }

    /// Attach a behavior to an entity. Behaviors run in the order added.
    pub fn add_behavior(&mut self, entity: Entity, behavior: Box<dyn Behavior>) {
        self.behaviors.push((entity, behavior));
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run one frame of simulation.
    pub fn tick(&mut self, raw_dt: f32, input: InputState) {
        if self.paused {
            return;
        }
        self.world.contacts.clear();

        let ctx = FrameContext {
            dt: self.world.physics.clamp_delta_time(raw_dt),
            input,
            frame: self.frame,
        };

        // Behaviors of despawned entities are dropped here
        let world = &self.world;
        self.behaviors.retain(|(entity, _)| world.is_alive(*entity));
        for (entity, behavior) in &mut self.behaviors {
            behavior.update(*entity, &mut self.world, &ctx);
        }

        physics::step(&mut self.world, ctx.dt);
        self.world.flush_despawns();
        self.frame += 1;
    }
}

// =============================================================================
// Stock behaviors
// =============================================================================

/// Steers a rigidbody from input: horizontal axis sets x speed, jump
/// kicks the body upward while it is touching something below it.
pub struct PlatformerControl {
    pub speed: f32,
    pub jump_speed: f32,
}

impl Default for PlatformerControl {
    fn default() -> Self {
        Self { speed: 200.0, jump_speed: 450.0 }
    }
}

impl Behavior for PlatformerControl {
    fn update(&mut self, entity: Entity, world: &mut World, ctx: &FrameContext) {
        let position = world.global_position(entity);
        let grounded = world.rigidbodies.get(entity).is_some_and(|body| {
            body.contacts().any(|other| world.global_position(other).y > position.y)
        });
        let Some(body) = world.rigidbodies.get_mut(entity) else {
            return;
        };
        body.velocity.x = ctx.input.axis.x.clamp(-1.0, 1.0) * self.speed;
        if ctx.input.jump && grounded {
            body.velocity.y = -self.jump_speed;
        }
    }
}

/// Despawns its entity once it passes below `floor_y`.
pub struct KillBelow {
    pub floor_y: f32,
}

impl Behavior for KillBelow {
    fn update(&mut self, entity: Entity, world: &mut World, _ctx: &FrameContext) {
        if world.global_position(entity).y > self.floor_y {
            log::debug!("{} fell out of the world", entity);
            world.despawn(entity);
        }
    }
}
