//! Debug renderer
//!
//! Draws the world with macroquad primitives: sprites as filled rectangles,
//! colliders as outlines. World coordinates are y-down like the screen; a
//! `View` maps them to pixels.

use macroquad::prelude::{
    draw_circle_lines, draw_rectangle_ex, draw_rectangle_lines, draw_text, screen_height,
    screen_width, Color, DrawRectangleParams,
};
use crate::game::{Entity, World};
use crate::math::Vec2;
use crate::physics::Bounds;

const SOLID_OUTLINE: Color = Color::new(0.35, 0.85, 0.45, 1.0);
const TRIGGER_OUTLINE: Color = Color::new(0.95, 0.8, 0.25, 1.0);
const CONTACT_OUTLINE: Color = Color::new(0.95, 0.3, 0.3, 1.0);
const LABEL_COLOR: Color = Color::new(0.6, 0.6, 0.65, 0.8);

/// World-to-screen mapping
#[derive(Debug, Clone, Copy)]
pub struct View {
    /// World point drawn at the screen center
    pub center: Vec2,
    pub zoom: f32,
}

impl Default for View {
    fn default() -> Self {
        Self { center: Vec2::ZERO, zoom: 1.0 }
    }
}

impl View {
    pub fn to_screen(&self, point: Vec2) -> (f32, f32) {
        (
            (point.x - self.center.x) * self.zoom + screen_width() * 0.5,
            (point.y - self.center.y) * self.zoom + screen_height() * 0.5,
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DebugOptions {
    pub sprites: bool,
    pub colliders: bool,
    pub names: bool,
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self { sprites: true, colliders: true, names: false }
    }
}

/// Entities with sprites, back to front. Ties keep entity order so the
/// draw order is stable between frames.
pub fn sprite_draw_order(world: &World) -> Vec<Entity> {
    let mut order: Vec<(i32, Entity)> = world
        .sprites
        .iter()
        .map(|(entity, sprite)| (sprite.layer, entity))
        .collect();
    order.sort();
    order.into_iter().map(|(_, entity)| entity).collect()
}

pub fn draw_world(world: &World, view: &View, options: &DebugOptions) {
    if options.sprites {
        for entity in sprite_draw_order(world) {
            draw_sprite(world, entity, view);
        }
    }
    if options.colliders {
        let touching = touching_entities(world);
        for (entity, collider) in world.colliders.iter() {
            let color = if touching.contains(&entity) {
                CONTACT_OUTLINE
            } else if collider.is_trigger() {
                TRIGGER_OUTLINE
            } else {
                SOLID_OUTLINE
            };
            if let Some(bounds) = world.collider_bounds(entity) {
                draw_bounds(&bounds, view, color);
            }
        }
    }
    if options.names {
        for (entity, name) in world.names.iter() {
            let (x, y) = view.to_screen(world.global_position(entity));
            draw_text(name, x + 4.0, y - 4.0, 14.0, LABEL_COLOR);
        }
    }
}

fn draw_sprite(world: &World, entity: Entity, view: &View) {
    let Some(sprite) = world.sprites.get(entity) else {
        return;
    };
    let (x, y) = view.to_screen(world.global_position(entity));
    let [r, g, b, a] = sprite.color;
    draw_rectangle_ex(
        x,
        y,
        sprite.width * view.zoom,
        sprite.height * view.zoom,
        DrawRectangleParams {
            offset: macroquad::math::vec2(0.5, 0.5),
            rotation: world.global_rotation(entity),
            color: Color::from_rgba(r, g, b, a),
        },
    );
}

fn draw_bounds(bounds: &Bounds, view: &View, color: Color) {
    match bounds {
        Bounds::Box(b) => {
            let (x, y) = view.to_screen(b.min());
            draw_rectangle_lines(x, y, b.width * view.zoom, b.height * view.zoom, 1.0, color);
        }
        Bounds::Circle(c) => {
            let (x, y) = view.to_screen(Vec2::new(c.x, c.y));
            draw_circle_lines(x, y, c.radius * view.zoom, 1.0, color);
        }
    }
}

/// Everything some rigidbody remembers touching, plus the bodies themselves.
fn touching_entities(world: &World) -> Vec<Entity> {
    let mut touching = Vec::new();
    for (entity, body) in world.rigidbodies.iter() {
        if body.contacts().next().is_some() {
            touching.push(entity);
            touching.extend(body.contacts());
        }
    }
    touching
}
