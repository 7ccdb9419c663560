//! Rigidbody Resolver
//!
//! Moves a body through the world in small sub-steps, testing the
//! collision registry after each one. Per call:
//! 1. Split the delta into `ceil(max(|dx|, |dy|) / step_size)` equal steps
//! 2. For each step, move optimistically, then look for overlaps:
//!    - first overlap with an entity this call fires Enter (not touching
//!      last move) or Stay (touching last move)
//!    - the moving body always hears the event; the other side only when it
//!      has no rigidbody of its own, so two bodies never double-report
//!    - solid vs solid rolls the step back, bounces along the step's
//!      dominant axis, and ends the move
//!    - the mover's ancestors and descendants are never candidates
//! 3. Contacts from last move that were not seen this move get an Exit,
//!    unless the two shapes are still within `exit_tolerance`; those are
//!    kept as contacts so a body resting on a floor does not flicker
//! 4. The surviving contact set becomes the body's `last_collisions`
//!
//! Gravity is never applied here; see `step`.

use std::collections::BTreeSet;
use crate::game::{ContactEvent, ContactKind, ContactPhase, Entity, World};
use crate::math::Vec2;

/// Upper bound on sub-steps per move. Past this the steps get longer
/// rather than the loop running away on a huge delta.
pub const MAX_SUBSTEPS: u32 = 4096;

/// Number of sub-steps for a delta, always at least 1.
pub fn substep_count(delta: Vec2, step_size: f32) -> u32 {
    let longest = delta.x.abs().max(delta.y.abs());
    let steps = (longest / step_size).ceil();
    if steps >= MAX_SUBSTEPS as f32 {
        log::debug!("move of {:?} capped at {} sub-steps", delta, MAX_SUBSTEPS);
        return MAX_SUBSTEPS;
    }
    (steps as u32).max(1)
}

/// Move `entity` by `delta` with collision resolution.
///
/// Always returns true; the value means the call completed, not that the
/// body got where it was going. Bodies without a collider (or without a
/// rigidbody) just translate. Dead entities and non-finite deltas are
/// logged and ignored.
pub fn move_body(world: &mut World, entity: Entity, delta: Vec2) -> bool {
    if !world.is_alive(entity) {
        log::warn!("move_body on dead {}", entity);
        return true;
    }
    if !delta.is_finite() {
        log::warn!("move_body on {} with non-finite delta {:?}, skipping", entity, delta);
        return true;
    }

    let Some(own_collider) = world.colliders.get(entity).copied() else {
        world.translate(entity, delta);
        return true;
    };
    let last = match world.rigidbodies.get(entity) {
        Some(body) => body.last_collisions.clone(),
        None => {
            world.translate(entity, delta);
            return true;
        }
    };
    if delta == Vec2::ZERO && last.is_empty() {
        return true;
    }

    let config = world.physics;
    let steps = substep_count(delta, config.step_size);
    let step = delta / steps as f32;
    let own_trigger = own_collider.is_trigger();
    // Colliders in the mover's own hierarchy travel with it
    let candidates: Vec<Entity> = world
        .registry
        .snapshot()
        .into_iter()
        .filter(|&other| {
            other != entity
                && !world.is_descendant_of(other, entity)
                && !world.is_descendant_of(entity, other)
        })
        .collect();
    let mut current = BTreeSet::new();

    'stepping: for _ in 0..steps {
        let before = world.local_position(entity).unwrap_or(Vec2::ZERO);
        world.translate(entity, step);

        let Some(own_bounds) = world.collider_bounds(entity) else {
            break;
        };

        for &other in &candidates {
            // Stale registry entries (despawned or detached) have no collider
            let Some(other_collider) = world.colliders.get(other).copied() else {
                continue;
            };
            let Some(other_bounds) = world.collider_bounds(other) else {
                continue;
            };
            if !own_bounds.overlaps(&other_bounds, config.contact_epsilon) {
                continue;
            }

            if current.insert(other) {
                let phase = if last.contains(&other) {
                    ContactPhase::Stay
                } else {
                    ContactPhase::Enter
                };
                notify_pair(world, entity, own_trigger, other, Some(other_collider.is_trigger()), phase);
            }

            if !own_trigger && !other_collider.is_trigger() {
                world.set_local_position(entity, before);
                // A zero step has no axis to bounce on
                if step != Vec2::ZERO {
                    let vertical = step.y.abs() > step.x.abs();
                    if let Some(body) = world.rigidbodies.get_mut(entity) {
                        body.bounce(vertical);
                    }
                }
                log::debug!("{} blocked by {} after {:?}", entity, other, step);
                break 'stepping;
            }
        }
    }

    let own_bounds = world.collider_bounds(entity);
    let ended: Vec<Entity> = last.difference(&current).copied().collect();
    for other in ended {
        let other_bounds = if world.registry.contains(other) {
            world.collider_bounds(other)
        } else {
            None
        };
        let still_close = match (own_bounds, other_bounds) {
            (Some(a), Some(b)) => a.within(&b, config.contact_epsilon, config.exit_tolerance),
            _ => false,
        };
        if still_close {
            current.insert(other);
            continue;
        }
        let other_trigger = world.colliders.get(other).map(|c| c.is_trigger());
        notify_pair(world, entity, own_trigger, other, other_trigger, ContactPhase::Exit);
    }

    if let Some(body) = world.rigidbodies.get_mut(entity) {
        body.last_collisions = current;
    }
    true
}

/// Fire one phase of a contact on the mover and, when it is passive, on the
/// other entity. `other_trigger` is None when the other side has lost its
/// collider (or died), in which case only the mover hears about it.
fn notify_pair(
    world: &mut World,
    mover: Entity,
    mover_trigger: bool,
    other: Entity,
    other_trigger: Option<bool>,
    phase: ContactPhase,
) {
    world.dispatch(ContactEvent {
        target: mover,
        other,
        phase,
        kind: ContactKind::for_trigger_flag(mover_trigger),
    });

    let Some(other_trigger) = other_trigger else {
        return;
    };
    if world.is_alive(other) && !world.rigidbodies.contains(other) {
        world.dispatch(ContactEvent {
            target: other,
            other: mover,
            phase,
            kind: ContactKind::for_trigger_flag(other_trigger),
        });
    }
}

/// Advance every rigidbody by one frame.
///
/// `dt` is clamped by the world's config. Bodies are visited in entity
/// order; each integrates gravity and then moves by `velocity * dt`.
pub fn step(world: &mut World, dt: f32) {
    let dt = world.physics.clamp_delta_time(dt);
    for entity in world.rigidbodies.entities() {
        let Some(body) = world.rigidbodies.get_mut(entity) else {
            continue;
        };
        body.integrate(dt);
        let delta = body.velocity * dt;
        move_body(world, entity, delta);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use super::*;
    use crate::game::CollisionListener;
    use crate::physics::{Collider, Rigidbody};

    fn count(world: &World, target: Entity, phase: ContactPhase, kind: ContactKind) -> usize {
        world
            .contacts
            .iter()
            .filter(|e| e.target == target && e.phase == phase && e.kind == kind)
            .count()
    }

    fn solid_wall(world: &mut World, at: Vec2) -> Entity {
        let wall = world.spawn_at(at);
        world.attach_collider(wall, Collider::solid_box(10.0, 10.0)).unwrap();
        wall
    }

    fn mover(world: &mut World, at: Vec2, collider: Collider) -> Entity {
        let e = world.spawn_at(at);
        world.attach_collider(e, collider).unwrap();
        world.attach_rigidbody(e, Rigidbody::kinematic()).unwrap();
        e
    }

    #[test]
    fn test_substep_count() {
        assert_eq!(substep_count(Vec2::ZERO, 0.5), 1);
        assert_eq!(substep_count(Vec2::new(0.2, 0.0), 0.5), 1);
        assert_eq!(substep_count(Vec2::new(1.0, -2.1), 0.5), 5);
        assert_eq!(substep_count(Vec2::new(1e12, 0.0), 0.5), MAX_SUBSTEPS);
    }

    #[test]
    fn test_free_motion_without_collider() {
        let mut world = World::new();
        let e = world.spawn();
        world.attach_rigidbody(e, Rigidbody::kinematic()).unwrap();
        solid_wall(&mut world, Vec2::new(3.0, 0.0));

        assert!(move_body(&mut world, e, Vec2::new(5.0, 0.0)));
        assert_eq!(world.local_position(e), Some(Vec2::new(5.0, 0.0)));
        assert!(world.contacts.is_empty());
    }

    #[test]
    fn test_non_finite_delta_is_ignored() {
        let mut world = World::new();
        let e = mover(&mut world, Vec2::ZERO, Collider::solid_circle(1.0));
        assert!(move_body(&mut world, e, Vec2::new(f32::NAN, 1.0)));
        assert_eq!(world.local_position(e), Some(Vec2::ZERO));
    }

    #[test]
    fn test_stops_short_of_wall() {
        let mut world = World::new();
        // Wall spans x 15..25
        let wall = solid_wall(&mut world, Vec2::new(20.0, 0.0));
        // Mover spans x -5..5, needs to travel 10 to touch
        let e = mover(&mut world, Vec2::ZERO, Collider::solid_box(10.0, 10.0));

        move_body(&mut world, e, Vec2::new(30.0, 0.0));
        let x = world.local_position(e).unwrap().x;
        assert!(x <= 10.0 && x >= 10.0 - world.physics.step_size, "x = {}", x);
        assert!(world.rigidbodies.get(e).unwrap().is_touching(wall));
    }

    #[test]
    fn test_rollback_converges_with_finer_steps() {
        let finish = |step_size: f32| {
            let mut world = World::new();
            world.physics.step_size = step_size;
            solid_wall(&mut world, Vec2::new(20.0, 0.0));
            let e = mover(&mut world, Vec2::ZERO, Collider::solid_box(10.0, 10.0));
            move_body(&mut world, e, Vec2::new(37.0, 0.0));
            world.local_position(e).unwrap().x
        };
        let coarse = finish(0.5);
        let fine = finish(0.25);
        // Both end within one coarse step of the wall face at x = 10
        assert!((coarse - fine).abs() <= 0.5);
        assert!(10.0 - coarse <= 0.5 && 10.0 - fine <= 0.5);
    }

    #[test]
    fn test_enter_stay_exit_lifecycle() {
        let mut world = World::new();
        let wall = solid_wall(&mut world, Vec2::new(20.0, 0.0));
        let e = mover(&mut world, Vec2::ZERO, Collider::solid_box(10.0, 10.0));

        // Frame 1: run into the wall
        move_body(&mut world, e, Vec2::new(12.0, 0.0));
        assert_eq!(count(&world, e, ContactPhase::Enter, ContactKind::Collision), 1);
        assert_eq!(count(&world, wall, ContactPhase::Enter, ContactKind::Collision), 1);
        world.contacts.clear();

        // Frame 2: keep pushing
        move_body(&mut world, e, Vec2::new(2.0, 0.0));
        assert_eq!(count(&world, e, ContactPhase::Enter, ContactKind::Collision), 0);
        assert_eq!(count(&world, e, ContactPhase::Stay, ContactKind::Collision), 1);
        assert_eq!(count(&world, wall, ContactPhase::Stay, ContactKind::Collision), 1);
        world.contacts.clear();

        // Frame 3: leave well past the exit tolerance
        move_body(&mut world, e, Vec2::new(-50.0, 0.0));
        assert_eq!(count(&world, e, ContactPhase::Exit, ContactKind::Collision), 1);
        assert_eq!(count(&world, wall, ContactPhase::Exit, ContactKind::Collision), 1);
        assert!(!world.rigidbodies.get(e).unwrap().is_touching(wall));
        world.contacts.clear();

        // Frame 4: nothing left to report
        move_body(&mut world, e, Vec2::new(-1.0, 0.0));
        assert!(world.contacts.is_empty());
    }

    #[test]
    fn test_small_retreat_is_not_an_exit() {
        let mut world = World::new();
        let wall = solid_wall(&mut world, Vec2::new(20.0, 0.0));
        let e = mover(&mut world, Vec2::ZERO, Collider::solid_box(10.0, 10.0));
        move_body(&mut world, e, Vec2::new(12.0, 0.0));
        world.contacts.clear();

        move_body(&mut world, e, Vec2::new(-1.0, 0.0));
        assert_eq!(count(&world, e, ContactPhase::Exit, ContactKind::Collision), 0);
        assert!(world.rigidbodies.get(e).unwrap().is_touching(wall));
    }

    #[test]
    fn test_two_bodies_do_not_double_report() {
        let mut world = World::new();
        let a = mover(&mut world, Vec2::ZERO, Collider::solid_box(10.0, 10.0));
        let b = mover(&mut world, Vec2::new(20.0, 0.0), Collider::solid_box(10.0, 10.0));

        move_body(&mut world, a, Vec2::new(12.0, 0.0));
        // b carries a rigidbody, so only a hears about it
        assert_eq!(count(&world, a, ContactPhase::Enter, ContactKind::Collision), 1);
        assert_eq!(world.contacts.iter().filter(|ev| ev.target == b).count(), 0);
    }

    #[test]
    fn test_trigger_does_not_block() {
        let mut world = World::new();
        let zone = world.spawn_at(Vec2::new(20.0, 0.0));
        world.attach_collider(zone, Collider::trigger_box(10.0, 10.0)).unwrap();
        let e = mover(&mut world, Vec2::ZERO, Collider::solid_circle(2.0));
        world.rigidbodies.get_mut(e).unwrap().velocity = Vec2::new(300.0, 0.0);

        for _ in 0..30 {
            step(&mut world, 1.0 / 60.0);
        }

        let body = world.rigidbodies.get(e).unwrap();
        assert_eq!(body.velocity, Vec2::new(300.0, 0.0));
        assert!((world.local_position(e).unwrap().x - 150.0).abs() < 0.01);
        assert_eq!(count(&world, zone, ContactPhase::Enter, ContactKind::Trigger), 1);
        assert!(count(&world, zone, ContactPhase::Stay, ContactKind::Trigger) > 0);
        assert_eq!(count(&world, zone, ContactPhase::Exit, ContactKind::Trigger), 1);
        // The solid mover hears the collision family
        assert_eq!(count(&world, e, ContactPhase::Enter, ContactKind::Collision), 1);
    }

    #[test]
    fn test_trigger_mover_hears_trigger_hooks() {
        let mut world = World::new();
        let wall = solid_wall(&mut world, Vec2::new(20.0, 0.0));
        let e = mover(&mut world, Vec2::ZERO, Collider::trigger_circle(2.0));

        move_body(&mut world, e, Vec2::new(20.0, 0.0));
        assert_eq!(world.local_position(e), Some(Vec2::new(20.0, 0.0)));
        assert_eq!(count(&world, e, ContactPhase::Enter, ContactKind::Trigger), 1);
        assert_eq!(count(&world, wall, ContactPhase::Enter, ContactKind::Collision), 1);
    }

    #[test]
    fn test_bounce_on_dominant_step_axis() {
        let mut world = World::new();
        // Floor top at y = 95
        solid_wall(&mut world, Vec2::new(0.0, 100.0));
        let e = mover(&mut world, Vec2::new(0.0, 80.0), Collider::solid_circle(5.0));
        {
            let body = world.rigidbodies.get_mut(e).unwrap();
            body.bounciness = 0.5;
            body.velocity = Vec2::new(0.0, 600.0);
        }

        step(&mut world, 1.0 / 30.0);
        let body = world.rigidbodies.get(e).unwrap();
        assert_eq!(body.velocity, Vec2::new(0.0, -300.0));
    }

    #[test]
    fn test_diagonal_bounce_uses_step_axis() {
        let mut world = World::new();
        // Tall wall to the right, face at x = 15
        let wall = world.spawn_at(Vec2::new(20.0, 0.0));
        world.attach_collider(wall, Collider::solid_box(10.0, 200.0)).unwrap();
        let e = mover(&mut world, Vec2::ZERO, Collider::solid_box(10.0, 10.0));
        {
            let body = world.rigidbodies.get_mut(e).unwrap();
            body.bounciness = 1.0;
            body.velocity = Vec2::new(40.0, 20.0);
        }
        move_body(&mut world, e, Vec2::new(40.0, 20.0));
        assert_eq!(world.rigidbodies.get(e).unwrap().velocity, Vec2::new(-40.0, 20.0));
    }

    #[test]
    fn test_zero_step_does_not_bounce() {
        let mut world = World::new();
        let wall = solid_wall(&mut world, Vec2::new(20.0, 0.0));
        // Starts overlapping the wall
        let e = mover(&mut world, Vec2::new(17.0, 0.0), Collider::solid_box(10.0, 10.0));
        world.rigidbodies.get_mut(e).unwrap().bounciness = 1.0;
        move_body(&mut world, e, Vec2::new(0.0, 0.1));
        assert!(world.rigidbodies.get(e).unwrap().is_touching(wall));
        world.contacts.clear();

        world.rigidbodies.get_mut(e).unwrap().velocity = Vec2::new(30.0, 5.0);
        move_body(&mut world, e, Vec2::ZERO);
        assert_eq!(count(&world, e, ContactPhase::Stay, ContactKind::Collision), 1);
        assert_eq!(world.rigidbodies.get(e).unwrap().velocity, Vec2::new(30.0, 5.0));
        assert_eq!(world.local_position(e), Some(Vec2::new(17.0, 0.0)));
    }

    #[test]
    fn test_own_hierarchy_is_not_an_obstacle() {
        let mut world = World::new();
        let body = mover(&mut world, Vec2::ZERO, Collider::solid_box(10.0, 10.0));
        let child = world.spawn_at(Vec2::new(0.0, 4.0));
        world.attach_collider(child, Collider::solid_box(4.0, 4.0)).unwrap();
        world.set_parent(child, body);

        move_body(&mut world, body, Vec2::new(10.0, 0.0));
        assert_eq!(world.local_position(body), Some(Vec2::new(10.0, 0.0)));
        assert_eq!(world.global_position(child), Vec2::new(10.0, 4.0));
        assert!(world.contacts.is_empty());
        assert_eq!(world.rigidbodies.get(body).unwrap().contacts().count(), 0);

        // Same the other way round: a child body moving inside its parent
        world.attach_rigidbody(child, Rigidbody::kinematic()).unwrap();
        move_body(&mut world, child, Vec2::new(1.0, 0.0));
        assert_eq!(world.local_position(child), Some(Vec2::new(1.0, 4.0)));
        assert!(world.contacts.is_empty());
    }

    #[test]
    fn test_child_collider_still_hits_strangers() {
        let mut world = World::new();
        let wall = solid_wall(&mut world, Vec2::new(20.0, 0.0));
        let body = mover(&mut world, Vec2::ZERO, Collider::solid_box(10.0, 10.0));
        let child = world.spawn_at(Vec2::new(0.0, 4.0));
        world.attach_collider(child, Collider::solid_box(4.0, 4.0)).unwrap();
        world.set_parent(child, body);

        // The body itself stops at the wall
        move_body(&mut world, body, Vec2::new(30.0, 0.0));
        assert!(world.local_position(body).unwrap().x <= 10.0);
        assert!(world.rigidbodies.get(body).unwrap().is_touching(wall));
        assert!(!world.rigidbodies.get(body).unwrap().is_touching(child));
    }

    #[test]
    fn test_zero_delta_short_circuits_only_when_untouched() {
        let mut world = World::new();
        let wall = solid_wall(&mut world, Vec2::new(20.0, 0.0));
        let e = mover(&mut world, Vec2::ZERO, Collider::solid_box(10.0, 10.0));

        move_body(&mut world, e, Vec2::ZERO);
        assert!(world.contacts.is_empty());

        move_body(&mut world, e, Vec2::new(12.0, 0.0));
        world.contacts.clear();
        world.despawn_immediate(wall);

        // Still processes: the vanished wall gets its exit
        move_body(&mut world, e, Vec2::ZERO);
        assert_eq!(count(&world, e, ContactPhase::Exit, ContactKind::Collision), 1);
        assert_eq!(world.rigidbodies.get(e).unwrap().contacts().count(), 0);
    }

    #[test]
    fn test_resting_contact_is_stable() {
        let mut world = World::new();
        let floor = world.spawn_at(Vec2::new(0.0, 100.0));
        world.attach_collider(floor, Collider::solid_box(200.0, 20.0)).unwrap();
        let ball = world.spawn_at(Vec2::new(0.0, 0.0));
        world.attach_collider(ball, Collider::solid_circle(10.0)).unwrap();
        world.attach_rigidbody(ball, Rigidbody::new()).unwrap();

        let mut resting_frames = 0;
        for _ in 0..240 {
            world.contacts.clear();
            step(&mut world, 1.0 / 60.0);
            let touching = world.rigidbodies.get(ball).unwrap().is_touching(floor);
            if resting_frames >= 2 {
                assert!(touching, "contact with the floor was dropped while resting");
                assert_eq!(count(&world, ball, ContactPhase::Exit, ContactKind::Collision), 0);
                assert_eq!(count(&world, ball, ContactPhase::Enter, ContactKind::Collision), 0);
            }
            if touching {
                resting_frames += 1;
            }
        }
        assert!(resting_frames > 200);

        let y = world.local_position(ball).unwrap().y;
        // Floor top is at 90; the ball sits within a step of it
        assert!(y <= 80.0 && y > 80.0 - 2.0 * world.physics.step_size, "y = {}", y);
    }

    #[derive(Default)]
    struct Log {
        enters: Vec<Entity>,
        exits: Vec<Entity>,
    }

    struct Recorder(Rc<RefCell<Log>>);

    impl CollisionListener for Recorder {
        fn on_collision_enter(&mut self, other: Entity) {
            self.0.borrow_mut().enters.push(other);
        }
        fn on_collision_exit(&mut self, other: Entity) {
            self.0.borrow_mut().exits.push(other);
        }
    }

    #[test]
    fn test_listener_hooks_fire_on_passive_side() {
        let mut world = World::new();
        let wall = solid_wall(&mut world, Vec2::new(20.0, 0.0));
        let log = Rc::new(RefCell::new(Log::default()));
        world.attach_listener(wall, Box::new(Recorder(log.clone()))).unwrap();
        let e = mover(&mut world, Vec2::ZERO, Collider::solid_box(10.0, 10.0));

        move_body(&mut world, e, Vec2::new(12.0, 0.0));
        move_body(&mut world, e, Vec2::new(-40.0, 0.0));

        let log = log.borrow();
        assert_eq!(log.enters, vec![e]);
        assert_eq!(log.exits, vec![e]);
    }
}
