//! brisk2d sandbox
//!
//! Loads a RON scene (first argument, or the built-in demo) and runs it.
//! Arrow keys steer the entity named `player`, space jumps.
//! P pauses, F cycles the FPS limit, C/N toggle collider outlines and names.

use std::path::Path;
use brisk2d::render::{self, DebugOptions, View};
use brisk2d::runtime::{FpsLimit, KillBelow, PlatformerControl};
use brisk2d::{InputState, Runtime, SceneDesc, SceneError, World, VERSION};
use macroquad::prelude::*;

const DEMO_SCENE: &str = include_str!("../demos/drop.ron");

/// Bodies below this are gone for good
const KILL_Y: f32 = 2000.0;

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging() {
    let level = match std::env::var("BRISK_LOG").as_deref() {
        Ok("trace") => log::LevelFilter::Trace,
        Ok("debug") => log::LevelFilter::Debug,
        Ok("warn") => log::LevelFilter::Warn,
        _ => log::LevelFilter::Info,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn window_conf() -> Conf {
    Conf {
        window_title: format!("brisk2d sandbox v{}", VERSION),
        window_width: 1280,
        window_height: 720,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn load_scene() -> Result<SceneDesc, SceneError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading scene {}", path);
            SceneDesc::load(Path::new(&path))
        }
        None => SceneDesc::from_ron(DEMO_SCENE),
    }
}

fn build_runtime(scene: &SceneDesc) -> Result<Runtime, SceneError> {
    let mut world = World::new();
    let handles = scene.build(&mut world)?;
    log::info!("scene '{}': {} entities", scene.name, world.entity_count());

    let bodies = world.rigidbodies.entities();
    let mut runtime = Runtime::new(world);
    match handles.get("player") {
        Some(&player) => runtime.add_behavior(player, Box::new(PlatformerControl::default())),
        None => log::warn!("scene has no entity named 'player'; input is ignored"),
    }
    for body in bodies {
        runtime.add_behavior(body, Box::new(KillBelow { floor_y: KILL_Y }));
    }
    Ok(runtime)
}

fn sample_input() -> InputState {
    let mut axis = brisk2d::Vec2::ZERO;
    if is_key_down(KeyCode::Left) {
        axis.x -= 1.0;
    }
    if is_key_down(KeyCode::Right) {
        axis.x += 1.0;
    }
    if is_key_down(KeyCode::Up) {
        axis.y -= 1.0;
    }
    if is_key_down(KeyCode::Down) {
        axis.y += 1.0;
    }
    InputState {
        axis,
        jump: is_key_pressed(KeyCode::Space),
    }
}

/// Sleep for the bulk of the remaining frame time, then spin for precision
fn wait_for_frame(frame_start: f64, target_frame_time: f64) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let spin_margin = 0.002;
        while get_time() - frame_start + spin_margin < target_frame_time {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
    }
    while get_time() - frame_start < target_frame_time {
        std::hint::spin_loop();
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    init_logging();

    let scene = match load_scene() {
        Ok(scene) => scene,
        Err(e) => {
            log::error!("{}", e);
            return;
        }
    };
    let mut runtime = match build_runtime(&scene) {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("{}", e);
            return;
        }
    };

    let mut fps_limit = FpsLimit::default();
    let mut options = DebugOptions::default();
    let view = View::default();

    loop {
        let frame_start = get_time();

        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        if is_key_pressed(KeyCode::P) {
            runtime.paused = !runtime.paused;
        }
        if is_key_pressed(KeyCode::F) {
            fps_limit = fps_limit.next();
        }
        if is_key_pressed(KeyCode::C) {
            options.colliders = !options.colliders;
        }
        if is_key_pressed(KeyCode::N) {
            options.names = !options.names;
        }
        if is_key_pressed(KeyCode::R) {
            match build_runtime(&scene) {
                Ok(fresh) => runtime = fresh,
                Err(e) => log::error!("reload failed: {}", e),
            }
        }

        runtime.tick(get_frame_time(), sample_input());

        clear_background(Color::from_rgba(18, 19, 24, 255));
        render::draw_world(&runtime.world, &view, &options);

        let status = format!(
            "frame {}  entities {}  contacts {}  fps {} ({}){}",
            runtime.frame(),
            runtime.world.entity_count(),
            runtime.world.contacts.len(),
            get_fps(),
            fps_limit.label(),
            if runtime.paused { "  PAUSED" } else { "" },
        );
        draw_text(&status, 10.0, 20.0, 18.0, Color::from_rgba(150, 150, 160, 220));

        if let Some(target_frame_time) = fps_limit.frame_time() {
            wait_for_frame(frame_start, target_frame_time);
        }

        next_frame().await;
    }
}
