//! Vista Engine demo entry point.
//!
//! A windowed viewer for sprite atlases using:
//! - **raylib** for windowing and drawing
//! - the engine's registry/camera/animation pipeline for everything else
//!
//! Every sprite of the given atlas is laid out on a grid; animations from
//! an optional definitions file can be played on top. Arrow keys are not
//! handled here; the demo only exercises the engine's own camera motion.
//!
//! # Running
//!
//! ```sh
//! cargo run --features raylib --release -- --atlas assets/pack.json
//! ```

// Do not create console on Windows
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use std::path::PathBuf;

use clap::Parser;

use vistaengine::backend::raylib::RaylibBackend;
use vistaengine::config::EngineConfig;
use vistaengine::engine::VisualEngine;
use vistaengine::engine::registry::{Pivot, SpriteConfig};
use vistaengine::math::Vec2;

/// Vista Engine 2D
#[derive(Parser)]
#[command(version, about = "Vista Engine 2D atlas viewer")]
struct Cli {
    /// Path to the engine configuration INI file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// TexturePacker-style JSON atlas to load and display.
    #[arg(long, value_name = "PATH")]
    atlas: Option<PathBuf>,

    /// JSON file of animation definitions to play where keys match.
    #[arg(long, value_name = "PATH")]
    animations: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => EngineConfig::with_path(path),
        None => EngineConfig::new(),
    };
    config.load_from_file().ok(); // ignore errors, use defaults

    let backend = RaylibBackend::from_config("Vista Engine", &config);
    let mut engine = VisualEngine::with_config(backend, &config);

    if let Some(path) = &cli.atlas {
        match engine.load_atlas(path) {
            Ok(count) => log::info!("atlas ready: {count} sprites"),
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        }
    }

    if let Some(path) = &cli.animations {
        if let Err(e) = engine.library_mut().load_file(path) {
            log::error!("{e}");
            std::process::exit(1);
        }
    }

    // Lay out one sprite per atlas entry on a grid, ordered by name so the
    // arrangement is stable between runs.
    let mut names: Vec<String> = engine.atlas().names().map(str::to_owned).collect();
    names.sort();

    const CELL: f32 = 96.0;
    const PER_ROW: usize = 10;
    let mut handles = Vec::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        let col = (i % PER_ROW) as f32;
        let row = (i / PER_ROW) as f32;
        match engine.create(
            SpriteConfig::named(name.clone())
                .with_position(col * CELL, row * CELL)
                .with_pivot(Pivot::Center)
                .with_z_index((i % 8) as i32),
        ) {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                log::warn!("sprite {name:?} not created: {e}");
                break;
            }
        }
    }

    // Play a library animation on every sprite whose name prefix matches a
    // definition key.
    let keys: Vec<String> = engine.library().animations.keys().cloned().collect();
    for (handle, name) in handles.iter().zip(names.iter()) {
        if let Some(key) = keys.iter().find(|key| name.contains(key.as_str())) {
            engine.play_from_library(*handle, key);
        }
    }

    let rows = names.len().div_ceil(PER_ROW);
    engine.set_camera_position(Vec2::new(
        PER_ROW as f32 * CELL * 0.5,
        rows as f32 * CELL * 0.5,
    ));

    log::info!("{} sprites on screen", engine.sprite_count());

    let mut elapsed = 0.0f32;
    while !engine.backend().window_should_close() {
        let dt = engine.backend().frame_time();
        elapsed += dt;

        // Gentle camera sway to exercise culling at the fringes.
        engine.set_camera_zoom(1.0 + 0.25 * (elapsed * 0.5).sin());

        engine.begin_frame();
        engine.tick(dt);
        engine.end_frame();
    }
}
