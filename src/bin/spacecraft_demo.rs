//! # Spacecraft Demo
//!
//! Renders the spacecraft scene in a window.
//!
//! Controls:
//! - WASD: Pan the orbit target
//! - Q/E: Pan up/down
//! - Mouse: Orbit the camera
//! - Scroll: Change movement speed
//! - P/O: Perspective/orthographic projection
//! - Escape: Quit
//!
//! With `--headless` the scene is rendered for a fixed number of frames
//! through the recording backend and a summary is logged.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use spacecraft_scene::backend::BackendCall;
use spacecraft_scene::{window, Engine, FrameOutcome, HeadlessBackend, SceneConfig};

/// Spacecraft scene demo arguments.
#[derive(Parser, Debug)]
#[command(
    name = "spacecraft_demo",
    about = "Orbit-camera demo rendering a spacecraft from primitive meshes",
    version
)]
struct Args {
    /// Scene configuration file (RON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory relative texture paths are resolved against.
    #[arg(long)]
    texture_dir: Option<PathBuf>,

    /// Disable vertical sync (may cause tearing).
    #[arg(long)]
    no_vsync: bool,

    /// Render without a window or GPU.
    #[arg(long)]
    headless: bool,

    /// Frames to render in headless mode.
    #[arg(long, default_value = "3")]
    frames: u32,
}

fn run_headless(config: SceneConfig, frames: u32) {
    let mut engine = Engine::new(
        HeadlessBackend::new(config.width, config.height),
        config,
    );
    engine.prepare();

    let dt = 1.0 / 60.0;
    for _ in 0..frames {
        if engine.frame(dt) == FrameOutcome::Exit {
            break;
        }
    }

    let backend = engine.backend();
    let uniforms = backend
        .calls()
        .iter()
        .filter(|call| matches!(call, BackendCall::Uniform { .. }))
        .count();
    log::info!(
        "Rendered {} frames: {} draws, {} uniform pushes, {} textures",
        backend.frame_count(),
        backend.draws().len(),
        uniforms,
        engine.textures().len()
    );
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match SceneConfig::from_ron_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => SceneConfig::default(),
    };
    if let Some(dir) = args.texture_dir {
        config.texture_dir = dir;
    }
    if args.no_vsync {
        config.vsync = false;
    }

    if args.headless {
        run_headless(config, args.frames);
        return ExitCode::SUCCESS;
    }

    match window::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
