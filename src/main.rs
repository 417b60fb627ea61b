use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use toroid::{BlockRegistry, Engine, EngineConfig, NoiseSource, Vec3};

/// Headless walk through a noise-generated world.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Engine settings (TOML); defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Block definitions (TOML).
    #[arg(long, default_value = "assets/blocks.toml")]
    blocks: PathBuf,
    /// Frames to simulate.
    #[arg(long, default_value_t = 240)]
    frames: u32,
    #[arg(long, default_value_t = 1337)]
    seed: i32,
    /// Run the consumers on background threads instead of pumping each frame.
    #[arg(long)]
    threads: bool,
}

const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let registry = Arc::new(BlockRegistry::load_from_path(&args.blocks)?);
    let source = Arc::new(NoiseSource::new(config.window, args.seed, &registry));
    let mut engine = Engine::new(&config, registry, source)?;

    if args.threads {
        engine.start_threads()?;
    } else {
        let rounds = engine.settle(256);
        log::info!("initial window settled in {rounds} rounds");
    }

    let height = config.window.height as f32;
    let dt = FRAME.as_secs_f32();
    for frame in 0..args.frames {
        let pos = Vec3::new(frame as f32 * 0.5, height - 2.0, 8.0);
        engine.update_observer(pos, Vec3::new(1.0, 0.0, 0.0));
        engine.update(dt);
        if args.threads {
            thread::sleep(FRAME);
        } else {
            engine.pump();
        }
        if frame % 60 == 0 {
            let pick = engine.trace_picking(pos, Vec3::new(0.0, -1.0, 0.0));
            let s = engine.stats();
            log::info!(
                "frame {frame}: tile ({}, {}), ground {} at {:?}, {} meshes, {} tasks run, queued {:?}",
                engine.tile().cx,
                engine.tile().cz,
                if pick.hit { "hit" } else { "missed" },
                pick.hit_cell,
                engine.meshes().len(),
                s.executed,
                s.queued
            );
        }
    }

    if args.threads && !engine.stop_threads() {
        log::warn!("consumer threads did not stop in time");
    }
    let s = engine.stats();
    log::info!(
        "done: {} tasks ({} failed), {} meshes built, last light {}us, last mesh {}us, {} messages dropped",
        s.executed,
        s.failed,
        s.meshes_built,
        s.last_light_us,
        s.last_mesh_us,
        s.dropped_on_stop
    );
    Ok(())
}
