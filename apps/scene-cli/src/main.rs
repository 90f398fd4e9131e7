use anyhow::Context;
use clap::{Parser, Subcommand};
use scene_game::{ExitStatus, Game, HeadlessHost, Host, SceneSettings};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Seconds of simulated time per tick.
const TIME_STEP: f64 = 1.0 / 60.0;

#[derive(Parser)]
#[command(name = "scene-cli", about = "Inspect scene assets and run headless")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version
    Info,
    /// Load an OBJ file and report its geometry
    Inspect {
        /// OBJ file to load
        path: PathBuf,
    },
    /// Run the game loop headless for a fixed number of ticks
    Simulate {
        /// Number of ticks to run
        #[arg(short, long, default_value = "60")]
        ticks: u64,
        /// JSON scene settings
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// OBJ model drawn at the origin
        #[arg(long)]
        model: Option<PathBuf>,
    },
}

fn inspect(path: &Path) -> anyhow::Result<()> {
    let mesh = scene_assets::obj::load(path)
        .with_context(|| format!("loading {}", path.display()))?;

    println!("{}", path.display());
    println!("  vertices:  {}", mesh.vertices.len());
    println!("  indices:   {}", mesh.indices.len());
    println!("  triangles: {}", mesh.triangle_count());
    if let Some((min, max)) = mesh.bounds() {
        println!("  bounds:    {min} .. {max}");
        println!("  size:      {}", max - min);
    }
    Ok(())
}

fn simulate(ticks: u64, settings: SceneSettings) -> ExitStatus {
    let (width, height) = (settings.window.width, settings.window.height);
    let host = HeadlessHost::new(width, height).with_time_step(TIME_STEP);
    let mut game = Game::new(host, settings);
    if let Err(e) = game.start() {
        tracing::error!("starting headless scene failed: {e}");
        return ExitStatus::StartFailed;
    }

    for tick in 0..ticks {
        if !(game.update(TIME_STEP as f32) && game.draw()) {
            tracing::info!(tick, "scene stopped early");
            break;
        }
    }

    if let Some(camera) = game.camera() {
        let (position, forward) = (camera.position(), camera.forward());
        println!("camera:    position {position} forward {forward}");
    }
    if let Some(light) = game.light() {
        println!("light:     direction {}", light.direction());
    }
    println!("frames:    {}", game.host().frames_presented());
    println!("time:      {:.3}s", game.host().time());
    if let Some(frame) = game.host().last_frame() {
        let (draws, triangles) = (frame.draw_calls, frame.triangles);
        println!("draws:     {draws} ({triangles} triangles)");
        let (lines, dropped) = (frame.debug_lines, frame.dropped_lines);
        println!("debug:     {lines} lines ({dropped} dropped)");
    }

    match game.end() {
        Ok(()) => ExitStatus::Success,
        Err(e) => {
            tracing::error!("teardown failed: {e}");
            ExitStatus::TeardownFailed
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("scene-cli v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Inspect { path } => inspect(&path)?,
        Commands::Simulate {
            ticks,
            config,
            model,
        } => {
            let mut settings = match config {
                Some(path) => SceneSettings::load(&path)?,
                None => SceneSettings::default(),
            };
            if let Some(model) = model {
                settings.assets.model = model;
            }
            let status = simulate(ticks, settings);
            if status != ExitStatus::Success {
                std::process::exit(status.code());
            }
        }
    }

    Ok(())
}
