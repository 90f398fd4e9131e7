mod host;

use anyhow::Context;
use clap::Parser;
use host::WinitHost;
use scene_game::{ExitStatus, Game, SceneSettings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scene-desktop", about = "Fly around a lit, textured scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON scene settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Window title
    #[arg(long)]
    title: Option<String>,

    /// OBJ model drawn at the origin
    #[arg(long)]
    model: Option<PathBuf>,

    /// Diffuse texture for the model
    #[arg(long)]
    model_texture: Option<PathBuf>,

    /// WGSL replacing the built-in scene shader
    #[arg(long)]
    shader: Option<PathBuf>,
}

fn load_settings(cli: Cli) -> anyhow::Result<SceneSettings> {
    let mut settings = match &cli.config {
        Some(path) => SceneSettings::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SceneSettings::default(),
    };
    if let Some(width) = cli.width {
        settings.window.width = width;
    }
    if let Some(height) = cli.height {
        settings.window.height = height;
    }
    if let Some(title) = cli.title {
        settings.window.title = title;
    }
    if let Some(model) = cli.model {
        settings.assets.model = model;
    }
    if cli.model_texture.is_some() {
        settings.assets.model_texture = cli.model_texture;
    }
    if cli.shader.is_some() {
        settings.assets.shader = cli.shader;
    }
    Ok(settings)
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("scene-desktop starting");

    let status = match load_settings(cli) {
        Ok(settings) => Game::new(WinitHost::new(), settings).run(),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitStatus::StartFailed
        }
    };

    tracing::info!(code = status.code(), "scene-desktop exiting");
    std::process::exit(status.code());
}
