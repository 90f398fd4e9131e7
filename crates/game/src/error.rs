use crate::game::GameState;
use scene_assets::AssetError;
use scene_render::MeshError;
use std::path::PathBuf;

/// Errors from the game loop and its host.
///
/// Anything raised before the loop is running is a start-up failure;
/// anything raised by `end` is a teardown failure.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("window error: {0}")]
    Window(String),
    #[error("GPU error: {0}")]
    Gpu(String),
    #[error("shader error: {0}")]
    Shader(String),
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),
    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),
    #[error("config error in {path}: {message}")]
    Config { path: PathBuf, message: String },
    #[error("cannot {action} while {state:?}")]
    InvalidState {
        action: &'static str,
        state: GameState,
    },
    #[error("teardown error: {0}")]
    Teardown(String),
}
