//! Asset loading: Wavefront OBJ meshes and RGBA8 textures.
//!
//! Loaders return CPU-side `MeshData` / `TextureData`. The renderer uploads
//! them; nothing here owns GPU state.

pub mod obj;
pub mod texture;

use std::path::PathBuf;

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("OBJ parse error at line {line}: {message}")]
    ObjParse { line: usize, message: String },
    #[error("OBJ index {index} at line {line} is out of range")]
    ObjIndex { line: usize, index: i64 },
    #[error("OBJ file contains no faces")]
    ObjEmpty,
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub use texture::{earth_texture, load as load_texture};
