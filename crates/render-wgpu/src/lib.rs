//! wgpu render backend for the graphics scene.
//!
//! Draws each frame's lit, textured meshes in order, then its debug lines,
//! into one depth-tested pass.
//!
//! # Invariants
//! - The renderer never mutates scene state; it only consumes `Frame`s.
//! - Each mesh slot is uploaded once and drawn at most once per frame.

mod backend;
mod gpu;
mod shaders;
mod texture;

pub use backend::{PassSink, WgpuBackend};
pub use gpu::{GpuError, WgpuRenderer};
pub use shaders::{LINE_SHADER, SCENE_SHADER};
