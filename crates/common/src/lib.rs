//! Shared types for the graphics scene.
//!
//! # Invariants
//! - `Vertex` is `#[repr(C)]` and `Pod`; its field order is the GPU attribute order.
//! - CPU-side `MeshData` and `TextureData` are plain values; nothing here touches the GPU.

mod texture;
mod types;
mod vertex;

pub use texture::TextureData;
pub use types::Transform;
pub use vertex::{MeshData, Vertex};
