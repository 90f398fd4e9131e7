//! Rendering Adapter: renderer-agnostic geometry and frame description.
//!
//! # Invariants
//! - A `Mesh` is initialized at most once; its triangle count always matches
//!   the buffer it draws from.
//! - A `Frame` is a pure value built by the scene each tick; backends only
//!   consume it.
//!
//! GPU access goes through the `GeometryBackend` / `DrawSink` traits. The wgpu
//! backend lives in `scene-render-wgpu`; `RecordingBackend` and `DrawRecorder`
//! stand in for it in headless runs and tests.

pub mod debug_draw;
pub mod frame;
pub mod geometry;
pub mod mesh;

pub use debug_draw::{DebugDraw, LineVertex};
pub use frame::{DrawItem, Frame, MeshSlot, ObjectUniforms, SceneUniforms};
pub use mesh::{
    DrawCall, DrawRecorder, DrawSink, GeometryBackend, Mesh, MeshError, RecordedBuffer,
    RecordingBackend,
};
