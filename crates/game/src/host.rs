use crate::error::GameError;
use crate::settings::WindowSettings;
use scene_common::{MeshData, TextureData};
use scene_input::InputState;
use scene_render::{Frame, MeshSlot};

/// What a host needs to open its window and GPU context.
#[derive(Debug, Clone, Copy)]
pub struct HostConfig<'a> {
    pub window: &'a WindowSettings,
    /// WGSL replacing the built-in scene shader.
    pub shader: Option<&'a str>,
    pub debug_line_capacity: usize,
}

/// Window, input and GPU collaborator driven by the game loop.
///
/// All calls happen on the loop's thread. `poll` must not block.
pub trait Host {
    fn open(&mut self, config: &HostConfig<'_>) -> Result<(), GameError>;

    /// Upload geometry and its diffuse texture into `slot`. Each slot is uploaded once.
    fn upload(
        &mut self,
        slot: MeshSlot,
        mesh: &MeshData,
        texture: &TextureData,
    ) -> Result<(), GameError>;

    /// Process pending window events and return this tick's input.
    fn poll(&mut self) -> InputState;

    /// Seconds since `open`.
    fn time(&self) -> f64;

    /// Current drawable size in pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), GameError>;

    /// Release the GPU context and window.
    fn close(&mut self) -> Result<(), GameError>;
}
