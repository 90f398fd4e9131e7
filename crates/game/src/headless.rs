//! Window-less host: scripted input, a fixed-step clock and recorded draw calls.

use crate::error::GameError;
use crate::host::{Host, HostConfig};
use glam::Mat4;
use scene_common::{MeshData, TextureData};
use scene_input::InputState;
use scene_render::{
    DrawRecorder, Frame, Mesh, MeshSlot, RecordedBuffer, RecordingBackend, SceneUniforms,
};
use std::collections::HashMap;

/// Summary of the last presented frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    pub slots: Vec<MeshSlot>,
    pub draw_calls: usize,
    pub triangles: u32,
    pub debug_lines: usize,
    pub dropped_lines: usize,
    pub view_projection: Mat4,
    pub scene: SceneUniforms,
}

#[derive(Debug)]
pub struct HeadlessHost {
    size: (u32, u32),
    backend: RecordingBackend,
    meshes: HashMap<MeshSlot, Mesh<RecordedBuffer>>,
    textures: HashMap<MeshSlot, (u32, u32)>,
    recorder: DrawRecorder,
    input: InputState,
    clock: f64,
    time_step: f64,
    polls: u64,
    close_after: Option<u64>,
    open: bool,
    frames: u64,
    last_frame: Option<FrameStats>,
    open_failure: Option<String>,
    close_failure: Option<String>,
}

impl HeadlessHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            backend: RecordingBackend::new(),
            meshes: HashMap::new(),
            textures: HashMap::new(),
            recorder: DrawRecorder::default(),
            input: InputState::new(),
            clock: 0.0,
            time_step: 1.0 / 60.0,
            polls: 0,
            close_after: None,
            open: false,
            frames: 0,
            last_frame: None,
            open_failure: None,
            close_failure: None,
        }
    }

    /// Seconds the clock advances on every `poll`.
    pub fn with_time_step(mut self, seconds: f64) -> Self {
        self.time_step = seconds;
        self
    }

    /// Request a window close on the `polls`-th poll.
    pub fn close_after(mut self, polls: u64) -> Self {
        self.close_after = Some(polls);
        self
    }

    /// Make `open` fail, to exercise start-up error handling.
    pub fn fail_open(mut self, reason: impl Into<String>) -> Self {
        self.open_failure = Some(reason.into());
        self
    }

    /// Make `close` fail, to exercise teardown error handling.
    pub fn fail_close(mut self, reason: impl Into<String>) -> Self {
        self.close_failure = Some(reason.into());
        self
    }

    /// Input returned by the next polls.
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn set_time(&mut self, seconds: f64) {
        self.clock = seconds;
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> Option<&FrameStats> {
        self.last_frame.as_ref()
    }

    /// Buffers currently held by uploaded meshes.
    pub fn live_buffers(&self) -> usize {
        self.backend.live_buffers()
    }

    pub fn texture_size(&self, slot: MeshSlot) -> Option<(u32, u32)> {
        self.textures.get(&slot).copied()
    }

    fn ensure_open(&self, action: &str) -> Result<(), GameError> {
        if self.open {
            Ok(())
        } else {
            Err(GameError::Gpu(format!("cannot {action}: host is not open")))
        }
    }
}

impl Host for HeadlessHost {
    fn open(&mut self, config: &HostConfig<'_>) -> Result<(), GameError> {
        if let Some(reason) = &self.open_failure {
            return Err(GameError::Window(reason.clone()));
        }
        tracing::debug!(
            title = %config.window.title,
            width = self.size.0,
            height = self.size.1,
            "headless host opened"
        );
        self.open = true;
        Ok(())
    }

    fn upload(
        &mut self,
        slot: MeshSlot,
        mesh: &MeshData,
        texture: &TextureData,
    ) -> Result<(), GameError> {
        self.ensure_open("upload")?;
        self.meshes
            .entry(slot)
            .or_default()
            .initialize_data(&self.backend, slot.label(), mesh)?;
        self.textures.insert(slot, (texture.width, texture.height));
        Ok(())
    }

    fn poll(&mut self) -> InputState {
        self.polls += 1;
        self.clock += self.time_step;
        if self.close_after.is_some_and(|n| self.polls >= n) {
            self.input.request_close();
        }
        self.input.clone()
    }

    fn time(&self) -> f64 {
        self.clock
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), GameError> {
        self.ensure_open("present")?;
        self.recorder.clear();
        for item in &frame.items {
            let Some(mesh) = self.meshes.get(&item.slot) else {
                let slot = item.slot;
                return Err(GameError::Gpu(format!("no mesh uploaded for {slot:?}")));
            };
            mesh.draw(&mut self.recorder);
        }
        self.frames += 1;
        self.last_frame = Some(FrameStats {
            slots: frame.items.iter().map(|item| item.slot).collect(),
            draw_calls: self.recorder.calls.len(),
            triangles: self.recorder.triangles(),
            debug_lines: frame.debug.line_count(),
            dropped_lines: frame.debug.dropped(),
            view_projection: frame.view_projection,
            scene: frame.scene,
        });
        Ok(())
    }

    fn close(&mut self) -> Result<(), GameError> {
        self.meshes.clear();
        self.textures.clear();
        self.open = false;
        match &self.close_failure {
            Some(reason) => Err(GameError::Teardown(reason.clone())),
            None => Ok(()),
        }
    }
}
