//! winit + wgpu implementation of the game's `Host`.
//!
//! The game owns the loop, so events are pumped once per `poll` instead of
//! handing control to `EventLoop::run_app`.

use glam::DVec2;
use scene_common::{MeshData, TextureData};
use scene_game::{GameError, Host, HostConfig};
use scene_input::{InputState, Key};
use scene_render::{Frame, MeshSlot};
use scene_render_wgpu::WgpuRenderer;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

/// Pumps allowed for the platform to deliver `resumed` during `open`.
const STARTUP_PUMPS: usize = 100;
const STARTUP_PUMP_TIMEOUT: Option<Duration> = Some(Duration::from_millis(10));
const POLL_TIMEOUT: Option<Duration> = Some(Duration::ZERO);

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyQ => Some(Key::Q),
        KeyCode::KeyE => Some(Key::E),
        KeyCode::Escape => Some(Key::Escape),
        _ => None,
    }
}

/// Event-side state filled in by winit callbacks.
#[derive(Default)]
struct Shell {
    attributes: WindowAttributes,
    window: Option<Arc<Window>>,
    input: InputState,
    resized: Option<PhysicalSize<u32>>,
    error: Option<String>,
}

impl ApplicationHandler for Shell {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        match event_loop.create_window(self.attributes.clone()) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.input.request_close(),
            WindowEvent::Resized(size) => self.resized = Some(size),
            WindowEvent::CursorMoved { position, .. } => {
                self.input.set_cursor(DVec2::new(position.x, position.y));
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if let Some(key) = map_key(code) {
                    match state {
                        ElementState::Pressed => self.input.press(key),
                        ElementState::Released => self.input.release(key),
                    }
                }
            }
            _ => {}
        }
    }
}

/// Surface, device and renderer for an open window.
struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
}

impl Gpu {
    fn new(window: Arc<Window>, config: &HostConfig<'_>) -> Result<Self, GameError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let size = window.inner_size();
        let surface = instance
            .create_surface(window)
            .map_err(|e| GameError::Gpu(format!("create surface: {e}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| GameError::Gpu("no compatible graphics adapter".into()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("scene_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| GameError::Gpu(format!("create device: {e}")))?;

        let info = adapter.get_info();
        tracing::info!(adapter = %info.name, backend = ?info.backend, "graphics context created");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| GameError::Gpu("surface reports no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            surface_config.width,
            surface_config.height,
            config.shader,
            config.debug_line_capacity,
        )
        .map_err(|e| GameError::Shader(e.to_string()))?;

        Ok(Self {
            surface,
            device,
            queue,
            config: surface_config,
            renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, size.width, size.height);
        tracing::debug!(width = size.width, height = size.height, "surface resized");
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), GameError> {
        let output = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timed out; frame skipped");
                return Ok(());
            }
            Err(e) => return Err(GameError::Gpu(format!("surface: {e}"))),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer
            .render(&self.device, &self.queue, &view, frame);
        output.present();
        Ok(())
    }
}

pub struct WinitHost {
    event_loop: Option<EventLoop<()>>,
    shell: Shell,
    gpu: Option<Gpu>,
    opened_at: Instant,
}

impl WinitHost {
    pub fn new() -> Self {
        Self {
            event_loop: None,
            shell: Shell::default(),
            gpu: None,
            opened_at: Instant::now(),
        }
    }

    fn gpu_mut(&mut self) -> Result<&mut Gpu, GameError> {
        self.gpu
            .as_mut()
            .ok_or_else(|| GameError::Gpu("window is not open".into()))
    }

    /// Pump events until `resumed` has created the window.
    fn create_window(&mut self) -> Result<Arc<Window>, GameError> {
        let Some(event_loop) = self.event_loop.as_mut() else {
            return Err(GameError::Window("event loop is not running".into()));
        };
        for _ in 0..STARTUP_PUMPS {
            let status = event_loop.pump_app_events(STARTUP_PUMP_TIMEOUT, &mut self.shell);
            if let PumpStatus::Exit(code) = status {
                let message = format!("event loop exited during start-up ({code})");
                return Err(GameError::Window(message));
            }
            if self.shell.window.is_some() || self.shell.error.is_some() {
                break;
            }
        }
        if let Some(error) = self.shell.error.take() {
            return Err(GameError::Window(error));
        }
        self.shell
            .window
            .clone()
            .ok_or_else(|| GameError::Window("window was not created".into()))
    }

    /// Drop the surface, window and event loop. False when nothing was held.
    fn release(&mut self) -> bool {
        let held = self.event_loop.is_some() || self.shell.window.is_some() || self.gpu.is_some();
        // Surface first; it borrows the window.
        self.gpu = None;
        self.shell.window = None;
        self.shell.error = None;
        self.event_loop = None;
        held
    }
}

impl Default for WinitHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for WinitHost {
    fn open(&mut self, config: &HostConfig<'_>) -> Result<(), GameError> {
        let mut event_loop = EventLoop::new().map_err(|e| GameError::Window(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop = Some(event_loop);

        let size = PhysicalSize::new(config.window.width, config.window.height);
        self.shell.attributes = Window::default_attributes()
            .with_title(config.window.title.clone())
            .with_inner_size(size);

        // Anything created before a failure is released before returning.
        let gpu = self.create_window().and_then(|w| Gpu::new(w, config));
        match gpu {
            Ok(gpu) => {
                self.gpu = Some(gpu);
                self.opened_at = Instant::now();
                tracing::info!(title = %config.window.title, "window opened");
                Ok(())
            }
            Err(e) => {
                self.release();
                Err(e)
            }
        }
    }

    fn upload(
        &mut self,
        slot: MeshSlot,
        mesh: &MeshData,
        texture: &TextureData,
    ) -> Result<(), GameError> {
        let gpu = self.gpu_mut()?;
        gpu.renderer
            .upload(&gpu.device, &gpu.queue, slot, mesh, texture)
            .map_err(|e| GameError::Gpu(e.to_string()))
    }

    fn poll(&mut self) -> InputState {
        if let Some(event_loop) = &mut self.event_loop {
            let status = event_loop.pump_app_events(POLL_TIMEOUT, &mut self.shell);
            if let PumpStatus::Exit(_) = status {
                self.shell.input.request_close();
            }
        }
        if let Some(size) = self.shell.resized.take() {
            if let Some(gpu) = &mut self.gpu {
                gpu.resize(size);
            }
        }
        self.shell.input.clone()
    }

    fn time(&self) -> f64 {
        self.opened_at.elapsed().as_secs_f64()
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        match &self.gpu {
            Some(gpu) => (gpu.config.width, gpu.config.height),
            None => (0, 0),
        }
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), GameError> {
        self.gpu_mut()?.present(frame)
    }

    fn close(&mut self) -> Result<(), GameError> {
        if !self.release() {
            return Err(GameError::Teardown("window is not open".into()));
        }
        tracing::info!("window closed");
        Ok(())
    }
}
