use crate::actor::Actor;
use crate::camera::Camera;
use crate::earth::Earth;
use crate::error::GameError;
use crate::host::{Host, HostConfig};
use crate::light::Light;
use crate::settings::SceneSettings;
use glam::{Mat4, Vec3, Vec4};
use scene_common::TextureData;
use scene_render::{DebugDraw, DrawItem, Frame, MeshSlot, ObjectUniforms, SceneUniforms};
use std::path::Path;

pub const CLEAR_COLOR: [f32; 4] = [0.15, 0.15, 0.15, 1.0];

const GRID_LINES: i32 = 21;
const GRID_HALF_EXTENT: f32 = 10.0;
const AXIS_LENGTH: f32 = 4.0;
const EARTH_TEXTURE_SIZE: (u32, u32) = (512, 256);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Uninitialized,
    Running,
    Ended,
}

/// How `Game::run` finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    StartFailed,
    TeardownFailed,
}

impl ExitStatus {
    /// Process exit code: 0, -1 or -2.
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::StartFailed => -1,
            ExitStatus::TeardownFailed => -2,
        }
    }
}

/// Everything that only exists while the game is running.
#[derive(Debug)]
struct Scene {
    camera: Camera,
    light: Light,
    earth: Earth,
    model_transform: Mat4,
    debug: DebugDraw,
}

/// The game loop: `start`, then `update`/`draw` per tick, then `end`.
pub struct Game<H: Host> {
    host: H,
    settings: SceneSettings,
    state: GameState,
    scene: Option<Scene>,
    previous_time: f64,
}

impl<H: Host> Game<H> {
    pub fn new(host: H, settings: SceneSettings) -> Self {
        Self {
            host,
            settings,
            state: GameState::Uninitialized,
            scene: None,
            previous_time: 0.0,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.scene.as_ref().map(|s| &s.camera)
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.scene.as_mut().map(|s| &mut s.camera)
    }

    pub fn light(&self) -> Option<&Light> {
        self.scene.as_ref().map(|s| &s.light)
    }

    pub fn earth(&self) -> Option<&Earth> {
        self.scene.as_ref().map(|s| &s.earth)
    }

    /// Run to completion and report how it ended.
    pub fn run(&mut self) -> ExitStatus {
        if let Err(e) = self.start() {
            tracing::error!("start-up failed: {e}");
            return ExitStatus::StartFailed;
        }

        let mut running = true;
        while running {
            let now = self.host.time();
            let delta_time = (now - self.previous_time) as f32;
            self.previous_time = now;

            running = self.update(delta_time) && self.draw();
        }

        match self.end() {
            Ok(()) => ExitStatus::Success,
            Err(e) => {
                tracing::error!("teardown failed: {e}");
                ExitStatus::TeardownFailed
            }
        }
    }

    /// Open the host, load assets and build the scene.
    ///
    /// On failure the host is closed again and the game stays uninitialized.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.state != GameState::Uninitialized {
            return Err(GameError::InvalidState {
                action: "start",
                state: self.state,
            });
        }

        let shader = match &self.settings.assets.shader {
            Some(path) => Some(std::fs::read_to_string(path).map_err(|e| {
                GameError::Shader(format!("{}: {e}", path.display()))
            })?),
            None => None,
        };

        let config = HostConfig {
            window: &self.settings.window,
            shader: shader.as_deref(),
            debug_line_capacity: self.settings.debug.line_capacity,
        };
        if let Err(e) = self.host.open(&config) {
            return self.abort_start(e);
        }

        match self.build_scene() {
            Ok(scene) => {
                self.scene = Some(scene);
                self.state = GameState::Running;
                self.previous_time = 0.0;
                tracing::info!("scene started");
                Ok(())
            }
            Err(e) => self.abort_start(e),
        }
    }

    /// Close whatever a failed `open` or scene build left behind and hand
    /// back the start-up error.
    fn abort_start(&mut self, error: GameError) -> Result<(), GameError> {
        if let Err(close_err) = self.host.close() {
            tracing::debug!("closing host after failed start: {close_err}");
        }
        Err(error)
    }

    fn build_scene(&mut self) -> Result<Scene, GameError> {
        let assets = &self.settings.assets;
        let model = scene_assets::obj::load(&assets.model)?;
        let model_texture = load_or(assets.model_texture.as_deref(), || {
            TextureData::solid(1, 1, [255, 255, 255, 255])
        })?;
        self.host.upload(MeshSlot::Model, &model, &model_texture)?;

        let mut earth = Earth::new(&self.settings.earth);
        let earth_texture = load_or(self.settings.earth.texture.as_deref(), || {
            scene_assets::earth_texture(EARTH_TEXTURE_SIZE.0, EARTH_TEXTURE_SIZE.1)
        })?;
        let sphere = earth.start();
        self.host.upload(MeshSlot::Earth, sphere, &earth_texture)?;

        Ok(Scene {
            camera: Camera::new(&self.settings.camera),
            light: Light::new(&self.settings.light),
            earth,
            model_transform: Mat4::IDENTITY,
            debug: DebugDraw::new(self.settings.debug.line_capacity),
        })
    }

    /// Poll input and advance actors. False when the window should close.
    pub fn update(&mut self, delta_time: f32) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };

        let input = self.host.poll();
        if input.wants_exit() {
            tracing::info!("exit requested");
            return false;
        }

        let mut keep_running = scene.camera.update(delta_time, &input);
        keep_running &= scene.earth.update(delta_time, &input);
        scene.light.orbit(self.host.time() as f32);

        tracing::trace!(
            delta_time,
            yaw = scene.camera.yaw(),
            pitch = scene.camera.pitch(),
            "tick"
        );
        keep_running
    }

    /// Build this tick's frame and hand it to the host. False on a fatal
    /// presentation error.
    pub fn draw(&mut self) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };

        scene.debug.clear();
        scene.debug.add_transform(Mat4::IDENTITY, AXIS_LENGTH);
        add_grid(&mut scene.debug);

        let (width, height) = self.host.framebuffer_size();
        let projection = scene
            .camera
            .projection_matrix(width.max(1) as f32, height.max(1) as f32);
        let view = scene.camera.view_matrix();

        let frame = Frame {
            clear_color: CLEAR_COLOR,
            scene: SceneUniforms::new(
                scene.camera.position(),
                scene.light.ambient(),
                scene.light.diffuse(),
                scene.light.specular(),
                scene.light.direction(),
            ),
            view_projection: projection * view,
            items: vec![
                scene.earth.draw(projection, view),
                DrawItem {
                    slot: MeshSlot::Model,
                    object: ObjectUniforms::new(projection, view, scene.model_transform),
                    texture_unit: 0,
                },
            ],
            debug: &scene.debug,
        };

        match self.host.present(&frame) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("present failed: {e}");
                false
            }
        }
    }

    /// Tear down the scene and close the host.
    pub fn end(&mut self) -> Result<(), GameError> {
        if self.state != GameState::Running {
            return Err(GameError::InvalidState {
                action: "end",
                state: self.state,
            });
        }
        self.scene = None;
        self.state = GameState::Ended;
        self.host.close()?;
        tracing::info!("scene ended");
        Ok(())
    }
}

/// 21 x 21 line grid on the XZ plane; the centre lines are white.
fn add_grid(debug: &mut DebugDraw) {
    let white = Vec4::new(1.0, 1.0, 1.0, 1.0);
    let grey = Vec4::new(0.5, 0.5, 0.5, 1.0);
    let e = GRID_HALF_EXTENT;
    for i in 0..GRID_LINES {
        let offset = -e + i as f32;
        let color = if i == GRID_LINES / 2 { white } else { grey };
        debug.add_line(Vec3::new(offset, 0.0, e), Vec3::new(offset, 0.0, -e), color);
        debug.add_line(Vec3::new(e, 0.0, offset), Vec3::new(-e, 0.0, offset), color);
    }
}

fn load_or(
    path: Option<&Path>,
    fallback: impl FnOnce() -> TextureData,
) -> Result<TextureData, GameError> {
    match path {
        Some(path) => Ok(scene_assets::load_texture(path)?),
        None => Ok(fallback()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessHost;
    use scene_common::MeshData;
    use scene_input::{InputState, Key};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TRIANGLE_OBJ: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn model_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TRIANGLE_OBJ.as_bytes()).unwrap();
        file
    }

    fn settings_for(model: &NamedTempFile) -> SceneSettings {
        let mut settings = SceneSettings::default();
        settings.assets.model = model.path().to_path_buf();
        settings
    }

    /// Creates its window in `open`, then fails to create the GPU context.
    #[derive(Default)]
    struct HalfOpenHost {
        windows: usize,
        closes: usize,
    }

    impl Host for HalfOpenHost {
        fn open(&mut self, _config: &HostConfig<'_>) -> Result<(), GameError> {
            self.windows += 1;
            Err(GameError::Gpu("no compatible adapter".into()))
        }

        fn upload(
            &mut self,
            slot: MeshSlot,
            _mesh: &MeshData,
            _texture: &TextureData,
        ) -> Result<(), GameError> {
            panic!("upload of {slot:?} after a failed open")
        }

        fn poll(&mut self) -> InputState {
            InputState::new()
        }

        fn time(&self) -> f64 {
            0.0
        }

        fn framebuffer_size(&self) -> (u32, u32) {
            (640, 480)
        }

        fn present(&mut self, _frame: &Frame<'_>) -> Result<(), GameError> {
            panic!("present after a failed open")
        }

        fn close(&mut self) -> Result<(), GameError> {
            self.closes += 1;
            self.windows = 0;
            Ok(())
        }
    }

    #[test]
    fn exit_codes() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::StartFailed.code(), -1);
        assert_eq!(ExitStatus::TeardownFailed.code(), -2);
    }

    #[test]
    fn start_enters_running_and_uploads_both_meshes() {
        let model = model_file();
        let mut game = Game::new(HeadlessHost::new(1280, 720), settings_for(&model));
        assert_eq!(game.state(), GameState::Uninitialized);
        game.start().unwrap();
        assert_eq!(game.state(), GameState::Running);
        // model: vertices + indices, earth: vertices + indices
        assert_eq!(game.host().live_buffers(), 4);
        assert_eq!(game.host().texture_size(MeshSlot::Model), Some((1, 1)));
        let earth_texture = game.host().texture_size(MeshSlot::Earth);
        assert_eq!(earth_texture, Some(EARTH_TEXTURE_SIZE));
        assert!(game.earth().is_some_and(Earth::is_started));
    }

    #[test]
    fn start_twice_is_rejected() {
        let model = model_file();
        let mut game = Game::new(HeadlessHost::new(640, 480), settings_for(&model));
        game.start().unwrap();
        assert!(matches!(
            game.start(),
            Err(GameError::InvalidState {
                action: "start",
                ..
            })
        ));
    }

    #[test]
    fn missing_model_fails_start_with_minus_one() {
        let mut settings = SceneSettings::default();
        settings.assets.model = "does/not/exist.obj".into();
        let mut game = Game::new(HeadlessHost::new(640, 480), settings);
        assert_eq!(game.run(), ExitStatus::StartFailed);
        assert_eq!(game.state(), GameState::Uninitialized);
        assert!(!game.host().is_open());
        assert_eq!(game.host().frames_presented(), 0);
    }

    #[test]
    fn window_failure_fails_start() {
        let model = model_file();
        let host = HeadlessHost::new(640, 480).fail_open("no display");
        let mut game = Game::new(host, settings_for(&model));
        assert!(matches!(game.start(), Err(GameError::Window(_))));
        assert_eq!(game.run(), ExitStatus::StartFailed);
        assert!(!game.host().is_open());
    }

    #[test]
    fn failed_open_releases_the_window() {
        let model = model_file();
        let mut game = Game::new(HalfOpenHost::default(), settings_for(&model));
        assert!(matches!(game.start(), Err(GameError::Gpu(_))));
        assert_eq!(game.host().windows, 0);
        assert_eq!(game.host().closes, 1);
        assert_eq!(game.state(), GameState::Uninitialized);

        assert_eq!(game.run(), ExitStatus::StartFailed);
        assert_eq!(game.host().windows, 0);
        assert_eq!(game.host().closes, 2);
    }

    #[test]
    fn missing_shader_override_fails_start() {
        let model = model_file();
        let mut settings = settings_for(&model);
        settings.assets.shader = Some("missing.wgsl".into());
        let mut game = Game::new(HeadlessHost::new(640, 480), settings);
        assert!(matches!(game.start(), Err(GameError::Shader(_))));
        assert!(!game.host().is_open());
    }

    #[test]
    fn idle_tick_keeps_camera_and_orbits_light() {
        let model = model_file();
        let mut game = Game::new(HeadlessHost::new(1280, 720), settings_for(&model));
        game.start().unwrap();

        let camera = game.camera().unwrap().clone();
        game.host_mut().set_time(3.0);
        assert!(game.update(0.016));

        let after = game.camera().unwrap();
        assert_eq!(after.position(), camera.position());
        assert_eq!((after.yaw(), after.pitch()), (camera.yaw(), camera.pitch()));

        // poll advanced the clock by one step before the light read it
        let t = game.host().time() as f32;
        let expected = Vec3::new((t * 0.5).cos(), 1.0, (t * 0.5).sin()).normalize();
        let direction = game.light().unwrap().direction();
        assert!(direction.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn close_before_tick_exits_cleanly() {
        let model = model_file();
        let host = HeadlessHost::new(1280, 720).close_after(1);
        let mut game = Game::new(host, settings_for(&model));
        assert_eq!(game.run(), ExitStatus::Success);
        assert_eq!(game.state(), GameState::Ended);
        assert_eq!(game.host().polls(), 1);
        assert_eq!(game.host().frames_presented(), 0);
        assert!(!game.host().is_open());
        assert_eq!(game.host().live_buffers(), 0);
        assert!(game.camera().is_none());
    }

    #[test]
    fn escape_ends_the_loop() {
        let model = model_file();
        let mut host = HeadlessHost::new(1280, 720);
        host.input_mut().press(Key::Escape);
        let mut game = Game::new(host, settings_for(&model));
        game.start().unwrap();
        assert!(!game.update(0.016));
    }

    #[test]
    fn run_draws_every_tick_until_close() {
        let model = model_file();
        let host = HeadlessHost::new(1280, 720).close_after(4);
        let mut game = Game::new(host, settings_for(&model));
        assert_eq!(game.run(), ExitStatus::Success);
        assert_eq!(game.host().frames_presented(), 3);
    }

    #[test]
    fn frame_draws_earth_then_model_with_grid() {
        let model = model_file();
        let mut game = Game::new(HeadlessHost::new(1280, 720), settings_for(&model));
        game.start().unwrap();
        assert!(game.update(0.016));
        assert!(game.draw());

        let stats = game.host().last_frame().unwrap().clone();
        assert_eq!(stats.slots, vec![MeshSlot::Earth, MeshSlot::Model]);
        assert_eq!(stats.draw_calls, 2);
        let earth_triangles = crate::earth::SEGMENTS * (2 * crate::earth::RINGS - 2);
        assert_eq!(stats.triangles, earth_triangles + 1);
        // 21 lines each way plus the three-axis gizmo
        assert_eq!(stats.debug_lines, 2 * 21 + 3);
        assert_eq!(stats.dropped_lines, 0);

        let camera = game.camera().unwrap();
        let expected = camera.projection_matrix(1280.0, 720.0) * camera.view_matrix();
        assert!(stats.view_projection.abs_diff_eq(expected, 1e-5));
        assert_eq!(
            stats.scene.camera_position,
            camera.position().extend(1.0).to_array()
        );
    }

    #[test]
    fn zero_sized_framebuffer_stays_finite() {
        let model = model_file();
        let mut game = Game::new(HeadlessHost::new(0, 0), settings_for(&model));
        game.start().unwrap();
        assert!(game.draw());
        let frame = game.host().last_frame().unwrap();
        assert!(frame.view_projection.is_finite());
    }

    #[test]
    fn resize_changes_the_projection() {
        let model = model_file();
        let mut game = Game::new(HeadlessHost::new(1280, 720), settings_for(&model));
        game.start().unwrap();
        assert!(game.draw());
        let wide = game.host().last_frame().unwrap().view_projection;

        game.host_mut().set_size(480, 480);
        assert!(game.draw());
        let square = game.host().last_frame().unwrap().view_projection;
        assert!(!wide.abs_diff_eq(square, 1e-6));
        let ratio = square.x_axis.x / wide.x_axis.x;
        assert!((ratio - 1280.0 / 720.0).abs() < 1e-4);
    }

    #[test]
    fn teardown_failure_maps_to_minus_two() {
        let model = model_file();
        let host = HeadlessHost::new(640, 480)
            .close_after(2)
            .fail_close("device lost");
        let mut game = Game::new(host, settings_for(&model));
        assert_eq!(game.run(), ExitStatus::TeardownFailed);
        assert_eq!(game.state(), GameState::Ended);
    }

    #[test]
    fn end_without_start_is_rejected() {
        let mut game = Game::new(HeadlessHost::new(640, 480), SceneSettings::default());
        let err = game.end().unwrap_err();
        assert!(matches!(err, GameError::InvalidState { action: "end", .. }));
        assert!(!game.update(0.016));
        assert!(!game.draw());
    }

    #[test]
    fn small_debug_capacity_drops_grid_lines() {
        let model = model_file();
        let mut settings = settings_for(&model);
        settings.debug.line_capacity = 10;
        let mut game = Game::new(HeadlessHost::new(640, 480), settings);
        game.start().unwrap();
        assert!(game.draw());
        let frame = game.host().last_frame().unwrap();
        assert_eq!(frame.debug_lines, 10);
        assert!(frame.dropped_lines > 0);
    }
}
