use crate::actor::Actor;
use crate::settings::CameraSettings;
use glam::{DVec2, Mat4, Vec3};
use scene_input::{InputState, Key};

pub const FIELD_OF_VIEW: f32 = std::f32::consts::PI * 0.25;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 1000.0;

/// Mouse-look camera with yaw/pitch in degrees.
///
/// Pitch is not clamped; at exactly +/-90 degrees the view is degenerate.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    move_speed: f32,
    turn_speed: f32,
    current_mouse: DVec2,
    previous_mouse: Option<DVec2>,
}

impl Camera {
    pub fn new(settings: &CameraSettings) -> Self {
        Self {
            position: settings.position,
            yaw: settings.yaw,
            pitch: settings.pitch,
            move_speed: settings.move_speed,
            turn_speed: settings.turn_speed,
            current_mouse: DVec2::ZERO,
            previous_mouse: None,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn set_yaw(&mut self, degrees: f32) {
        self.yaw = degrees;
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn set_pitch(&mut self, degrees: f32) {
        self.pitch = degrees;
    }

    /// Unit view direction from yaw and pitch.
    pub fn forward(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        let (sin_pitch, cos_pitch) = pitch.sin_cos();
        Vec3::new(cos_pitch * yaw.cos(), sin_pitch, cos_pitch * yaw.sin())
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or_zero()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    /// Perspective projection for a `width` x `height` target. Both must be nonzero.
    pub fn projection_matrix(&self, width: f32, height: f32) -> Mat4 {
        Mat4::perspective_rh(FIELD_OF_VIEW, width / height, NEAR_PLANE, FAR_PLANE)
    }
}

impl Actor for Camera {
    fn update(&mut self, dt: f32, input: &InputState) -> bool {
        self.current_mouse = input.cursor();
        // First update seeds the previous position so there is no jump.
        let previous = *self.previous_mouse.get_or_insert(self.current_mouse);
        let delta = (self.current_mouse - previous).as_vec2();

        self.yaw += delta.x * self.turn_speed * dt;
        self.pitch -= delta.y * self.turn_speed * dt;

        let step = self.move_speed * dt;
        let forward = self.forward();
        let right = self.right();
        let up = self.up();
        let bindings = [
            (Key::W, forward),
            (Key::S, -forward),
            (Key::D, right),
            (Key::A, -right),
            (Key::E, up),
            (Key::Q, -up),
        ];
        for (key, direction) in bindings {
            if input.is_held(key) {
                self.position += direction * step;
            }
        }

        self.previous_mouse = Some(self.current_mouse);
        true
    }

    fn transform(&self) -> Mat4 {
        self.view_matrix().inverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at_origin() -> Camera {
        Camera::new(&CameraSettings {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            ..CameraSettings::default()
        })
    }

    #[test]
    fn zero_orientation_looks_down_positive_x() {
        let cam = camera_at_origin();
        assert!(cam.forward().abs_diff_eq(Vec3::X, 1e-6));
        let expected = Mat4::look_to_rh(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert!(cam.view_matrix().abs_diff_eq(expected, 1e-6));
        // Forward maps to -Z in view space.
        let v = cam.view_matrix().transform_vector3(Vec3::X);
        assert!(v.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn default_camera_looks_toward_origin() {
        let cam = Camera::new(&CameraSettings::default());
        let to_origin = (-cam.position()).normalize();
        assert!(cam.forward().dot(to_origin) > 0.95);
        assert!((cam.forward().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn projection_depends_on_aspect_and_is_finite() {
        let cam = camera_at_origin();
        let square = cam.projection_matrix(1.0, 1.0);
        let wide = cam.projection_matrix(1280.0, 720.0);
        assert!(!square.abs_diff_eq(wide, 1e-6));
        for m in [square, wide] {
            assert!(m.is_finite());
        }
        let ratio = square.x_axis.x / wide.x_axis.x;
        assert!((ratio - 1280.0 / 720.0).abs() < 1e-4);
    }

    #[test]
    fn no_input_leaves_camera_unchanged() {
        let mut cam = Camera::new(&CameraSettings::default());
        let (position, yaw, pitch) = (cam.position(), cam.yaw(), cam.pitch());
        assert!(cam.update(0.016, &InputState::new()));
        assert!(cam.update(0.016, &InputState::new()));
        assert_eq!(cam.position(), position);
        assert_eq!((cam.yaw(), cam.pitch()), (yaw, pitch));
    }

    #[test]
    fn mouse_delta_turns_by_speed_and_dt() {
        let mut cam = camera_at_origin();
        let mut input = InputState::new();
        input.set_cursor(DVec2::new(100.0, 100.0));
        cam.update(0.5, &input);
        input.set_cursor(DVec2::new(140.0, 80.0));
        cam.update(0.5, &input);
        assert!((cam.yaw() - 40.0 * 0.1 * 0.5).abs() < 1e-5);
        assert!((cam.pitch() - 20.0 * 0.1 * 0.5).abs() < 1e-5);
    }

    #[test]
    fn first_update_seeds_mouse_without_turning() {
        let mut cam = camera_at_origin();
        let mut input = InputState::new();
        input.set_cursor(DVec2::new(640.0, 360.0));
        cam.update(1.0, &input);
        assert_eq!((cam.yaw(), cam.pitch()), (0.0, 0.0));
    }

    #[test]
    fn keys_move_along_local_axes() {
        let mut cam = camera_at_origin();
        let mut input = InputState::new();
        input.press(Key::W);
        cam.update(2.0, &input);
        assert!(cam.position().abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));

        let mut input = InputState::new();
        input.press(Key::D);
        cam.update(1.0, &input);
        assert!(cam.position().abs_diff_eq(Vec3::new(2.0, 0.0, 1.0), 1e-5));

        let mut input = InputState::new();
        input.press(Key::E);
        cam.update(1.0, &input);
        assert!(cam.position().abs_diff_eq(Vec3::new(2.0, 1.0, 1.0), 1e-5));
    }

    #[test]
    fn pitch_is_not_clamped() {
        let mut cam = camera_at_origin();
        cam.set_pitch(120.0);
        assert_eq!(cam.pitch(), 120.0);
    }

    #[test]
    fn transform_is_inverse_view() {
        let cam = Camera::new(&CameraSettings::default());
        let world = cam.transform();
        let origin = world.transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(cam.position(), 1e-4));
    }
}
