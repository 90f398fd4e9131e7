use crate::actor::Actor;
use crate::settings::EarthSettings;
use glam::Mat4;
use scene_common::{MeshData, Transform};
use scene_input::InputState;
use scene_render::geometry::uv_sphere;
use scene_render::{DrawItem, MeshSlot, ObjectUniforms};

pub const SEGMENTS: u32 = 32;
pub const RINGS: u32 = 16;
pub const RADIUS: f32 = 0.5;

/// Procedural sphere actor spinning about its Y axis.
#[derive(Debug, Clone)]
pub struct Earth {
    transform: Transform,
    spin: f32,
    mesh: Option<MeshData>,
}

impl Earth {
    pub fn new(settings: &EarthSettings) -> Self {
        Self {
            transform: Transform::from_euler_degrees(
                settings.position,
                settings.rotation,
                settings.scale,
            ),
            spin: settings.spin_degrees_per_second.to_radians(),
            mesh: None,
        }
    }

    /// Build the sphere geometry on first call; later calls return the same mesh.
    pub fn start(&mut self) -> &MeshData {
        self.mesh.get_or_insert_with(|| {
            tracing::debug!(segments = SEGMENTS, rings = RINGS, "generating sphere");
            uv_sphere(RADIUS, SEGMENTS, RINGS)
        })
    }

    pub fn is_started(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn transform_data(&self) -> &Transform {
        &self.transform
    }

    /// Draw item for this frame, bound to texture unit 0.
    pub fn draw(&self, projection: Mat4, view: Mat4) -> DrawItem {
        DrawItem {
            slot: MeshSlot::Earth,
            object: ObjectUniforms::new(projection, view, self.transform()),
            texture_unit: 0,
        }
    }
}

impl Actor for Earth {
    fn update(&mut self, dt: f32, _input: &InputState) -> bool {
        self.transform.rotate_y(self.spin * dt);
        true
    }

    fn transform(&self) -> Mat4 {
        self.transform.matrix()
    }
}
