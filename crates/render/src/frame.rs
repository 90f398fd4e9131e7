use crate::debug_draw::DebugDraw;
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

/// Per-frame shader inputs: camera position and the directional light.
/// Every field is padded to 16 bytes for uniform-buffer layout.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub camera_position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub light_direction: [f32; 4],
}

impl SceneUniforms {
    pub fn new(
        camera_position: Vec3,
        ambient: Vec3,
        diffuse: Vec3,
        specular: Vec3,
        light_direction: Vec3,
    ) -> Self {
        Self {
            camera_position: camera_position.extend(1.0).to_array(),
            ambient: ambient.extend(1.0).to_array(),
            diffuse: diffuse.extend(1.0).to_array(),
            specular: specular.extend(1.0).to_array(),
            light_direction: light_direction.extend(0.0).to_array(),
        }
    }
}

/// Per-object shader inputs.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub projection_view_model: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model's upper 3x3, stored as a 4x4.
    pub normal: [[f32; 4]; 4],
}

impl ObjectUniforms {
    pub fn new(projection: Mat4, view: Mat4, model: Mat4) -> Self {
        let pvm = projection * view * model;
        let normal = Mat3::from_mat4(model).inverse().transpose();
        Self {
            projection_view_model: pvm.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            normal: Mat4::from_mat3(normal).to_cols_array_2d(),
        }
    }

    pub fn projection_view_model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.projection_view_model)
    }
}

/// Which uploaded mesh a draw item uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshSlot {
    Earth,
    Model,
}

impl MeshSlot {
    pub fn label(self) -> &'static str {
        match self {
            MeshSlot::Earth => "earth",
            MeshSlot::Model => "model",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub slot: MeshSlot,
    pub object: ObjectUniforms,
    /// Texture unit the diffuse texture is bound to.
    pub texture_unit: u32,
}

/// Everything a backend needs to render one frame, in draw order.
#[derive(Debug)]
pub struct Frame<'a> {
    pub clear_color: [f32; 4],
    pub scene: SceneUniforms,
    pub view_projection: Mat4,
    pub items: Vec<DrawItem>,
    pub debug: &'a DebugDraw,
}
