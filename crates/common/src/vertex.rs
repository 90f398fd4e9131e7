use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// GPU vertex. Attribute slots follow field order: position (0), normal (1),
/// tex_coord (2), color (3). Stride is `size_of::<Vertex>()`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Homogeneous position, w = 1.
    pub position: [f32; 4],
    /// Direction, w = 0.
    pub normal: [f32; 4],
    pub tex_coord: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    pub fn new(position: Vec3, normal: Vec3, tex_coord: [f32; 2]) -> Self {
        Self {
            position: position.extend(1.0).to_array(),
            normal: normal.extend(0.0).to_array(),
            tex_coord,
            color: Self::WHITE,
        }
    }

    pub fn position3(&self) -> Vec3 {
        Vec3::new(self.position[0], self.position[1], self.position[2])
    }
}

/// CPU-side geometry ready for upload. An empty `indices` means non-indexed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    /// `index_count / 3` when indexed, else `vertex_count / 3`.
    pub fn triangle_count(&self) -> u32 {
        if self.is_indexed() {
            (self.indices.len() / 3) as u32
        } else {
            (self.vertices.len() / 3) as u32
        }
    }

    /// Axis-aligned bounds of the vertex positions, `None` when empty.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(Vertex::position3);
        let first = iter.next()?;
        let bounds = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(bounds)
    }
}
