//! Static geometry tables and procedural shapes.

use glam::Vec3;
use scene_common::{MeshData, Vertex};
use std::f32::consts::{PI, TAU};

pub const GREEN: [f32; 4] = [0.2, 0.8, 0.2, 1.0];
pub const MAGENTA: [f32; 4] = [0.8, 0.2, 0.8, 1.0];
pub const CYAN: [f32; 4] = [0.2, 0.8, 0.8, 1.0];
pub const RED: [f32; 4] = [0.8, 0.2, 0.2, 1.0];

const fn vertex(
    position: [f32; 3],
    normal: [f32; 3],
    tex_coord: [f32; 2],
    color: [f32; 4],
) -> Vertex {
    Vertex {
        position: [position[0], position[1], position[2], 1.0],
        normal: [normal[0], normal[1], normal[2], 0.0],
        tex_coord,
        color,
    }
}

/// Unit quad on the XZ plane facing +Y.
#[rustfmt::skip]
pub static QUAD_VERTICES: [Vertex; 4] = [
    vertex([-0.5, 0.0,  0.5], [0.0, 1.0, 0.0], [0.0, 1.0], GREEN),   // front left
    vertex([ 0.5, 0.0,  0.5], [0.0, 1.0, 0.0], [1.0, 1.0], MAGENTA), // front right
    vertex([-0.5, 0.0, -0.5], [0.0, 1.0, 0.0], [0.0, 0.0], CYAN),    // back left
    vertex([ 0.5, 0.0, -0.5], [0.0, 1.0, 0.0], [1.0, 0.0], RED),     // back right
];

/// Two counter-clockwise triangles (seen from +Y).
#[rustfmt::skip]
pub static QUAD_INDICES: [u32; 6] = [
    0, 1, 2,
    2, 1, 3,
];

const D: f32 = 0.577_350_26;

/// Unit cube standing on the XZ plane, y in `[0, 1]`. Normals point away from the centre.
#[rustfmt::skip]
pub static CUBE_VERTICES: [Vertex; 8] = [
    vertex([-0.5, 0.0,  0.5], [-D, -D,  D], [0.0, 0.0], GREEN),
    vertex([ 0.5, 0.0,  0.5], [ D, -D,  D], [0.0, 0.0], MAGENTA),
    vertex([-0.5, 0.0, -0.5], [-D, -D, -D], [0.0, 0.0], CYAN),
    vertex([ 0.5, 0.0, -0.5], [ D, -D, -D], [0.0, 0.0], RED),
    vertex([-0.5, 1.0,  0.5], [-D,  D,  D], [0.0, 0.0], GREEN),
    vertex([ 0.5, 1.0,  0.5], [ D,  D,  D], [0.0, 0.0], MAGENTA),
    vertex([-0.5, 1.0, -0.5], [-D,  D, -D], [0.0, 0.0], CYAN),
    vertex([ 0.5, 1.0, -0.5], [ D,  D, -D], [0.0, 0.0], RED),
];

#[rustfmt::skip]
pub static CUBE_INDICES: [u32; 36] = [
    0, 1, 2, // bottom
    2, 1, 3,
    4, 5, 6, // top
    6, 5, 7,
    0, 2, 6, // left
    0, 4, 6,
    1, 3, 5, // right
    3, 5, 7,
    0, 1, 4, // front
    1, 4, 5,
    2, 3, 7, // back
    2, 6, 7,
];

/// UV sphere centred on the origin. `segments` around Y, `rings` pole to pole.
///
/// Vertices are duplicated along the seam so texture U runs 0..1. Triangles
/// are counter-clockwise seen from outside; the degenerate triangles at the
/// poles are skipped.
pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> MeshData {
    let segments = segments.max(3);
    let rings = rings.max(2);

    let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
    for r in 0..=rings {
        let v = r as f32 / rings as f32;
        let phi = v * PI;
        for s in 0..=segments {
            let u = s as f32 / segments as f32;
            let theta = u * TAU;
            let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            vertices.push(Vertex::new(normal * radius, normal, [u, v]));
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity((segments * (rings - 1) * 6) as usize);
    for r in 0..rings {
        for s in 0..segments {
            let a = r * stride + s;
            let b = a + stride;
            let c = b + 1;
            let d = a + 1;
            if r != 0 {
                indices.extend_from_slice(&[a, d, c]);
            }
            if r != rings - 1 {
                indices.extend_from_slice(&[a, c, b]);
            }
        }
    }

    MeshData::new(vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(vertices: &[Vertex], tri: &[u32]) -> Vec3 {
        let p = |i: u32| vertices[i as usize].position3();
        (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]))
    }

    #[test]
    fn quad_table() {
        assert_eq!(QUAD_VERTICES.len(), 4);
        assert_eq!(QUAD_INDICES.len() / 3, 2);
        assert_eq!(QUAD_INDICES, [0, 1, 2, 2, 1, 3]);
        assert_eq!(QUAD_VERTICES[0].color, GREEN);
        assert_eq!(QUAD_VERTICES[3].color, RED);
        assert_eq!(QUAD_VERTICES[0].tex_coord, [0.0, 1.0]);
    }

    #[test]
    fn quad_winds_counter_clockwise_from_above() {
        for tri in QUAD_INDICES.chunks_exact(3) {
            assert!(face_normal(&QUAD_VERTICES, tri).y > 0.0);
        }
    }

    #[test]
    fn cube_table() {
        assert_eq!(CUBE_VERTICES.len(), 8);
        assert_eq!(CUBE_INDICES.len() / 3, 12);
        assert_eq!(&CUBE_INDICES[..6], &[0, 1, 2, 2, 1, 3]);
        assert_eq!(&CUBE_INDICES[30..], &[2, 3, 7, 2, 6, 7]);
        assert!(CUBE_INDICES.iter().all(|&i| i < 8));
        for (i, v) in CUBE_VERTICES.iter().enumerate() {
            assert_eq!(v.color, [GREEN, MAGENTA, CYAN, RED][i % 4]);
        }
    }

    #[test]
    fn sphere_counts() {
        let sphere = uv_sphere(0.5, 32, 16);
        assert_eq!(sphere.vertices.len(), 33 * 17);
        assert_eq!(sphere.triangle_count(), 32 * (2 * 16 - 2));
        let count = sphere.vertices.len();
        assert!(sphere.indices.iter().all(|&i| (i as usize) < count));
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let sphere = uv_sphere(2.0, 8, 6);
        for v in &sphere.vertices {
            assert!((v.position3().length() - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn sphere_faces_point_outward() {
        let sphere = uv_sphere(1.0, 12, 8);
        for tri in sphere.indices.chunks_exact(3) {
            let n = face_normal(&sphere.vertices, tri);
            let centroid = tri
                .iter()
                .map(|&i| sphere.vertices[i as usize].position3())
                .sum::<Vec3>()
                / 3.0;
            assert!(n.dot(centroid) > 0.0);
        }
    }
}
