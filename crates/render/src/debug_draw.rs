use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Immediate-mode debug lines, rebuilt every frame.
///
/// Owned by the running scene and handed to the renderer by reference.
/// Lines past `capacity` are dropped and counted.
#[derive(Debug)]
pub struct DebugDraw {
    vertices: Vec<LineVertex>,
    capacity: usize,
    dropped: usize,
}

impl DebugDraw {
    pub fn new(capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity * 2),
            capacity,
            dropped: 0,
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.dropped = 0;
    }

    /// Queue a line. Returns false if it was dropped for lack of capacity.
    pub fn add_line(&mut self, start: Vec3, end: Vec3, color: Vec4) -> bool {
        if self.line_count() >= self.capacity {
            if self.dropped == 0 {
                tracing::warn!(capacity = self.capacity, "debug line capacity reached");
            }
            self.dropped += 1;
            return false;
        }
        let color = color.to_array();
        self.vertices.push(LineVertex {
            position: start.to_array(),
            color,
        });
        self.vertices.push(LineVertex {
            position: end.to_array(),
            color,
        });
        true
    }

    /// Axis gizmo for `transform`: red X, green Y, blue Z, each `scale` long.
    pub fn add_transform(&mut self, transform: Mat4, scale: f32) {
        let origin = transform.transform_point3(Vec3::ZERO);
        let axes = [
            (Vec3::X, Vec4::new(1.0, 0.0, 0.0, 1.0)),
            (Vec3::Y, Vec4::new(0.0, 1.0, 0.0, 1.0)),
            (Vec3::Z, Vec4::new(0.0, 0.0, 1.0, 1.0)),
        ];
        for (axis, color) in axes {
            let tip = origin + transform.transform_vector3(axis).normalize_or_zero() * scale;
            self.add_line(origin, tip, color);
        }
    }

    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    pub fn line_count(&self) -> usize {
        self.vertices.len() / 2
    }

    /// Lines rejected since the last `clear`.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_two_vertices() {
        let mut debug = DebugDraw::new(4);
        assert!(debug.add_line(Vec3::ZERO, Vec3::X, Vec4::ONE));
        assert_eq!(debug.vertices().len(), 2);
        assert_eq!(debug.line_count(), 1);
        assert_eq!(debug.vertices()[1].position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn capacity_drops_excess_lines() {
        let mut debug = DebugDraw::new(2);
        for _ in 0..5 {
            debug.add_line(Vec3::ZERO, Vec3::Y, Vec4::ONE);
        }
        assert_eq!(debug.line_count(), 2);
        assert_eq!(debug.dropped(), 3);

        debug.clear();
        assert_eq!(debug.line_count(), 0);
        assert_eq!(debug.dropped(), 0);
    }

    #[test]
    fn identity_gizmo_has_three_axes() {
        let mut debug = DebugDraw::new(16);
        debug.add_transform(Mat4::IDENTITY, 4.0);
        assert_eq!(debug.line_count(), 3);
        assert_eq!(debug.vertices()[1].position, [4.0, 0.0, 0.0]);
        assert_eq!(debug.vertices()[5].position, [0.0, 0.0, 4.0]);
        assert_eq!(debug.vertices()[3].color, [0.0, 1.0, 0.0, 1.0]);
    }
}
