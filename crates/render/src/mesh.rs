use crate::geometry::{CUBE_INDICES, CUBE_VERTICES, QUAD_INDICES, QUAD_VERTICES};
use scene_common::{MeshData, Vertex};
use std::cell::Cell;
use std::rc::Rc;

/// Creates GPU buffers. Buffers are released when the returned value is dropped.
pub trait GeometryBackend {
    type Buffer;

    fn create_vertex_buffer(&self, label: &str, vertices: &[Vertex]) -> Self::Buffer;
    fn create_index_buffer(&self, label: &str, indices: &[u32]) -> Self::Buffer;
}

/// Consumes triangle-list draw calls, e.g. an open render pass.
pub trait DrawSink<B> {
    fn draw_indexed(&mut self, vertices: &B, indices: &B, index_count: u32);
    fn draw(&mut self, vertices: &B, vertex_count: u32);
}

/// Errors from geometry buffer setup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("mesh is already initialized")]
    AlreadyInitialized,
    #[error("mesh has no vertices")]
    NoVertices,
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: u32 },
}

/// Geometry buffer: one vertex buffer, an optional index buffer, and the
/// triangle count derived from whichever of the two is drawn.
#[derive(Debug)]
pub struct Mesh<B> {
    vertex_buffer: Option<B>,
    index_buffer: Option<B>,
    vertex_count: u32,
    index_count: u32,
    triangle_count: u32,
}

impl<B> Default for Mesh<B> {
    fn default() -> Self {
        Self {
            vertex_buffer: None,
            index_buffer: None,
            vertex_count: 0,
            index_count: 0,
            triangle_count: 0,
        }
    }
}

impl<B> Mesh<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.vertex_buffer.is_some()
    }

    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn triangle_count(&self) -> u32 {
        self.triangle_count
    }

    /// Upload `vertices` and, when `indices` is non-empty, `indices`.
    ///
    /// Fails without touching the backend if the mesh already holds buffers.
    pub fn initialize<G>(
        &mut self,
        backend: &G,
        label: &str,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<(), MeshError>
    where
        G: GeometryBackend<Buffer = B>,
    {
        if self.is_initialized() {
            return Err(MeshError::AlreadyInitialized);
        }
        if vertices.is_empty() {
            return Err(MeshError::NoVertices);
        }
        let vertex_count = vertices.len() as u32;
        if let Some(&index) = indices.iter().find(|&&i| i >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        self.vertex_buffer = Some(backend.create_vertex_buffer(label, vertices));
        self.vertex_count = vertex_count;

        if indices.is_empty() {
            self.triangle_count = vertex_count / 3;
        } else {
            self.index_buffer = Some(backend.create_index_buffer(label, indices));
            self.index_count = indices.len() as u32;
            self.triangle_count = self.index_count / 3;
        }

        tracing::debug!(
            label,
            vertices = self.vertex_count,
            indices = self.index_count,
            triangles = self.triangle_count,
            "mesh initialized"
        );
        Ok(())
    }

    pub fn initialize_data<G>(
        &mut self,
        backend: &G,
        label: &str,
        data: &MeshData,
    ) -> Result<(), MeshError>
    where
        G: GeometryBackend<Buffer = B>,
    {
        self.initialize(backend, label, &data.vertices, &data.indices)
    }

    /// Unit quad: 4 vertices, 2 triangles.
    pub fn initialize_quad<G>(&mut self, backend: &G) -> Result<(), MeshError>
    where
        G: GeometryBackend<Buffer = B>,
    {
        self.initialize(backend, "quad", &QUAD_VERTICES, &QUAD_INDICES)
    }

    /// Unit cube: 8 vertices, 12 triangles.
    pub fn initialize_cube<G>(&mut self, backend: &G) -> Result<(), MeshError>
    where
        G: GeometryBackend<Buffer = B>,
    {
        self.initialize(backend, "cube", &CUBE_VERTICES, &CUBE_INDICES)
    }

    /// Issue one triangle-list draw call. Does nothing before initialization.
    pub fn draw<S: DrawSink<B>>(&self, sink: &mut S) {
        let Some(vertices) = &self.vertex_buffer else {
            tracing::trace!("skipping draw of uninitialized mesh");
            return;
        };
        match &self.index_buffer {
            Some(indices) => sink.draw_indexed(vertices, indices, self.triangle_count * 3),
            None => sink.draw(vertices, self.triangle_count * 3),
        }
    }
}

/// Headless `GeometryBackend`: hands out labelled buffers and tracks how many
/// are alive.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    live: Rc<Cell<usize>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers created and not yet dropped.
    pub fn live_buffers(&self) -> usize {
        self.live.get()
    }

    fn allocate(&self, label: String, len: usize) -> RecordedBuffer {
        self.live.set(self.live.get() + 1);
        RecordedBuffer {
            label,
            len,
            live: Rc::clone(&self.live),
        }
    }
}

impl GeometryBackend for RecordingBackend {
    type Buffer = RecordedBuffer;

    fn create_vertex_buffer(&self, label: &str, vertices: &[Vertex]) -> RecordedBuffer {
        self.allocate(format!("{label}_vertices"), vertices.len())
    }

    fn create_index_buffer(&self, label: &str, indices: &[u32]) -> RecordedBuffer {
        self.allocate(format!("{label}_indices"), indices.len())
    }
}

#[derive(Debug)]
pub struct RecordedBuffer {
    pub label: String,
    /// Element count at creation.
    pub len: usize,
    live: Rc<Cell<usize>>,
}

impl Drop for RecordedBuffer {
    fn drop(&mut self) {
        self.live.set(self.live.get().saturating_sub(1));
    }
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCall {
    Indexed { buffer: String, index_count: u32 },
    NonIndexed { buffer: String, vertex_count: u32 },
}

impl DrawCall {
    pub fn triangles(&self) -> u32 {
        match self {
            DrawCall::Indexed { index_count, .. } => index_count / 3,
            DrawCall::NonIndexed { vertex_count, .. } => vertex_count / 3,
        }
    }
}

/// Headless `DrawSink` that records every call.
#[derive(Debug, Default)]
pub struct DrawRecorder {
    pub calls: Vec<DrawCall>,
}

impl DrawRecorder {
    pub fn triangles(&self) -> u32 {
        self.calls.iter().map(DrawCall::triangles).sum()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl DrawSink<RecordedBuffer> for DrawRecorder {
    fn draw_indexed(
        &mut self,
        vertices: &RecordedBuffer,
        _indices: &RecordedBuffer,
        index_count: u32,
    ) {
        self.calls.push(DrawCall::Indexed {
            buffer: vertices.label.clone(),
            index_count,
        });
    }

    fn draw(&mut self, vertices: &RecordedBuffer, vertex_count: u32) {
        self.calls.push(DrawCall::NonIndexed {
            buffer: vertices.label.clone(),
            vertex_count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::uv_sphere;

    #[test]
    fn quad_draws_two_indexed_triangles() {
        let backend = RecordingBackend::new();
        let mut mesh = Mesh::new();
        mesh.initialize_quad(&backend).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(backend.live_buffers(), 2);

        let mut recorder = DrawRecorder::default();
        mesh.draw(&mut recorder);
        assert_eq!(
            recorder.calls,
            vec![DrawCall::Indexed {
                buffer: "quad_vertices".into(),
                index_count: 6,
            }]
        );
    }

    #[test]
    fn cube_draws_twelve_triangles() {
        let backend = RecordingBackend::new();
        let mut mesh = Mesh::new();
        mesh.initialize_cube(&backend).unwrap();
        assert_eq!(mesh.vertex_count(), 8);

        let mut recorder = DrawRecorder::default();
        mesh.draw(&mut recorder);
        assert_eq!(recorder.triangles(), 12);
    }

    #[test]
    fn non_indexed_triangle_count_uses_vertices() {
        let backend = RecordingBackend::new();
        let mut mesh = Mesh::new();
        let strip = [Vertex::default(); 7];
        mesh.initialize(&backend, "strip", &strip, &[]).unwrap();
        assert!(!mesh.is_indexed());
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(backend.live_buffers(), 1);

        let mut recorder = DrawRecorder::default();
        mesh.draw(&mut recorder);
        assert_eq!(
            recorder.calls,
            vec![DrawCall::NonIndexed {
                buffer: "strip_vertices".into(),
                vertex_count: 6,
            }]
        );
    }

    #[test]
    fn indexed_triangle_count_uses_indices() {
        let backend = RecordingBackend::new();
        let sphere = uv_sphere(0.5, 16, 8);
        let mut mesh = Mesh::new();
        mesh.initialize_data(&backend, "sphere", &sphere).unwrap();
        assert_eq!(mesh.triangle_count(), sphere.indices.len() as u32 / 3);
        assert_eq!(mesh.index_count(), sphere.indices.len() as u32);
    }

    #[test]
    fn reinitialize_is_rejected_without_new_buffers() {
        let backend = RecordingBackend::new();
        let mut mesh = Mesh::new();
        mesh.initialize_quad(&backend).unwrap();
        let again = mesh.initialize_cube(&backend);
        assert_eq!(again, Err(MeshError::AlreadyInitialized));
        assert_eq!(backend.live_buffers(), 2);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let backend = RecordingBackend::new();
        let mut mesh: Mesh<RecordedBuffer> = Mesh::new();
        let empty = mesh.initialize(&backend, "empty", &[], &[]);
        assert_eq!(empty, Err(MeshError::NoVertices));
        assert_eq!(
            mesh.initialize(&backend, "bad", &[Vertex::default(); 3], &[0, 1, 3]),
            Err(MeshError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            })
        );
        assert!(!mesh.is_initialized());
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn drop_releases_buffers() {
        let backend = RecordingBackend::new();
        {
            let mut mesh = Mesh::new();
            mesh.initialize_cube(&backend).unwrap();
            assert_eq!(backend.live_buffers(), 2);
        }
        assert_eq!(backend.live_buffers(), 0);

        let uninitialized: Mesh<RecordedBuffer> = Mesh::new();
        drop(uninitialized);
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn uninitialized_mesh_draws_nothing() {
        let mesh: Mesh<RecordedBuffer> = Mesh::new();
        let mut recorder = DrawRecorder::default();
        mesh.draw(&mut recorder);
        assert!(recorder.calls.is_empty());
    }
}
