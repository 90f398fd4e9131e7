use scene_common::Vertex;
use scene_render::{DrawSink, GeometryBackend};
use wgpu::util::DeviceExt;

/// Creates static vertex/index buffers on a wgpu device.
pub struct WgpuBackend<'d> {
    device: &'d wgpu::Device,
}

impl<'d> WgpuBackend<'d> {
    pub fn new(device: &'d wgpu::Device) -> Self {
        Self { device }
    }
}

impl GeometryBackend for WgpuBackend<'_> {
    type Buffer = wgpu::Buffer;

    fn create_vertex_buffer(&self, label: &str, vertices: &[Vertex]) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertex_buffer")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        })
    }

    fn create_index_buffer(&self, label: &str, indices: &[u32]) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_index_buffer")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        })
    }
}

/// Routes mesh draw calls into an open render pass. Pipeline and bind
/// groups must already be set.
pub struct PassSink<'p, 'e> {
    pass: &'p mut wgpu::RenderPass<'e>,
}

impl<'p, 'e> PassSink<'p, 'e> {
    pub fn new(pass: &'p mut wgpu::RenderPass<'e>) -> Self {
        Self { pass }
    }
}

impl DrawSink<wgpu::Buffer> for PassSink<'_, '_> {
    fn draw_indexed(&mut self, vertices: &wgpu::Buffer, indices: &wgpu::Buffer, index_count: u32) {
        self.pass.set_vertex_buffer(0, vertices.slice(..));
        self.pass
            .set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
        self.pass.draw_indexed(0..index_count, 0, 0..1);
    }

    fn draw(&mut self, vertices: &wgpu::Buffer, vertex_count: u32) {
        self.pass.set_vertex_buffer(0, vertices.slice(..));
        self.pass.draw(0..vertex_count, 0..1);
    }
}
