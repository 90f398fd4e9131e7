use crate::backend::{PassSink, WgpuBackend};
use crate::shaders;
use crate::texture::{self, GpuTexture};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use scene_common::{MeshData, TextureData, Vertex};
use scene_render::{Frame, LineVertex, Mesh, MeshError, MeshSlot, ObjectUniforms, SceneUniforms};
use std::collections::HashMap;
use wgpu::util::DeviceExt;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    0 => Float32x4,
    1 => Float32x4,
    2 => Float32x2,
    3 => Float32x4,
];

const LINE_ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x4,
];

#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("shader failed validation: {0}")]
    Shader(String),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LineUniforms {
    view_proj: [[f32; 4]; 4],
}

/// GPU resources for one uploaded mesh.
struct SlotResources {
    mesh: Mesh<wgpu::Buffer>,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    _texture: GpuTexture,
    texture_bind_group: wgpu::BindGroup,
}

/// wgpu-based scene renderer.
///
/// wgpu has no texture units: each slot's texture is bound at group 2 and
/// `DrawItem::texture_unit` is not consulted.
pub struct WgpuRenderer {
    scene_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    line_uniform_buffer: wgpu::Buffer,
    line_bind_group: wgpu::BindGroup,
    line_vertex_buffer: wgpu::Buffer,
    line_capacity: usize,
    slots: HashMap<MeshSlot, SlotResources>,
    depth_texture: wgpu::TextureView,
}

impl WgpuRenderer {
    /// Build pipelines and shared buffers. `scene_shader` replaces the
    /// built-in WGSL when given; it must keep the same bindings and entry
    /// points.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        scene_shader: Option<&str>,
        line_capacity: usize,
    ) -> Result<Self, GpuError> {
        let scene_layout = uniform_layout(
            device,
            "scene_bind_group_layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );
        let object_layout = uniform_layout(
            device,
            "object_bind_group_layout",
            wgpu::ShaderStages::VERTEX,
        );
        let line_layout =
            uniform_layout(device, "line_bind_group_layout", wgpu::ShaderStages::VERTEX);
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let scene_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(scene_shader.unwrap_or(shaders::SCENE_SHADER).into()),
        });
        let scene_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&scene_layout, &object_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let scene_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&scene_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &scene_module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &VERTEX_ATTRIBUTES,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &scene_module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(color_target(surface_format))],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state()),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let line_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });
        let line_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("line_pipeline_layout"),
            bind_group_layouts: &[&line_layout],
            push_constant_ranges: &[],
        });
        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line_pipeline"),
            layout: Some(&line_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &line_module,
                entry_point: Some("vs_line"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<LineVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &LINE_ATTRIBUTES,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &line_module,
                entry_point: Some("fs_line"),
                compilation_options: Default::default(),
                targets: &[Some(color_target(surface_format))],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state()),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(GpuError::Shader(error.to_string()));
        }

        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_uniform_buffer"),
            contents: bytemuck::bytes_of(&SceneUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let scene_bind_group =
            bind_buffer(device, "scene_bind_group", &scene_layout, &scene_buffer);

        let line_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("line_uniform_buffer"),
            contents: bytemuck::bytes_of(&LineUniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let line_bind_group = bind_buffer(
            device,
            "line_bind_group",
            &line_layout,
            &line_uniform_buffer,
        );

        // Two vertices per line.
        let line_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("line_vertex_buffer"),
            size: (line_capacity.max(1) * 2 * std::mem::size_of::<LineVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("diffuse_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        tracing::debug!(
            ?surface_format,
            line_capacity,
            custom_shader = scene_shader.is_some(),
            "renderer ready"
        );

        Ok(Self {
            scene_pipeline,
            line_pipeline,
            scene_buffer,
            scene_bind_group,
            object_layout,
            texture_layout,
            sampler,
            line_uniform_buffer,
            line_bind_group,
            line_vertex_buffer,
            line_capacity,
            slots: HashMap::new(),
            depth_texture: texture::create_depth_texture(device, width, height),
        })
    }

    /// Upload a mesh and its diffuse texture into `slot`. A slot can be
    /// filled once.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        slot: MeshSlot,
        data: &MeshData,
        texture: &TextureData,
    ) -> Result<(), GpuError> {
        if self.slots.contains_key(&slot) {
            return Err(MeshError::AlreadyInitialized.into());
        }

        let label = slot.label();
        let mut mesh = Mesh::new();
        mesh.initialize_data(&WgpuBackend::new(device), label, data)?;

        let object_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label}_object_buffer")),
            size: std::mem::size_of::<ObjectUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let object_bind_group = bind_buffer(
            device,
            &format!("{label}_object_bind_group"),
            &self.object_layout,
            &object_buffer,
        );

        let gpu_texture =
            GpuTexture::from_data(device, queue, &format!("{label}_texture"), texture);
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}_texture_bind_group")),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&gpu_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        tracing::debug!(
            slot = label,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            texture_width = texture.width,
            texture_height = texture.height,
            "uploaded mesh"
        );

        self.slots.insert(
            slot,
            SlotResources {
                mesh,
                object_buffer,
                object_bind_group,
                _texture: gpu_texture,
                texture_bind_group,
            },
        );
        Ok(())
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = texture::create_depth_texture(device, width, height);
    }

    /// Render one frame: the items in order, then the debug lines.
    /// Items whose slot was never uploaded are skipped.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        frame: &Frame<'_>,
    ) {
        queue.write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&frame.scene));
        queue.write_buffer(
            &self.line_uniform_buffer,
            0,
            bytemuck::bytes_of(&LineUniforms {
                view_proj: frame.view_projection.to_cols_array_2d(),
            }),
        );

        let mut drawable = Vec::with_capacity(frame.items.len());
        for item in &frame.items {
            match self.slots.get(&item.slot) {
                Some(resources) => {
                    queue.write_buffer(
                        &resources.object_buffer,
                        0,
                        bytemuck::bytes_of(&item.object),
                    );
                    drawable.push(resources);
                }
                None => {
                    tracing::warn!(slot = item.slot.label(), "draw item has no uploaded mesh")
                }
            }
        }

        let lines = frame.debug.vertices();
        let line_vertices = &lines[..lines.len().min(self.line_capacity * 2)];
        if !line_vertices.is_empty() {
            queue.write_buffer(
                &self.line_vertex_buffer,
                0,
                bytemuck::cast_slice(line_vertices),
            );
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let [r, g, b, a] = frame.clear_color.map(f64::from);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.scene_pipeline);
            pass.set_bind_group(0, &self.scene_bind_group, &[]);
            for resources in drawable {
                pass.set_bind_group(1, &resources.object_bind_group, &[]);
                pass.set_bind_group(2, &resources.texture_bind_group, &[]);
                resources.mesh.draw(&mut PassSink::new(&mut pass));
            }

            if !line_vertices.is_empty() {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_bind_group(0, &self.line_bind_group, &[]);
                pass.set_vertex_buffer(0, self.line_vertex_buffer.slice(..));
                pass.draw(0..line_vertices.len() as u32, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn bind_buffer(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

fn color_target(format: wgpu::TextureFormat) -> wgpu::ColorTargetState {
    wgpu::ColorTargetState {
        format,
        blend: Some(wgpu::BlendState::REPLACE),
        write_mask: wgpu::ColorWrites::ALL,
    }
}

fn depth_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: texture::DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: Default::default(),
        bias: Default::default(),
    }
}
