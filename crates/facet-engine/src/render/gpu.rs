use anyhow::{Result, anyhow};

use crate::batch::{DrawBackend, Vertex};
use crate::coords::{Mat4, Viewport};

/// Output target the backend currently renders into.
pub(crate) struct Output {
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// wgpu implementation of [`DrawBackend`].
///
/// Owns the flat-color pipeline for one surface format, a projection uniform,
/// and growable vertex/index upload buffers. Each submission encodes a single
/// render pass (`LoadOp::Load`, so earlier submissions of the frame remain)
/// with exactly one indexed draw.
///
/// The embedder supplies the output view per frame via [`set_output`]
/// (typically the acquired swapchain view); [`Screen`](super::Screen) swaps
/// it for its offscreen texture while set.
pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    projection_ubo: wgpu::Buffer,
    vbo: wgpu::Buffer,
    vbo_capacity: usize,
    ibo: wgpu::Buffer,
    ibo_capacity: usize,
    output: Option<Output>,
}

const INITIAL_VERTEX_CAPACITY: usize = 1024;
const INITIAL_INDEX_CAPACITY: usize = INITIAL_VERTEX_CAPACITY * 3;

impl GpuBackend {
    /// Builds the pipeline for `format` eagerly; the format must match every
    /// view later passed to [`set_output`](Self::set_output).
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("facet shape shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shape.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("facet shape bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<Mat4>() as u64
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("facet shape pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("facet shape pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Winding is consistent but direction-dependent for lines;
                // both faces must rasterize.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        let projection_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("facet projection ubo"),
            size: std::mem::size_of::<Mat4>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("facet shape bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: projection_ubo.as_entire_binding(),
            }],
        });

        let vbo = Self::create_vertex_buffer(&device, INITIAL_VERTEX_CAPACITY);
        let ibo = Self::create_index_buffer(&device, INITIAL_INDEX_CAPACITY);

        Self {
            device,
            queue,
            pipeline,
            bind_group,
            projection_ubo,
            vbo,
            vbo_capacity: INITIAL_VERTEX_CAPACITY,
            ibo,
            ibo_capacity: INITIAL_INDEX_CAPACITY,
            output: None,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Directs subsequent submissions into `view` (`width`/`height` in
    /// pixels). Called by the embedder with the frame's swapchain view.
    pub fn set_output(&mut self, view: wgpu::TextureView, width: u32, height: u32) {
        self.output = Some(Output { view, width, height });
    }

    /// Drops the current output; submissions fail until a new one is set.
    pub fn clear_output(&mut self) {
        self.output = None;
    }

    pub fn output_size(&self) -> Option<(u32, u32)> {
        self.output.as_ref().map(|o| (o.width, o.height))
    }

    /// Replaces the current output wholesale, returning the previous one.
    /// Used by `Screen` to redirect and later restore rendering.
    pub(crate) fn swap_output(&mut self, new: Option<Output>) -> Option<Output> {
        std::mem::replace(&mut self.output, new)
    }

    pub(crate) fn output_view(&self) -> Option<(wgpu::TextureView, u32, u32)> {
        self.output.as_ref().map(|o| (o.view.clone(), o.width, o.height))
    }

    fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("facet shape vbo"),
            size: (capacity * std::mem::size_of::<Vertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_index_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("facet shape ibo"),
            size: (capacity * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn ensure_buffer_capacity(&mut self, vertices: usize, indices: usize) {
        if vertices > self.vbo_capacity {
            let new_cap = vertices.next_power_of_two();
            log::debug!("growing vertex upload buffer to {new_cap} vertices");
            self.vbo = Self::create_vertex_buffer(&self.device, new_cap);
            self.vbo_capacity = new_cap;
        }
        if indices > self.ibo_capacity {
            let new_cap = indices.next_power_of_two();
            log::debug!("growing index upload buffer to {new_cap} indices");
            self.ibo = Self::create_index_buffer(&self.device, new_cap);
            self.ibo_capacity = new_cap;
        }
    }
}

impl DrawBackend for GpuBackend {
    fn viewport(&self) -> Viewport {
        match &self.output {
            Some(o) => Viewport::new(o.width as f32, o.height as f32),
            None => Viewport::default(),
        }
    }

    fn apply_shading_state(&mut self, projection: &Mat4) -> Result<()> {
        self.queue
            .write_buffer(&self.projection_ubo, 0, bytemuck::bytes_of(projection));
        Ok(())
    }

    fn submit_indexed_triangles(&mut self, vertices: &[Vertex], indices: &[u32]) -> Result<()> {
        let Some((view, _, _)) = self.output_view() else {
            return Err(anyhow!("no output target set"));
        };
        if vertices.is_empty() || indices.is_empty() {
            return Ok(());
        }

        self.ensure_buffer_capacity(vertices.len(), indices.len());
        self.queue.write_buffer(&self.vbo, 0, bytemuck::cast_slice(vertices));
        self.queue.write_buffer(&self.ibo, 0, bytemuck::cast_slice(indices));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("facet shape encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("facet shape pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.set_vertex_buffer(0, self.vbo.slice(..));
            rpass.set_index_buffer(self.ibo.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..indices.len() as u32, 0, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}
