use crate::coords::Rect;
use crate::error::{Error, Result};

use super::gpu::{GpuBackend, Output};

/// Smallest allowed offscreen dimension, in pixels.
pub const MIN_SCREEN_DIM: u32 = 64;
/// Largest allowed offscreen dimension, in pixels.
pub const MAX_SCREEN_DIM: u32 = 4096;

/// Fixed-resolution offscreen render target with letterboxed presentation.
///
/// Everything drawn while the screen is set lands on its texture at the
/// logical resolution; `present` then blits that texture into the real
/// output, centered and scaled to the largest rectangle that preserves the
/// aspect ratio (pillarboxed or letterboxed as needed).
///
/// Set/unset discipline mirrors the batch state machine: `set` and `unset`
/// must alternate, and presenting while still set is an error (the texture
/// would be sampled and rendered at once).
pub struct Screen {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    saved_output: Option<Output>,
    is_set: bool,
}

impl Screen {
    /// Creates the offscreen target. Each dimension is clamped to
    /// `[MIN_SCREEN_DIM, MAX_SCREEN_DIM]`; `format` must match the real
    /// output's format.
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let (w, h) = (
            width.clamp(MIN_SCREEN_DIM, MAX_SCREEN_DIM),
            height.clamp(MIN_SCREEN_DIM, MAX_SCREEN_DIM),
        );
        if (w, h) != (width, height) {
            log::warn!("screen size {width}x{height} clamped to {w}x{h}");
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("facet screen target"),
            size: wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("facet screen sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("facet screen blit shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/blit.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("facet screen bgl"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("facet screen pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("facet screen blit pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
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

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("facet screen bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            texture,
            view,
            width: w,
            height: h,
            pipeline,
            bind_group,
            saved_output: None,
            is_set: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Redirects the backend's output to the offscreen texture.
    pub fn set(&mut self, backend: &mut GpuBackend) -> Result<()> {
        if self.is_set {
            return Err(Error::InvalidState("render target already set"));
        }

        self.saved_output = backend.swap_output(Some(Output {
            view: self.view.clone(),
            width: self.width,
            height: self.height,
        }));
        self.is_set = true;
        Ok(())
    }

    /// Restores the output that was current before `set`.
    pub fn unset(&mut self, backend: &mut GpuBackend) -> Result<()> {
        if !self.is_set {
            return Err(Error::InvalidState("render target is not set"));
        }

        let saved = self.saved_output.take();
        backend.swap_output(saved);
        self.is_set = false;
        Ok(())
    }

    /// Clears the real output and blits the offscreen texture into the
    /// aspect-preserving destination rectangle.
    ///
    /// The clear is magenta in debug builds so the letterbox bars are
    /// unmistakable during development, black in release.
    pub fn present(&self, backend: &mut GpuBackend) -> Result<()> {
        if self.is_set {
            return Err(Error::InvalidState("render target is still set"));
        }
        let Some((out_view, out_w, out_h)) = backend.output_view() else {
            return Err(Error::InvalidState("no output target to present into"));
        };

        let dest = self.destination_rect(out_w as f32, out_h as f32);

        let clear = if cfg!(debug_assertions) {
            wgpu::Color {
                r: 1.0,
                g: 0.0,
                b: 1.0,
                a: 1.0,
            }
        } else {
            wgpu::Color::BLACK
        };

        let mut encoder = backend
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("facet screen present encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("facet screen present pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &out_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if !dest.is_empty() {
                rpass.set_pipeline(&self.pipeline);
                rpass.set_bind_group(0, &self.bind_group, &[]);
                rpass.set_viewport(dest.origin.x, dest.origin.y, dest.size.x, dest.size.y, 0.0, 1.0);
                rpass.draw(0..3, 0..1);
            }
        }

        backend.queue().submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    /// Largest rectangle with this screen's aspect ratio centered in an
    /// `out_w` × `out_h` output.
    pub fn destination_rect(&self, out_w: f32, out_h: f32) -> Rect {
        letterbox_rect(out_w, out_h, self.width as f32, self.height as f32)
    }
}

/// Aspect-preserving fit of `src` into `out`, centered.
///
/// A wider output gets vertical bars (width derived from `out_h × aspect`);
/// a narrower one gets horizontal bars (height from `out_w / aspect`).
fn letterbox_rect(out_w: f32, out_h: f32, src_w: f32, src_h: f32) -> Rect {
    if out_w <= 0.0 || out_h <= 0.0 || src_w <= 0.0 || src_h <= 0.0 {
        return Rect::new(0.0, 0.0, 0.0, 0.0);
    }

    let out_aspect = out_w / out_h;
    let src_aspect = src_w / src_h;

    let mut rx = 0.0;
    let mut ry = 0.0;
    let mut rw = out_w;
    let mut rh = out_h;

    if out_aspect > src_aspect {
        rw = rh * src_aspect;
        rx = (out_w - rw) / 2.0;
    } else if out_aspect < src_aspect {
        rh = rw / src_aspect;
        ry = (out_h - rh) / 2.0;
    }

    Rect::new(rx, ry, rw, rh)
}
