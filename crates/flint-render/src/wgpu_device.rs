//! Real [`RenderDevice`] implementation over wgpu, rendering into an
//! offscreen RGBA target.

use std::sync::Arc;

use flint_device::{
    DeviceError, DrawCall, FilterMode, GpuBuffer, GpuRenderPipeline, GpuSampler, GpuShaderModule,
    GpuTexture, PipelineDesc, RenderDevice, SamplerDesc, Topology, VertexLayout,
};
use parking_lot::Mutex;
use tracing::warn;
use wgpu::util::DeviceExt;

use crate::context::GraphicsContext;

const QUAD_SHADER: &str = r#"
struct Uniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    color: vec4<f32>,
}

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(1) @binding(0) var color_texture: texture_2d<f32>;
@group(1) @binding(1) var color_sampler: sampler;

struct VertexInput {
    @location(0) pos: vec2<f32>,
    @location(1) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_pos: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.clip_pos = uniforms.projection * uniforms.view * uniforms.model
        * vec4<f32>(input.pos, 0.0, 1.0);
    output.uv = input.uv;
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(color_texture, color_sampler, input.uv);
}
"#;

const POLYGON_SHADER: &str = r#"
struct Uniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    color: vec4<f32>,
}

@group(0) @binding(0) var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) pos: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_pos: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.clip_pos = uniforms.projection * uniforms.view * uniforms.model
        * vec4<f32>(input.pos, 0.0, 1.0);
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return uniforms.color;
}
"#;

struct OffscreenTarget {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

/// wgpu device drawing into a resizable offscreen color target.
pub struct WgpuDevice {
    context: Arc<GraphicsContext>,
    format: wgpu::TextureFormat,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    target: Mutex<OffscreenTarget>,
    frame: Mutex<Option<wgpu::CommandEncoder>>,
}

impl WgpuDevice {
    pub fn new(context: Arc<GraphicsContext>, width: u32, height: u32) -> Self {
        let format = wgpu::TextureFormat::Rgba8UnormSrgb;

        let uniform_layout =
            context
                .device()
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("uniform layout"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                });

        let texture_layout =
            context
                .device()
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("texture layout"),
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

        let target = Self::create_target(&context, format, width, height);

        Self {
            context,
            format,
            uniform_layout,
            texture_layout,
            target: Mutex::new(target),
            frame: Mutex::new(None),
        }
    }

    /// Recreate the render target at a new size. Takes effect on the next
    /// frame.
    pub fn resize(&self, width: u32, height: u32) {
        *self.target.lock() = Self::create_target(&self.context, self.format, width, height);
    }

    fn create_target(
        context: &GraphicsContext,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> OffscreenTarget {
        let texture = context.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("render target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        OffscreenTarget {
            texture,
            view,
            width,
            height,
        }
    }

    fn map_filter(filter: FilterMode) -> wgpu::FilterMode {
        match filter {
            FilterMode::Linear => wgpu::FilterMode::Linear,
            FilterMode::Point => wgpu::FilterMode::Nearest,
        }
    }
}

impl RenderDevice for WgpuDevice {
    async fn load_shader_blob(&self, name: &str) -> Result<Vec<u8>, DeviceError> {
        match name {
            "quad.wgsl" => Ok(QUAD_SHADER.as_bytes().to_vec()),
            "polygon.wgsl" => Ok(POLYGON_SHADER.as_bytes().to_vec()),
            other => Err(DeviceError::ShaderUnavailable(other.into())),
        }
    }

    fn create_shader_module(&self, name: &str, blob: &[u8]) -> Result<GpuShaderModule, DeviceError> {
        let source = str::from_utf8(blob).map_err(|err| DeviceError::ShaderModule {
            name: name.into(),
            reason: err.to_string(),
        })?;
        let module = self
            .context
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(name),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        Ok(GpuShaderModule::from_wgpu(module))
    }

    fn create_render_pipeline(
        &self,
        desc: &PipelineDesc<'_>,
    ) -> Result<GpuRenderPipeline, DeviceError> {
        let attributes: &[wgpu::VertexAttribute] = match desc.layout {
            VertexLayout::PositionUv => &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 8,
                    shader_location: 1,
                },
            ],
            VertexLayout::Position => &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: 0,
            }],
        };

        let mut layouts = vec![&self.uniform_layout];
        if desc.binds_texture {
            layouts.push(&self.texture_layout);
        }
        let pipeline_layout =
            self.context
                .device()
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(desc.label),
                    bind_group_layouts: &layouts,
                    push_constant_ranges: &[],
                });

        let topology = match desc.topology {
            Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Topology::LineList => wgpu::PrimitiveTopology::LineList,
        };

        // Straight alpha blend on color, destination alpha left as-is.
        let blend = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::Zero,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let pipeline =
            self.context
                .device()
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(desc.label),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: desc.module.as_wgpu(),
                        entry_point: Some("vs_main"),
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                        buffers: &[wgpu::VertexBufferLayout {
                            array_stride: desc.layout.stride(),
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes,
                        }],
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: desc.module.as_wgpu(),
                        entry_point: Some("fs_main"),
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: self.format,
                            blend: Some(blend),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: None,
                        polygon_mode: wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                });
        Ok(GpuRenderPipeline::from_wgpu(pipeline))
    }

    fn create_vertex_buffer(&self, label: &str, size: u64) -> Result<GpuBuffer, DeviceError> {
        let buffer = self.context.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Ok(GpuBuffer::from_wgpu(buffer))
    }

    fn create_index_buffer(&self, label: &str, indices: &[u16]) -> Result<GpuBuffer, DeviceError> {
        let bytes: &[u8] = bytemuck::cast_slice(indices);
        let buffer = self
            .context
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytes,
                usage: wgpu::BufferUsages::INDEX,
            });
        Ok(GpuBuffer::from_wgpu(buffer))
    }

    fn create_uniform_buffer(&self, label: &str, size: u64) -> Result<GpuBuffer, DeviceError> {
        let buffer = self.context.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Ok(GpuBuffer::from_wgpu(buffer))
    }

    fn create_sampler(&self, desc: &SamplerDesc) -> Result<GpuSampler, DeviceError> {
        let sampler = self.context.device().create_sampler(&wgpu::SamplerDescriptor {
            label: Some("batch sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: Self::map_filter(desc.mag_filter),
            min_filter: Self::map_filter(desc.min_filter),
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Ok(GpuSampler::from_wgpu(sampler))
    }

    fn create_texture(
        &self,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<GpuTexture, DeviceError> {
        let expected = 4 * width as usize * height as usize;
        if rgba.len() != expected {
            return Err(DeviceError::Creation {
                what: "texture",
                reason: format!("pixel data is {} bytes, expected {expected}", rgba.len()),
            });
        }
        let texture = self.context.device().create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.context.queue().write_texture(
            texture.as_image_copy(),
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(GpuTexture::from_wgpu(texture, view))
    }

    fn write_buffer_discard(&self, buffer: &GpuBuffer, data: &[u8]) {
        self.context.queue().write_buffer(buffer.as_wgpu(), 0, data);
    }

    fn write_uniforms(&self, buffer: &GpuBuffer, data: &[u8]) {
        self.context.queue().write_buffer(buffer.as_wgpu(), 0, data);
    }

    fn begin_frame(&self, clear: wgpu::Color) {
        let mut encoder =
            self.context
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame encoder"),
                });
        {
            let target = self.target.lock();
            encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        *self.frame.lock() = Some(encoder);
    }

    fn draw_indexed(&self, call: &DrawCall<'_>) {
        let mut frame = self.frame.lock();
        let Some(mut encoder) = frame.take() else {
            warn!("draw submitted outside an active frame");
            return;
        };

        let uniform_group = self
            .context
            .device()
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &self.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: call.uniforms.as_wgpu().as_entire_binding(),
                }],
            });

        let texture_group = match (call.texture, call.sampler) {
            (Some(texture), Some(sampler)) => Some(self.context.device().create_bind_group(
                &wgpu::BindGroupDescriptor {
                    label: Some("texture bind group"),
                    layout: &self.texture_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(texture.as_wgpu_view()),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(sampler.as_wgpu()),
                        },
                    ],
                },
            )),
            _ => None,
        };

        {
            let target = self.target.lock();
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("draw pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(call.pipeline.as_wgpu());
            pass.set_bind_group(0, &uniform_group, &[]);
            if let Some(texture_group) = &texture_group {
                pass.set_bind_group(1, texture_group, &[]);
            }
            pass.set_vertex_buffer(0, call.vertex_buffer.as_wgpu().slice(..));
            pass.set_index_buffer(call.index_buffer.as_wgpu().slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..call.index_count, 0, 0..1);
        }

        // Queued buffer writes execute at the next submit, so each draw is
        // submitted on its own; this keeps the per-draw uniform overwrites
        // and ring-slot rewrites ordered with the draws that read them.
        self.context.queue().submit(Some(encoder.finish()));
        *frame = Some(
            self.context
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame encoder"),
                }),
        );
    }

    fn present(&self) {
        if let Some(encoder) = self.frame.lock().take() {
            self.context.queue().submit(Some(encoder.finish()));
        }
    }

    fn output_size(&self) -> (u32, u32) {
        let target = self.target.lock();
        (target.width, target.height)
    }
}
