//! The two drawing pipelines and their fixed GPU objects.

use flint_device::{
    DeviceError, FilterMode, GpuBuffer, GpuRenderPipeline, GpuSampler, PipelineDesc, RenderDevice,
    SamplerDesc, Topology,
};

use crate::geometry::{fan_index_table, line_index_table, quad_index_table};
use crate::vertex::{FlatVertex, TexturedVertex};

/// Shader blob name for the textured quad pipeline.
pub const QUAD_SHADER_BLOB: &str = "quad.wgsl";
/// Shader blob name for the flat-color polygon pipelines.
pub const POLYGON_SHADER_BLOB: &str = "polygon.wgsl";

/// Textured quad pipeline with its shared index buffer and sampler.
pub struct QuadPipeline {
    pub pipeline: GpuRenderPipeline,
    pub indices: GpuBuffer,
    pub sampler: GpuSampler,
}

impl QuadPipeline {
    pub(crate) async fn new<D: RenderDevice>(device: &D) -> Result<Self, DeviceError> {
        let blob = device.load_shader_blob(QUAD_SHADER_BLOB).await?;
        let module = device.create_shader_module(QUAD_SHADER_BLOB, &blob)?;
        let pipeline = device.create_render_pipeline(&PipelineDesc {
            label: "quad pipeline",
            module: &module,
            layout: TexturedVertex::LAYOUT,
            topology: Topology::TriangleList,
            binds_texture: true,
        })?;
        let indices = device.create_index_buffer("quad indices", &quad_index_table())?;
        // Linear minification, point magnification, clamped addressing.
        let sampler = device.create_sampler(&SamplerDesc {
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Point,
        })?;
        Ok(Self {
            pipeline,
            indices,
            sampler,
        })
    }
}

/// Flat-color polygon pipelines: fan-triangulated fill plus a line-list
/// outline, sharing one shader module.
pub struct PolygonPipeline {
    pub fill: GpuRenderPipeline,
    pub outline: GpuRenderPipeline,
    pub fill_indices: GpuBuffer,
    pub line_indices: GpuBuffer,
}

impl PolygonPipeline {
    pub(crate) async fn new<D: RenderDevice>(device: &D) -> Result<Self, DeviceError> {
        let blob = device.load_shader_blob(POLYGON_SHADER_BLOB).await?;
        let module = device.create_shader_module(POLYGON_SHADER_BLOB, &blob)?;
        let fill = device.create_render_pipeline(&PipelineDesc {
            label: "polygon fill pipeline",
            module: &module,
            layout: FlatVertex::LAYOUT,
            topology: Topology::TriangleList,
            binds_texture: false,
        })?;
        let outline = device.create_render_pipeline(&PipelineDesc {
            label: "polygon outline pipeline",
            module: &module,
            layout: FlatVertex::LAYOUT,
            topology: Topology::LineList,
            binds_texture: false,
        })?;
        let fill_indices = device.create_index_buffer("polygon fill indices", &fan_index_table())?;
        let line_indices =
            device.create_index_buffer("polygon outline indices", &line_index_table())?;
        Ok(Self {
            fill,
            outline,
            fill_indices,
            line_indices,
        })
    }
}
