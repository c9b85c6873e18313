//! The device boundary trait and its descriptor types.
//!
//! [`RenderDevice`] covers exactly what the renderer core consumes from a
//! GPU device: resource creation, write-discard vertex uploads, constant
//! buffer updates, a begin-frame clear, indexed draws, present, and the
//! output-size query. Descriptors are owned by this crate so the trait can
//! be implemented by a recording mock as well as by the wgpu backend.

use thiserror::Error;

use crate::gpu::{GpuBuffer, GpuRenderPipeline, GpuSampler, GpuShaderModule, GpuTexture};

/// Errors from GPU object creation or shader loading.
///
/// All of these are fatal to the resource-creation pass that hit them;
/// there is no retry at this level.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("shader blob {0:?} is unavailable")]
    ShaderUnavailable(String),
    #[error("shader module {name:?} failed to build: {reason}")]
    ShaderModule { name: String, reason: String },
    #[error("failed to create {what}: {reason}")]
    Creation { what: &'static str, reason: String },
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("failed to acquire GPU device: {0}")]
    RequestDevice(String),
}

/// How raw vertex bytes map to shader input attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLayout {
    /// Interleaved 2D position + 2D texture coordinate (two float32x2).
    PositionUv,
    /// 2D position only (one float32x2).
    Position,
}

impl VertexLayout {
    /// Byte stride of one vertex under this layout.
    pub fn stride(self) -> u64 {
        match self {
            VertexLayout::PositionUv => 16,
            VertexLayout::Position => 8,
        }
    }
}

/// Primitive assembly for a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
    LineList,
}

/// Everything needed to build a render pipeline from a shader module.
#[derive(Debug)]
pub struct PipelineDesc<'a> {
    pub label: &'a str,
    pub module: &'a GpuShaderModule,
    pub layout: VertexLayout,
    pub topology: Topology,
    /// Whether the fragment stage samples a bound texture (group 1).
    pub binds_texture: bool,
}

/// Texture filtering for a sampler. Addressing is always clamp-to-edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Linear,
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerDesc {
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
}

/// One indexed draw: pipeline, geometry, shared uniforms, optional texture.
#[derive(Debug)]
pub struct DrawCall<'a> {
    pub pipeline: &'a GpuRenderPipeline,
    pub vertex_buffer: &'a GpuBuffer,
    pub index_buffer: &'a GpuBuffer,
    pub index_count: u32,
    pub uniforms: &'a GpuBuffer,
    pub texture: Option<&'a GpuTexture>,
    pub sampler: Option<&'a GpuSampler>,
}

/// Capability surface consumed from the host graphics device.
///
/// Implementations are free to use interior mutability; all methods take
/// `&self` and the renderer drives them from a single thread.
#[allow(async_fn_in_trait)]
pub trait RenderDevice {
    /// Fetch an opaque shader program blob by name. Completion of this
    /// future, not its issuance, gates downstream shader/pipeline creation.
    async fn load_shader_blob(&self, name: &str) -> Result<Vec<u8>, DeviceError>;

    /// Build a shader module from a previously loaded blob.
    fn create_shader_module(&self, name: &str, blob: &[u8])
    -> Result<GpuShaderModule, DeviceError>;

    /// Build a render pipeline; the input layout is bound here, which is
    /// why pipeline creation depends on the blob and not just the module.
    fn create_render_pipeline(&self, desc: &PipelineDesc<'_>)
    -> Result<GpuRenderPipeline, DeviceError>;

    /// A GPU-writable vertex buffer supporting write-discard uploads.
    fn create_vertex_buffer(&self, label: &str, size: u64) -> Result<GpuBuffer, DeviceError>;

    /// An immutable index buffer initialized with `indices`.
    fn create_index_buffer(&self, label: &str, indices: &[u16]) -> Result<GpuBuffer, DeviceError>;

    /// A constant buffer updated via [`RenderDevice::write_uniforms`].
    fn create_uniform_buffer(&self, label: &str, size: u64) -> Result<GpuBuffer, DeviceError>;

    fn create_sampler(&self, desc: &SamplerDesc) -> Result<GpuSampler, DeviceError>;

    /// A 2D RGBA texture initialized with `rgba` (tightly packed, 4 bytes
    /// per pixel) and a shader-bindable view.
    fn create_texture(
        &self,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<GpuTexture, DeviceError>;

    /// Overwrite a vertex buffer with write-discard semantics: the previous
    /// contents are invalidated so the GPU can keep reading a stale copy of
    /// another slot while this one is rewritten.
    fn write_buffer_discard(&self, buffer: &GpuBuffer, data: &[u8]);

    /// Overwrite a constant buffer in place before the next draw.
    fn write_uniforms(&self, buffer: &GpuBuffer, data: &[u8]);

    /// Reset the viewport to the full output, bind the color target, and
    /// clear it to `clear`.
    fn begin_frame(&self, clear: wgpu::Color);

    /// Issue one indexed draw in submission order.
    fn draw_indexed(&self, call: &DrawCall<'_>);

    /// Present the rendered frame to the display.
    fn present(&self);

    /// Current output surface size in pixels.
    fn output_size(&self) -> (u32, u32);
}

/// Device lost/restored notifications, delivered by the host's device
/// abstraction to whoever owns GPU resources.
pub trait DeviceNotify {
    /// The device context was invalidated; release every GPU-owned object.
    fn on_device_lost(&mut self);

    /// The device context is valid again; recreate GPU objects, then
    /// size-dependent state.
    fn on_device_restored(&mut self);
}
