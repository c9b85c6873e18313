//! Recording mock implementation of [`RenderDevice`] for testing.
//!
//! Every call is appended to a log that tests inspect to verify what the
//! renderer actually submitted, including the raw bytes of vertex and
//! uniform uploads. Methods take `&self`, so the log lives behind a
//! `parking_lot::Mutex`.

use parking_lot::Mutex;

use crate::device::{
    DeviceError, DrawCall, PipelineDesc, RenderDevice, SamplerDesc, Topology, VertexLayout,
};
use crate::gpu::{GpuBuffer, GpuRenderPipeline, GpuSampler, GpuShaderModule, GpuTexture};

/// One recorded device operation.
#[derive(Debug, Clone)]
pub enum DeviceCall {
    LoadShaderBlob {
        name: String,
    },
    CreateShaderModule {
        name: String,
    },
    CreateRenderPipeline {
        label: String,
        layout: VertexLayout,
        topology: Topology,
    },
    CreateVertexBuffer {
        label: String,
        size: u64,
    },
    CreateIndexBuffer {
        label: String,
        indices: Vec<u16>,
    },
    CreateUniformBuffer {
        label: String,
        size: u64,
    },
    CreateSampler {
        desc: SamplerDesc,
    },
    CreateTexture {
        label: String,
        width: u32,
        height: u32,
    },
    WriteBufferDiscard {
        buffer_id: usize,
        bytes: Vec<u8>,
    },
    WriteUniforms {
        buffer_id: usize,
        bytes: Vec<u8>,
    },
    BeginFrame {
        clear: wgpu::Color,
    },
    DrawIndexed {
        pipeline_id: usize,
        vertex_buffer_id: usize,
        index_buffer_id: usize,
        index_count: u32,
        texture_id: Option<usize>,
    },
    Present,
}

#[derive(Default)]
struct Ids {
    buffer: usize,
    module: usize,
    pipeline: usize,
    sampler: usize,
    texture: usize,
}

/// Mock device that records operations instead of touching a GPU.
pub struct MockDevice {
    calls: Mutex<Vec<DeviceCall>>,
    ids: Mutex<Ids>,
    output_size: Mutex<(u32, u32)>,
    fail_shader_loads: Mutex<bool>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            ids: Mutex::new(Ids::default()),
            output_size: Mutex::new((1280, 720)),
            fail_shader_loads: Mutex::new(false),
        }
    }

    /// Copy of the full call log, in submission order.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Clear the log (useful between test steps).
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn count_draws(&self) -> usize {
        self.count(|call| matches!(call, DeviceCall::DrawIndexed { .. }))
    }

    pub fn count_presents(&self) -> usize {
        self.count(|call| matches!(call, DeviceCall::Present))
    }

    pub fn count_pipeline_creates(&self) -> usize {
        self.count(|call| matches!(call, DeviceCall::CreateRenderPipeline { .. }))
    }

    pub fn count_vertex_buffer_creates(&self) -> usize {
        self.count(|call| matches!(call, DeviceCall::CreateVertexBuffer { .. }))
    }

    /// All recorded draws, in order.
    pub fn draws(&self) -> Vec<DeviceCall> {
        self.filtered(|call| matches!(call, DeviceCall::DrawIndexed { .. }))
    }

    /// All write-discard uploads as `(buffer_id, bytes)`, in order.
    pub fn vertex_uploads(&self) -> Vec<(usize, Vec<u8>)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                DeviceCall::WriteBufferDiscard { buffer_id, bytes } => {
                    Some((*buffer_id, bytes.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// All uniform uploads, in order.
    pub fn uniform_uploads(&self) -> Vec<Vec<u8>> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                DeviceCall::WriteUniforms { bytes, .. } => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    /// Change the reported output size, as a host resize would.
    pub fn set_output_size(&self, width: u32, height: u32) {
        *self.output_size.lock() = (width, height);
    }

    /// Make subsequent shader blob loads fail, to exercise the
    /// fatal-creation path.
    pub fn fail_shader_loads(&self, fail: bool) {
        *self.fail_shader_loads.lock() = fail;
    }

    fn count(&self, pred: impl Fn(&DeviceCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| pred(call)).count()
    }

    fn filtered(&self, pred: impl Fn(&DeviceCall) -> bool) -> Vec<DeviceCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| pred(call))
            .cloned()
            .collect()
    }

    fn record(&self, call: DeviceCall) {
        self.calls.lock().push(call);
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderDevice for MockDevice {
    async fn load_shader_blob(&self, name: &str) -> Result<Vec<u8>, DeviceError> {
        self.record(DeviceCall::LoadShaderBlob { name: name.into() });
        if *self.fail_shader_loads.lock() {
            return Err(DeviceError::ShaderUnavailable(name.into()));
        }
        Ok(format!("mock:{name}").into_bytes())
    }

    fn create_shader_module(
        &self,
        name: &str,
        _blob: &[u8],
    ) -> Result<GpuShaderModule, DeviceError> {
        self.record(DeviceCall::CreateShaderModule { name: name.into() });
        let mut ids = self.ids.lock();
        let id = ids.module;
        ids.module += 1;
        Ok(GpuShaderModule::mock(id))
    }

    fn create_render_pipeline(
        &self,
        desc: &PipelineDesc<'_>,
    ) -> Result<GpuRenderPipeline, DeviceError> {
        self.record(DeviceCall::CreateRenderPipeline {
            label: desc.label.into(),
            layout: desc.layout,
            topology: desc.topology,
        });
        let mut ids = self.ids.lock();
        let id = ids.pipeline;
        ids.pipeline += 1;
        Ok(GpuRenderPipeline::mock(id))
    }

    fn create_vertex_buffer(&self, label: &str, size: u64) -> Result<GpuBuffer, DeviceError> {
        self.record(DeviceCall::CreateVertexBuffer {
            label: label.into(),
            size,
        });
        let mut ids = self.ids.lock();
        let id = ids.buffer;
        ids.buffer += 1;
        Ok(GpuBuffer::mock(id, size))
    }

    fn create_index_buffer(&self, label: &str, indices: &[u16]) -> Result<GpuBuffer, DeviceError> {
        self.record(DeviceCall::CreateIndexBuffer {
            label: label.into(),
            indices: indices.to_vec(),
        });
        let mut ids = self.ids.lock();
        let id = ids.buffer;
        ids.buffer += 1;
        Ok(GpuBuffer::mock(id, (indices.len() * 2) as u64))
    }

    fn create_uniform_buffer(&self, label: &str, size: u64) -> Result<GpuBuffer, DeviceError> {
        self.record(DeviceCall::CreateUniformBuffer {
            label: label.into(),
            size,
        });
        let mut ids = self.ids.lock();
        let id = ids.buffer;
        ids.buffer += 1;
        Ok(GpuBuffer::mock(id, size))
    }

    fn create_sampler(&self, desc: &SamplerDesc) -> Result<GpuSampler, DeviceError> {
        self.record(DeviceCall::CreateSampler { desc: *desc });
        let mut ids = self.ids.lock();
        let id = ids.sampler;
        ids.sampler += 1;
        Ok(GpuSampler::mock(id))
    }

    fn create_texture(
        &self,
        label: &str,
        width: u32,
        height: u32,
        _rgba: &[u8],
    ) -> Result<GpuTexture, DeviceError> {
        self.record(DeviceCall::CreateTexture {
            label: label.into(),
            width,
            height,
        });
        let mut ids = self.ids.lock();
        let id = ids.texture;
        ids.texture += 1;
        Ok(GpuTexture::mock(id, width, height))
    }

    fn write_buffer_discard(&self, buffer: &GpuBuffer, data: &[u8]) {
        if let Some(buffer_id) = buffer.mock_id() {
            self.record(DeviceCall::WriteBufferDiscard {
                buffer_id,
                bytes: data.to_vec(),
            });
        }
    }

    fn write_uniforms(&self, buffer: &GpuBuffer, data: &[u8]) {
        if let Some(buffer_id) = buffer.mock_id() {
            self.record(DeviceCall::WriteUniforms {
                buffer_id,
                bytes: data.to_vec(),
            });
        }
    }

    fn begin_frame(&self, clear: wgpu::Color) {
        self.record(DeviceCall::BeginFrame { clear });
    }

    fn draw_indexed(&self, call: &DrawCall<'_>) {
        self.record(DeviceCall::DrawIndexed {
            pipeline_id: call.pipeline.mock_id().unwrap_or(usize::MAX),
            vertex_buffer_id: call.vertex_buffer.mock_id().unwrap_or(usize::MAX),
            index_buffer_id: call.index_buffer.mock_id().unwrap_or(usize::MAX),
            index_count: call.index_count,
            texture_id: call.texture.and_then(|texture| texture.mock_id()),
        });
    }

    fn present(&self) {
        self.record(DeviceCall::Present);
    }

    fn output_size(&self) -> (u32, u32) {
        *self.output_size.lock()
    }
}
