//! Flint Device
//!
//! The boundary between the flint renderer core and a GPU device. The core
//! only ever talks to [`RenderDevice`]; the real implementation lives with
//! the wgpu glue in `flint-render`, and [`MockDevice`] (feature `mock`)
//! records every call so renderer behavior can be asserted without a GPU.

pub mod device;
pub mod gpu;
#[cfg(feature = "mock")]
pub mod mock;

pub use device::{
    DeviceError, DeviceNotify, DrawCall, FilterMode, PipelineDesc, RenderDevice, SamplerDesc,
    Topology, VertexLayout,
};
pub use gpu::{GpuBuffer, GpuRenderPipeline, GpuSampler, GpuShaderModule, GpuTexture};
#[cfg(feature = "mock")]
pub use mock::{DeviceCall, MockDevice};
