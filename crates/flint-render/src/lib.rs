//! Flint Render
//!
//! An immediate-mode 2D batch renderer. Hosts drive a per-frame loop of
//! [`Renderer::begin_frame`], draw submissions (textured quad batches,
//! filled convex polygons with outlines), and [`Renderer::swap_buffers`];
//! the renderer owns the ring of GPU vertex buffers, the two drawing
//! pipelines, and the device-lost/restored recovery protocol, and talks to
//! the GPU only through the [`flint_device::RenderDevice`] boundary.

pub mod color;
pub mod context;
pub mod geometry;
pub mod pipeline;
pub mod renderer;
pub mod ring;
pub mod texture;
pub mod transform;
pub mod vertex;
pub mod wgpu_device;

pub use color::Color;
pub use context::GraphicsContext;
pub use renderer::{RenderError, Renderer};
pub use ring::BufferRing;
pub use texture::Texture;
pub use transform::{Transforms, Uniforms};
pub use vertex::{
    BUFFER_POOL_SIZE, FlatVertex, MAX_BATCH_VERTICES, MAX_FILL_VERTICES, MAX_QUADS, TexturedVertex,
};
pub use wgpu_device::WgpuDevice;
