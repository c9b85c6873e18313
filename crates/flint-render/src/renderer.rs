//! Frame lifecycle, draw submission, and device-loss recovery.

use flint_device::{DeviceError, DeviceNotify, DrawCall, GpuBuffer, RenderDevice};
use glam::{Mat4, Vec2};
use tracing::{debug, error, trace};

use crate::color::Color;
use crate::pipeline::{PolygonPipeline, QuadPipeline};
use crate::ring::BufferRing;
use crate::texture::Texture;
use crate::transform::{Transforms, Uniforms};
use crate::vertex::{
    BATCH_SLOT_BYTES, BUFFER_POOL_SIZE, FlatVertex, MAX_BATCH_VERTICES, MAX_FILL_VERTICES,
    TexturedVertex,
};

/// Errors surfaced to draw callers.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error("quad batch has {positions} positions but {uvs} texture coordinates")]
    MismatchedArrays { positions: usize, uvs: usize },
    #[error("quad batch vertex count {0} is not a multiple of 4")]
    PartialQuad(usize),
    #[error("batch of {got} vertices exceeds the limit of {max}")]
    BatchTooLarge { got: usize, max: usize },
    #[error("polygon with {got} vertices is outside the supported range 3..={max}")]
    InvalidPolygon { got: usize, max: usize },
    #[cfg(feature = "png")]
    #[error("failed to decode texture image")]
    TextureDecode(#[from] image::ImageError),
    #[error("texture pixel data is {got} bytes, expected {expected}")]
    TexturePixels { got: usize, expected: usize },
}

/// Everything that lives and dies with the GPU device. Dropped wholesale on
/// device loss and rebuilt on restore.
struct GpuResources {
    quad: QuadPipeline,
    polygon: PolygonPipeline,
    ring: BufferRing,
    uniforms: GpuBuffer,
}

/// Immediate-mode 2D renderer.
///
/// Hosts call [`Renderer::begin_frame`], submit draws, and finish with
/// [`Renderer::swap_buffers`]. Until async resource creation completes (and
/// after a device loss) the renderer is not ready, and draw and present
/// calls return without touching the device.
pub struct Renderer<D: RenderDevice> {
    device: D,
    transforms: Transforms,
    resources: Option<GpuResources>,
    staging: Vec<TexturedVertex>,
    flat_staging: Vec<FlatVertex>,
    width: u32,
    height: u32,
}

impl<D: RenderDevice> Renderer<D> {
    /// Create a renderer and build its device resources. Fails if any GPU
    /// object cannot be created.
    pub async fn new(device: D) -> Result<Self, RenderError> {
        let (width, height) = device.output_size();
        let mut renderer = Self {
            device,
            transforms: Transforms::new(),
            resources: None,
            staging: Vec::with_capacity(MAX_BATCH_VERTICES),
            flat_staging: Vec::with_capacity(2 * MAX_FILL_VERTICES),
            width,
            height,
        };
        renderer.create_device_resources().await?;
        Ok(renderer)
    }

    /// Blocking variant of [`Renderer::new`] for hosts without an executor.
    pub fn new_blocking(device: D) -> Result<Self, RenderError> {
        pollster::block_on(Self::new(device))
    }

    /// Whether device resources are installed and draws will reach the GPU.
    pub fn is_ready(&self) -> bool {
        self.resources.is_some()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Start a frame: reset all transform matrices to identity and, when
    /// ready, clear the render target to black. The matrix reset happens
    /// unconditionally so transform state never leaks across frames.
    pub fn begin_frame(&mut self) {
        self.transforms.reset();
        if self.resources.is_some() {
            self.device.begin_frame(Color::BLACK.to_wgpu());
        }
    }

    /// Finish the frame and present it. A no-op while not ready.
    pub fn swap_buffers(&mut self) {
        if self.resources.is_some() {
            self.device.present();
        }
    }

    /// Re-read the output size from the device after a host resize.
    pub fn surface_resized(&mut self) {
        let (width, height) = self.device.output_size();
        self.width = width;
        self.height = height;
    }

    pub fn set_world_matrix(&mut self, world: Mat4) {
        self.transforms.set_world(world);
    }

    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.transforms.set_view(view);
    }

    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.transforms.set_projection(projection);
    }

    /// Draw a batch of textured quads. `positions` and `uvs` run in
    /// parallel, four consecutive entries per quad, at most
    /// [`MAX_BATCH_VERTICES`] in total.
    pub fn draw_quads(
        &mut self,
        positions: &[Vec2],
        uvs: &[Vec2],
        texture: &Texture,
    ) -> Result<(), RenderError> {
        self.draw_quads_inner(positions, uvs, texture, None)
    }

    /// Like [`Renderer::draw_quads`], with a pixel offset applied through
    /// the view matrix for this batch only.
    pub fn draw_quads_at(
        &mut self,
        x: f32,
        y: f32,
        positions: &[Vec2],
        uvs: &[Vec2],
        texture: &Texture,
    ) -> Result<(), RenderError> {
        self.draw_quads_inner(positions, uvs, texture, Some((x, y)))
    }

    fn draw_quads_inner(
        &mut self,
        positions: &[Vec2],
        uvs: &[Vec2],
        texture: &Texture,
        offset: Option<(f32, f32)>,
    ) -> Result<(), RenderError> {
        if positions.len() != uvs.len() {
            return Err(RenderError::MismatchedArrays {
                positions: positions.len(),
                uvs: uvs.len(),
            });
        }
        if positions.is_empty() {
            return Ok(());
        }
        if positions.len() % 4 != 0 {
            return Err(RenderError::PartialQuad(positions.len()));
        }
        if positions.len() > MAX_BATCH_VERTICES {
            return Err(RenderError::BatchTooLarge {
                got: positions.len(),
                max: MAX_BATCH_VERTICES,
            });
        }

        self.staging.clear();
        for (&pos, &uv) in positions.iter().zip(uvs) {
            self.staging.push(TexturedVertex::new(pos, uv));
        }

        let uniforms = match offset {
            Some((x, y)) => self.transforms.uniforms_translated(x, y, Color::WHITE),
            None => self.transforms.uniforms(Color::WHITE),
        };

        let Some(res) = self.resources.as_mut() else {
            return Ok(());
        };
        trace!(quads = positions.len() / 4, "submitting quad batch");

        self.device
            .write_uniforms(&res.uniforms, bytemuck::bytes_of(&uniforms));
        let vertex_buffer = res.ring.write(&self.device, bytemuck::cast_slice(&self.staging));
        self.device.draw_indexed(&DrawCall {
            pipeline: &res.quad.pipeline,
            vertex_buffer,
            index_buffer: &res.quad.indices,
            index_count: 6 * (positions.len() as u32 / 4),
            uniforms: &res.uniforms,
            texture: Some(texture.gpu()),
            sampler: Some(&res.quad.sampler),
        });
        res.ring.advance();
        Ok(())
    }

    /// Draw a filled convex polygon with an outline in the given color.
    /// Accepts 3 to [`MAX_FILL_VERTICES`] vertices in fan order.
    pub fn draw_polygon(&mut self, vertices: &[Vec2], color: Color) -> Result<(), RenderError> {
        if vertices.len() < 3 || vertices.len() > MAX_FILL_VERTICES {
            return Err(RenderError::InvalidPolygon {
                got: vertices.len(),
                max: MAX_FILL_VERTICES,
            });
        }

        let uniforms = self.transforms.uniforms(color);

        let Some(res) = self.resources.as_mut() else {
            return Ok(());
        };
        trace!(vertices = vertices.len(), "submitting polygon");

        self.device
            .write_uniforms(&res.uniforms, bytemuck::bytes_of(&uniforms));

        // Fill: fan triangulation over the vertices as given.
        self.flat_staging.clear();
        self.flat_staging
            .extend(vertices.iter().map(|&v| FlatVertex::new(v)));
        let vertex_buffer = res
            .ring
            .write(&self.device, bytemuck::cast_slice(&self.flat_staging));
        self.device.draw_indexed(&DrawCall {
            pipeline: &res.polygon.fill,
            vertex_buffer,
            index_buffer: &res.polygon.fill_indices,
            index_count: 3 * (vertices.len() as u32 - 2),
            uniforms: &res.uniforms,
            texture: None,
            sampler: None,
        });
        res.ring.advance();

        // Outline: doubled edge endpoints as a line list.
        crate::geometry::outline_vertices_into(vertices, &mut self.flat_staging);
        let vertex_buffer = res
            .ring
            .write(&self.device, bytemuck::cast_slice(&self.flat_staging));
        self.device.draw_indexed(&DrawCall {
            pipeline: &res.polygon.outline,
            vertex_buffer,
            index_buffer: &res.polygon.line_indices,
            index_count: 2 * vertices.len() as u32,
            uniforms: &res.uniforms,
            texture: None,
            sampler: None,
        });
        res.ring.advance();
        Ok(())
    }

    /// Upload raw RGBA8 pixels as a texture.
    pub fn create_texture_rgba(
        &self,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<Texture, RenderError> {
        Texture::from_rgba(&self.device, label, width, height, pixels)
    }

    /// Decode a PNG from memory and upload it as a texture.
    #[cfg(feature = "png")]
    pub fn create_texture(&self, label: &str, bytes: &[u8]) -> Result<Texture, RenderError> {
        Texture::from_png(&self.device, label, bytes)
    }

    /// Build every device-dependent object and install them atomically:
    /// either all of them land or none do.
    async fn create_device_resources(&mut self) -> Result<(), DeviceError> {
        let quad = QuadPipeline::new(&self.device).await?;
        let polygon = PolygonPipeline::new(&self.device).await?;
        let ring = BufferRing::new(&self.device, BUFFER_POOL_SIZE, BATCH_SLOT_BYTES)?;
        let uniforms = self
            .device
            .create_uniform_buffer("shared uniforms", size_of::<Uniforms>() as u64)?;
        self.resources = Some(GpuResources {
            quad,
            polygon,
            ring,
            uniforms,
        });
        self.surface_resized();
        debug!(
            pool = BUFFER_POOL_SIZE,
            width = self.width,
            height = self.height,
            "device resources ready"
        );
        Ok(())
    }

    /// Drop every device-dependent object. The renderer stays usable but
    /// inert until resources are rebuilt.
    fn release_device_resources(&mut self) {
        self.resources = None;
    }
}

impl<D: RenderDevice> DeviceNotify for Renderer<D> {
    fn on_device_lost(&mut self) {
        debug!("device lost, releasing resources");
        self.release_device_resources();
    }

    fn on_device_restored(&mut self) {
        if let Err(err) = pollster::block_on(self.create_device_resources()) {
            // Stay not-ready; draws keep no-opping until the next restore.
            error!(error = %err, "failed to rebuild device resources");
        }
    }
}
