//! Texture loading and validation.

use flint_device::{GpuTexture, RenderDevice};

use crate::renderer::RenderError;

/// An immutable RGBA texture usable by quad draws.
pub struct Texture {
    gpu: GpuTexture,
}

impl Texture {
    /// Upload raw RGBA8 pixels. `pixels` must hold exactly
    /// `4 * width * height` bytes.
    pub fn from_rgba<D: RenderDevice>(
        device: &D,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<Self, RenderError> {
        let expected = 4 * width as usize * height as usize;
        if pixels.len() != expected {
            return Err(RenderError::TexturePixels {
                got: pixels.len(),
                expected,
            });
        }
        let gpu = device.create_texture(label, width, height, pixels)?;
        Ok(Self { gpu })
    }

    /// Decode a PNG from memory and upload it.
    #[cfg(feature = "png")]
    pub fn from_png<D: RenderDevice>(
        device: &D,
        label: &str,
        bytes: &[u8],
    ) -> Result<Self, RenderError> {
        let decoded = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = decoded.dimensions();
        Self::from_rgba(device, label, width, height, decoded.as_raw())
    }

    pub fn width(&self) -> u32 {
        self.gpu.width()
    }

    pub fn height(&self) -> u32 {
        self.gpu.height()
    }

    pub(crate) fn gpu(&self) -> &GpuTexture {
        &self.gpu
    }
}
