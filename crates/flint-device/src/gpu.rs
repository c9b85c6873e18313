//! Opaque GPU resource handles that can be real or mock.
//!
//! The renderer core holds these without knowing whether they wrap live
//! wgpu objects or test ids. Real handles are cheap to move and carry no
//! lifetimes; mock handles exist only with the `mock` feature enabled.

/// Declares an opaque handle wrapping a single wgpu object.
///
/// Generated handles expose `from_wgpu`, `as_wgpu` (panics on a mock,
/// which is test-only by construction), and the mock constructors and
/// accessors behind the `mock` feature.
macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident, $inner_name:ident, $real:ty) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            inner: $inner_name,
        }

        #[derive(Debug)]
        enum $inner_name {
            Real($real),
            #[cfg(feature = "mock")]
            Mock { id: usize },
        }

        impl $name {
            pub fn from_wgpu(real: $real) -> Self {
                Self {
                    inner: $inner_name::Real(real),
                }
            }

            #[cfg(feature = "mock")]
            pub fn mock(id: usize) -> Self {
                Self {
                    inner: $inner_name::Mock { id },
                }
            }

            /// Get the underlying wgpu object.
            ///
            /// # Panics
            ///
            /// Panics on a mock handle; mocks never reach a real device.
            pub fn as_wgpu(&self) -> &$real {
                match &self.inner {
                    $inner_name::Real(real) => real,
                    #[cfg(feature = "mock")]
                    $inner_name::Mock { .. } => {
                        panic!(concat!(stringify!($name), ": mock handle has no wgpu object"))
                    }
                }
            }

            #[cfg(feature = "mock")]
            pub fn is_mock(&self) -> bool {
                matches!(self.inner, $inner_name::Mock { .. })
            }

            /// Mock id for test assertions.
            #[cfg(feature = "mock")]
            pub fn mock_id(&self) -> Option<usize> {
                match &self.inner {
                    $inner_name::Mock { id } => Some(*id),
                    _ => None,
                }
            }
        }
    };
}

gpu_handle!(
    /// A compiled shader module.
    GpuShaderModule,
    GpuShaderModuleInner,
    wgpu::ShaderModule
);

gpu_handle!(
    /// A complete render pipeline (program + input layout + fixed state).
    GpuRenderPipeline,
    GpuRenderPipelineInner,
    wgpu::RenderPipeline
);

gpu_handle!(
    /// A texture sampler.
    GpuSampler,
    GpuSamplerInner,
    wgpu::Sampler
);

/// A GPU buffer handle carrying its byte size.
#[derive(Debug)]
pub struct GpuBuffer {
    inner: GpuBufferInner,
    size: u64,
}

#[derive(Debug)]
enum GpuBufferInner {
    Real(wgpu::Buffer),
    #[cfg(feature = "mock")]
    Mock { id: usize },
}

impl GpuBuffer {
    pub fn from_wgpu(buffer: wgpu::Buffer) -> Self {
        let size = buffer.size();
        Self {
            inner: GpuBufferInner::Real(buffer),
            size,
        }
    }

    #[cfg(feature = "mock")]
    pub fn mock(id: usize, size: u64) -> Self {
        Self {
            inner: GpuBufferInner::Mock { id },
            size,
        }
    }

    /// Byte size of the buffer.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Get the underlying wgpu buffer.
    ///
    /// # Panics
    ///
    /// Panics on a mock handle.
    pub fn as_wgpu(&self) -> &wgpu::Buffer {
        match &self.inner {
            GpuBufferInner::Real(buffer) => buffer,
            #[cfg(feature = "mock")]
            GpuBufferInner::Mock { .. } => panic!("GpuBuffer: mock handle has no wgpu object"),
        }
    }

    #[cfg(feature = "mock")]
    pub fn is_mock(&self) -> bool {
        matches!(self.inner, GpuBufferInner::Mock { .. })
    }

    #[cfg(feature = "mock")]
    pub fn mock_id(&self) -> Option<usize> {
        match &self.inner {
            GpuBufferInner::Mock { id } => Some(*id),
            _ => None,
        }
    }
}

/// A 2D texture handle carrying its pixel dimensions.
///
/// The real variant owns both the texture and a shader-bindable view.
#[derive(Debug)]
pub struct GpuTexture {
    inner: GpuTextureInner,
    width: u32,
    height: u32,
}

#[derive(Debug)]
enum GpuTextureInner {
    Real {
        #[allow(dead_code)]
        texture: wgpu::Texture,
        view: wgpu::TextureView,
    },
    #[cfg(feature = "mock")]
    Mock { id: usize },
}

impl GpuTexture {
    pub fn from_wgpu(texture: wgpu::Texture, view: wgpu::TextureView) -> Self {
        let (width, height) = (texture.width(), texture.height());
        Self {
            inner: GpuTextureInner::Real { texture, view },
            width,
            height,
        }
    }

    #[cfg(feature = "mock")]
    pub fn mock(id: usize, width: u32, height: u32) -> Self {
        Self {
            inner: GpuTextureInner::Mock { id },
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the shader-bindable view.
    ///
    /// # Panics
    ///
    /// Panics on a mock handle.
    pub fn as_wgpu_view(&self) -> &wgpu::TextureView {
        match &self.inner {
            GpuTextureInner::Real { view, .. } => view,
            #[cfg(feature = "mock")]
            GpuTextureInner::Mock { .. } => panic!("GpuTexture: mock handle has no wgpu view"),
        }
    }

    #[cfg(feature = "mock")]
    pub fn is_mock(&self) -> bool {
        matches!(self.inner, GpuTextureInner::Mock { .. })
    }

    #[cfg(feature = "mock")]
    pub fn mock_id(&self) -> Option<usize> {
        match &self.inner {
            GpuTextureInner::Mock { id } => Some(*id),
            _ => None,
        }
    }
}
