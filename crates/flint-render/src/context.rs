//! wgpu instance/adapter/device acquisition.

use std::sync::Arc;

use flint_device::DeviceError;
use tracing::info;

/// Owns the wgpu instance, adapter, device, and queue. Shared by `Arc` with
/// everything that talks to the GPU.
pub struct GraphicsContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl GraphicsContext {
    /// Acquire an adapter and device with default limits.
    pub async fn new_owned() -> Result<Arc<Self>, DeviceError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .map_err(|_| DeviceError::NoAdapter)?;
        info!(adapter = %adapter.get_info().name, "acquired adapter");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("flint device"),
                ..Default::default()
            })
            .await
            .map_err(|err| DeviceError::RequestDevice(err.to_string()))?;

        Ok(Arc::new(Self {
            instance,
            adapter,
            device,
            queue,
        }))
    }

    /// Blocking variant of [`GraphicsContext::new_owned`].
    pub fn new_owned_sync() -> Result<Arc<Self>, DeviceError> {
        pollster::block_on(Self::new_owned())
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}
