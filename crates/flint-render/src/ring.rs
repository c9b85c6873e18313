//! Round-robin pool of dynamic vertex buffers.
//!
//! Every draw writes its vertices into the slot under the cursor with
//! discard semantics, submits, then advances the cursor. With a large
//! enough pool the GPU is never still reading a slot when the CPU comes
//! back around to overwrite it.

use flint_device::{DeviceError, GpuBuffer, RenderDevice};

pub struct BufferRing {
    buffers: Vec<GpuBuffer>,
    cursor: usize,
}

impl BufferRing {
    /// Allocate `pool_size` vertex buffers of `slot_bytes` each.
    pub fn new<D: RenderDevice>(
        device: &D,
        pool_size: usize,
        slot_bytes: u64,
    ) -> Result<Self, DeviceError> {
        let mut buffers = Vec::with_capacity(pool_size);
        for i in 0..pool_size {
            buffers.push(device.create_vertex_buffer(&format!("batch vertices {i}"), slot_bytes)?);
        }
        Ok(Self { buffers, cursor: 0 })
    }

    /// Upload `bytes` into the current slot and return it for drawing.
    /// Call [`BufferRing::advance`] once the draw referencing it has been
    /// submitted.
    pub fn write<D: RenderDevice>(&self, device: &D, bytes: &[u8]) -> &GpuBuffer {
        let buffer = &self.buffers[self.cursor];
        device.write_buffer_discard(buffer, bytes);
        buffer
    }

    /// Move the cursor to the next slot, wrapping at the pool size.
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.buffers.len();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flint_device::{DeviceCall, MockDevice};

    #[test]
    fn cursor_wraps_modulo_pool_size() {
        let device = MockDevice::new();
        let mut ring = BufferRing::new(&device, 4, 64).unwrap();

        for k in 0..10 {
            assert_eq!(ring.cursor(), k % 4);
            ring.advance();
        }
        assert_eq!(ring.cursor(), 10 % 4);
    }

    #[test]
    fn consecutive_writes_land_in_distinct_slots() {
        let device = MockDevice::new();
        let mut ring = BufferRing::new(&device, 3, 64).unwrap();
        device.clear_calls();

        for byte in 0..3u8 {
            ring.write(&device, &[byte]);
            ring.advance();
        }

        let uploads = device.vertex_uploads();
        assert_eq!(uploads.len(), 3);
        assert_ne!(uploads[0].0, uploads[1].0);
        assert_ne!(uploads[1].0, uploads[2].0);
        assert_ne!(uploads[0].0, uploads[2].0);
    }

    #[test]
    fn allocates_full_pool_up_front() {
        let device = MockDevice::new();
        let ring = BufferRing::new(&device, 8, 128).unwrap();

        assert_eq!(ring.len(), 8);
        let creates = device
            .calls()
            .iter()
            .filter(|call| matches!(call, DeviceCall::CreateVertexBuffer { size: 128, .. }))
            .count();
        assert_eq!(creates, 8);
    }
}
