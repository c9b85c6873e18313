//! Vertex formats and batch capacity limits.

use bytemuck::{Pod, Zeroable};
use flint_device::VertexLayout;
use glam::Vec2;

/// Hard cap on vertices staged for a single draw call.
pub const MAX_BATCH_VERTICES: usize = 2048;

/// Quads per full batch (4 vertices each).
pub const MAX_QUADS: usize = MAX_BATCH_VERTICES / 4;

/// Largest polygon the fan-triangulation index table can fill.
pub const MAX_FILL_VERTICES: usize = 1024;

/// Number of interchangeable vertex buffers in the ring.
pub const BUFFER_POOL_SIZE: usize = 1024;

/// Byte size of one ring slot: a full batch in the larger vertex format.
/// Quad and polygon draws share the same buffers, only the stride differs.
pub const BATCH_SLOT_BYTES: u64 = (MAX_BATCH_VERTICES * size_of::<TexturedVertex>()) as u64;

/// Interleaved 2D position + texture coordinate, the unit of all quad
/// geometry.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
}

impl TexturedVertex {
    pub const LAYOUT: VertexLayout = VertexLayout::PositionUv;

    pub fn new(pos: Vec2, uv: Vec2) -> Self {
        Self {
            pos: pos.to_array(),
            uv: uv.to_array(),
        }
    }
}

/// 2D position only, the unit of all polygon and line geometry.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FlatVertex {
    pub pos: [f32; 2],
}

impl FlatVertex {
    pub const LAYOUT: VertexLayout = VertexLayout::Position;

    pub fn new(pos: Vec2) -> Self {
        Self {
            pos: pos.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_match_declared_layouts() {
        assert_eq!(
            size_of::<TexturedVertex>() as u64,
            TexturedVertex::LAYOUT.stride()
        );
        assert_eq!(size_of::<FlatVertex>() as u64, FlatVertex::LAYOUT.stride());
    }

    #[test]
    fn capacities_are_consistent() {
        assert_eq!(MAX_QUADS * 4, MAX_BATCH_VERTICES);
        assert!(MAX_FILL_VERTICES * 2 <= MAX_BATCH_VERTICES);
    }
}
