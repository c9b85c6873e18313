//! World/view/projection transform state and the shared uniform block.

use bytemuck::{Pod, Zeroable};
use flint_core::math::translation_2d;
use glam::Mat4;

use crate::color::Color;

/// Contents of the shared uniform buffer, matching the shader-side struct
/// field for field. Matrices are column-major, as `glam` stores them and
/// WGSL expects them.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// CPU-side transform state, snapshotted into [`Uniforms`] at each draw.
///
/// All three matrices reset to identity at the start of every frame, so
/// hosts that want a persistent camera re-apply it after
/// [`crate::Renderer::begin_frame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Transforms {
    pub fn new() -> Self {
        Self {
            world: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }

    /// Reset all three matrices to identity.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn set_world(&mut self, world: Mat4) {
        self.world = world;
    }

    pub fn set_view(&mut self, view: Mat4) {
        self.view = view;
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    /// Snapshot the current state into a uniform block.
    pub fn uniforms(&self, color: Color) -> Uniforms {
        Uniforms {
            model: self.world.to_cols_array_2d(),
            view: self.view.to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
            color: color.to_array(),
        }
    }

    /// Snapshot with a pixel offset composed onto the view matrix for this
    /// draw only. The stored view is left untouched.
    pub fn uniforms_translated(&self, x: f32, y: f32, color: Color) -> Uniforms {
        Uniforms {
            model: self.world.to_cols_array_2d(),
            view: (translation_2d(x, y) * self.view).to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
            color: color.to_array(),
        }
    }
}

impl Default for Transforms {
    fn default() -> Self {
        Self::new()
    }
}
