//! Small 2D matrix helpers for hosts feeding the renderer's matrix setters.

use glam::{Mat4, Vec3};

/// Orthographic projection mapping pixel coordinates (origin top-left,
/// y down) onto clip space.
pub fn pixel_projection(width: f32, height: f32) -> Mat4 {
    Mat4::orthographic_rh(0.0, width, height, 0.0, -1.0, 1.0)
}

/// Translation in the 2D plane.
pub fn translation_2d(x: f32, y: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn pixel_projection_maps_corners_to_clip_space() {
        let proj = pixel_projection(800.0, 600.0);

        let top_left = proj * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(top_left.x, -1.0);
        assert_eq!(top_left.y, 1.0);

        let bottom_right = proj * Vec4::new(800.0, 600.0, 0.0, 1.0);
        assert_eq!(bottom_right.x, 1.0);
        assert_eq!(bottom_right.y, -1.0);
    }

    #[test]
    fn translation_2d_offsets_points() {
        let m = translation_2d(3.0, -2.0);
        let p = m * Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert_eq!(p.x, 4.0);
        assert_eq!(p.y, -1.0);
        assert_eq!(p.z, 0.0);
    }
}
