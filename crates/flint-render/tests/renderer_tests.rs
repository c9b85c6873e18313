//! End-to-end draw submission tests against the recording mock device.

use flint_device::{DeviceCall, MockDevice};
use flint_render::{
    Color, FlatVertex, MAX_BATCH_VERTICES, MAX_FILL_VERTICES, RenderError, Renderer,
    TexturedVertex, Uniforms,
};
use flint_core::math::translation_2d;
use glam::{Mat4, Vec2, Vec3};

fn ready_renderer() -> Renderer<MockDevice> {
    Renderer::new_blocking(MockDevice::new()).unwrap()
}

fn unit_quad() -> (Vec<Vec2>, Vec<Vec2>) {
    let positions = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    let uvs = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    (positions, uvs)
}

fn last_uniforms(device: &MockDevice) -> Uniforms {
    let uploads = device.uniform_uploads();
    *bytemuck::from_bytes(uploads.last().unwrap())
}

#[test]
fn single_quad_draws_six_indices_with_texture_bound() {
    let mut renderer = ready_renderer();
    let texture = renderer
        .create_texture_rgba("checker", 2, 2, &[255u8; 16])
        .unwrap();
    renderer.device().clear_calls();

    renderer.begin_frame();
    let (positions, uvs) = unit_quad();
    renderer.draw_quads(&positions, &uvs, &texture).unwrap();
    renderer.swap_buffers();

    let device = renderer.device();
    assert_eq!(device.count_draws(), 1);
    assert_eq!(device.count_presents(), 1);

    let draws = device.draws();
    let DeviceCall::DrawIndexed {
        index_count,
        texture_id,
        ..
    } = draws[0]
    else {
        panic!("expected a draw");
    };
    assert_eq!(index_count, 6);
    assert!(texture_id.is_some());

    // The staged vertices interleave position and uv pairs in order.
    let uploads = device.vertex_uploads();
    assert_eq!(uploads.len(), 1);
    let vertices: &[TexturedVertex] = bytemuck::cast_slice(&uploads[0].1);
    assert_eq!(vertices.len(), 4);
    assert_eq!(vertices[0], TexturedVertex::new(positions[0], uvs[0]));
    assert_eq!(vertices[3], TexturedVertex::new(positions[3], uvs[3]));
}

#[test]
fn full_batch_draws_all_quads_in_one_call() {
    let mut renderer = ready_renderer();
    let texture = renderer
        .create_texture_rgba("atlas", 1, 1, &[255u8; 4])
        .unwrap();
    renderer.device().clear_calls();

    let positions = vec![Vec2::ZERO; MAX_BATCH_VERTICES];
    let uvs = vec![Vec2::ZERO; MAX_BATCH_VERTICES];
    renderer.begin_frame();
    renderer.draw_quads(&positions, &uvs, &texture).unwrap();

    let draws = renderer.device().draws();
    assert_eq!(draws.len(), 1);
    let DeviceCall::DrawIndexed { index_count, .. } = draws[0] else {
        panic!("expected a draw");
    };
    assert_eq!(index_count, 6 * (MAX_BATCH_VERTICES as u32 / 4));
}

#[test]
fn empty_quad_batch_is_a_no_op() {
    let mut renderer = ready_renderer();
    let texture = renderer
        .create_texture_rgba("atlas", 1, 1, &[255u8; 4])
        .unwrap();
    renderer.device().clear_calls();

    renderer.begin_frame();
    renderer.draw_quads(&[], &[], &texture).unwrap();
    assert_eq!(renderer.device().count_draws(), 0);
}

#[test]
fn quad_contract_violations_are_rejected() {
    let mut renderer = ready_renderer();
    let texture = renderer
        .create_texture_rgba("atlas", 1, 1, &[255u8; 4])
        .unwrap();
    renderer.begin_frame();
    renderer.device().clear_calls();

    let five = vec![Vec2::ZERO; 5];
    assert!(matches!(
        renderer.draw_quads(&five, &five, &texture),
        Err(RenderError::PartialQuad(5))
    ));

    let oversized = vec![Vec2::ZERO; MAX_BATCH_VERTICES + 4];
    assert!(matches!(
        renderer.draw_quads(&oversized, &oversized, &texture),
        Err(RenderError::BatchTooLarge { .. })
    ));

    let four = vec![Vec2::ZERO; 4];
    let three = vec![Vec2::ZERO; 3];
    assert!(matches!(
        renderer.draw_quads(&four, &three, &texture),
        Err(RenderError::MismatchedArrays {
            positions: 4,
            uvs: 3
        })
    ));

    // Nothing reached the device.
    assert_eq!(renderer.device().count_draws(), 0);
}

#[test]
fn offset_draw_translates_view_for_that_batch_only() {
    let mut renderer = ready_renderer();
    let texture = renderer
        .create_texture_rgba("atlas", 1, 1, &[255u8; 4])
        .unwrap();

    renderer.begin_frame();
    let view = Mat4::from_translation(Vec3::new(3.0, 4.0, 0.0));
    renderer.set_view_matrix(view);

    let (positions, uvs) = unit_quad();
    renderer
        .draw_quads_at(10.0, 20.0, &positions, &uvs, &texture)
        .unwrap();
    let offset_uniforms = last_uniforms(renderer.device());
    assert_eq!(
        offset_uniforms.view,
        (translation_2d(10.0, 20.0) * view).to_cols_array_2d()
    );

    // A following plain draw sees the original view.
    renderer.draw_quads(&positions, &uvs, &texture).unwrap();
    let plain_uniforms = last_uniforms(renderer.device());
    assert_eq!(plain_uniforms.view, view.to_cols_array_2d());
}

#[test]
fn polygon_draws_fill_then_outline() {
    let mut renderer = ready_renderer();
    renderer.begin_frame();
    renderer.device().clear_calls();

    let triangle = [
        Vec2::new(0.0, 0.0),
        Vec2::new(10.0, 0.0),
        Vec2::new(0.0, 10.0),
    ];
    renderer.draw_polygon(&triangle, Color::RED).unwrap();

    let device = renderer.device();
    let draws = device.draws();
    assert_eq!(draws.len(), 2);

    let DeviceCall::DrawIndexed {
        index_count: fill_count,
        texture_id: fill_texture,
        vertex_buffer_id: fill_buffer,
        ..
    } = draws[0]
    else {
        panic!("expected a draw");
    };
    let DeviceCall::DrawIndexed {
        index_count: outline_count,
        vertex_buffer_id: outline_buffer,
        ..
    } = draws[1]
    else {
        panic!("expected a draw");
    };
    assert_eq!(fill_count, 3);
    assert_eq!(outline_count, 6);
    assert!(fill_texture.is_none());
    // The two sub-draws consume distinct ring slots.
    assert_ne!(fill_buffer, outline_buffer);

    // Outline vertices double each edge and wrap back to the start.
    let uploads = device.vertex_uploads();
    assert_eq!(uploads.len(), 2);
    let outline: &[FlatVertex] = bytemuck::cast_slice(&uploads[1].1);
    assert_eq!(outline.len(), 6);
    assert_eq!(outline[4].pos, [0.0, 10.0]);
    assert_eq!(outline[5].pos, [0.0, 0.0]);

    // Both sub-draws share one uniform upload carrying the color.
    let uniforms = device.uniform_uploads();
    assert_eq!(uniforms.len(), 1);
    let block: Uniforms = *bytemuck::from_bytes(&uniforms[0]);
    assert_eq!(block.color, [1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn each_draw_follows_its_own_uniform_write() {
    let mut renderer = ready_renderer();
    renderer.begin_frame();
    renderer.device().clear_calls();

    let triangle = [
        Vec2::new(0.0, 0.0),
        Vec2::new(10.0, 0.0),
        Vec2::new(0.0, 10.0),
    ];
    renderer.draw_polygon(&triangle, Color::RED).unwrap();
    renderer.draw_polygon(&triangle, Color::BLUE).unwrap();

    // Walk the log in submission order: the uniform block in effect at each
    // draw is the one written for it, not the last write of the frame.
    let mut current: Option<Uniforms> = None;
    let mut draw_colors = Vec::new();
    for call in renderer.device().calls() {
        match call {
            DeviceCall::WriteUniforms { bytes, .. } => {
                current = Some(*bytemuck::from_bytes(&bytes));
            }
            DeviceCall::DrawIndexed { .. } => {
                draw_colors.push(current.expect("draw without a uniform write").color);
            }
            _ => {}
        }
    }

    let red = [1.0, 0.0, 0.0, 1.0];
    let blue = [0.0, 0.0, 1.0, 1.0];
    assert_eq!(draw_colors, vec![red, red, blue, blue]);
}

#[test]
fn polygon_size_limits_are_enforced() {
    let mut renderer = ready_renderer();
    renderer.begin_frame();
    renderer.device().clear_calls();

    let two = [Vec2::ZERO, Vec2::ONE];
    assert!(matches!(
        renderer.draw_polygon(&two, Color::WHITE),
        Err(RenderError::InvalidPolygon { got: 2, .. })
    ));

    let oversized = vec![Vec2::ZERO; MAX_FILL_VERTICES + 1];
    assert!(matches!(
        renderer.draw_polygon(&oversized, Color::WHITE),
        Err(RenderError::InvalidPolygon { .. })
    ));

    let largest = vec![Vec2::ZERO; MAX_FILL_VERTICES];
    renderer.draw_polygon(&largest, Color::WHITE).unwrap();
    assert_eq!(renderer.device().count_draws(), 2);
}

#[test]
fn begin_frame_resets_transforms_and_clears_to_black() {
    let mut renderer = ready_renderer();
    let texture = renderer
        .create_texture_rgba("atlas", 1, 1, &[255u8; 4])
        .unwrap();

    renderer.begin_frame();
    renderer.set_view_matrix(Mat4::from_translation(Vec3::new(7.0, 7.0, 0.0)));
    renderer.swap_buffers();

    renderer.device().clear_calls();
    renderer.begin_frame();

    let calls = renderer.device().calls();
    assert!(
        matches!(&calls[0], DeviceCall::BeginFrame { clear } if *clear == wgpu::Color::BLACK)
    );

    // The view set last frame did not survive into this one.
    let (positions, uvs) = unit_quad();
    renderer.draw_quads(&positions, &uvs, &texture).unwrap();
    let uniforms = last_uniforms(renderer.device());
    assert_eq!(uniforms.view, Mat4::IDENTITY.to_cols_array_2d());
    assert_eq!(uniforms.model, Mat4::IDENTITY.to_cols_array_2d());
    assert_eq!(uniforms.projection, Mat4::IDENTITY.to_cols_array_2d());
}

#[test]
fn consecutive_draws_advance_through_the_ring() {
    let mut renderer = ready_renderer();
    let texture = renderer
        .create_texture_rgba("atlas", 1, 1, &[255u8; 4])
        .unwrap();
    renderer.begin_frame();
    renderer.device().clear_calls();

    let (positions, uvs) = unit_quad();
    for _ in 0..3 {
        renderer.draw_quads(&positions, &uvs, &texture).unwrap();
    }

    let uploads = renderer.device().vertex_uploads();
    assert_eq!(uploads.len(), 3);
    assert_ne!(uploads[0].0, uploads[1].0);
    assert_ne!(uploads[1].0, uploads[2].0);
}
