//! Device-lost/restored protocol and resource creation tests.

use flint_device::{DeviceCall, DeviceNotify, MockDevice};
use flint_render::{BUFFER_POOL_SIZE, Color, RenderError, Renderer};
use glam::Vec2;

fn quad() -> (Vec<Vec2>, Vec<Vec2>) {
    (vec![Vec2::ZERO; 4], vec![Vec2::ZERO; 4])
}

#[test]
fn creation_builds_the_full_resource_set() {
    let renderer = Renderer::new_blocking(MockDevice::new()).unwrap();
    assert!(renderer.is_ready());
    assert_eq!(renderer.width(), 1280);
    assert_eq!(renderer.height(), 720);

    let device = renderer.device();
    assert_eq!(device.count_vertex_buffer_creates(), BUFFER_POOL_SIZE);
    assert_eq!(device.count_pipeline_creates(), 3);

    let index_buffers = device
        .calls()
        .iter()
        .filter(|call| matches!(call, DeviceCall::CreateIndexBuffer { .. }))
        .count();
    assert_eq!(index_buffers, 3);

    let uniform_buffers = device
        .calls()
        .iter()
        .filter(|call| matches!(call, DeviceCall::CreateUniformBuffer { .. }))
        .count();
    assert_eq!(uniform_buffers, 1);
}

#[test]
fn creation_fails_when_shaders_are_unavailable() {
    let device = MockDevice::new();
    device.fail_shader_loads(true);
    assert!(matches!(
        Renderer::new_blocking(device),
        Err(RenderError::Device(_))
    ));
}

#[test]
fn lost_device_silences_draws_and_present() {
    let mut renderer = Renderer::new_blocking(MockDevice::new()).unwrap();
    let texture = renderer
        .create_texture_rgba("atlas", 1, 1, &[255u8; 4])
        .unwrap();

    renderer.on_device_lost();
    assert!(!renderer.is_ready());
    renderer.device().clear_calls();

    renderer.begin_frame();
    let (positions, uvs) = quad();
    renderer.draw_quads(&positions, &uvs, &texture).unwrap();
    renderer
        .draw_polygon(&[Vec2::ZERO, Vec2::X, Vec2::Y], Color::WHITE)
        .unwrap();
    renderer.swap_buffers();

    // Nothing at all reached the device.
    assert_eq!(renderer.device().call_count(), 0);
}

#[test]
fn contract_violations_still_error_while_not_ready() {
    let mut renderer = Renderer::new_blocking(MockDevice::new()).unwrap();
    renderer.on_device_lost();

    assert!(matches!(
        renderer.draw_polygon(&[Vec2::ZERO], Color::WHITE),
        Err(RenderError::InvalidPolygon { got: 1, .. })
    ));
}

#[test]
fn restore_rebuilds_resources_and_resumes_drawing() {
    let mut renderer = Renderer::new_blocking(MockDevice::new()).unwrap();
    let texture = renderer
        .create_texture_rgba("atlas", 1, 1, &[255u8; 4])
        .unwrap();

    renderer.on_device_lost();
    renderer.device().clear_calls();
    renderer.on_device_restored();
    assert!(renderer.is_ready());
    assert_eq!(
        renderer.device().count_vertex_buffer_creates(),
        BUFFER_POOL_SIZE
    );
    assert_eq!(renderer.device().count_pipeline_creates(), 3);

    renderer.begin_frame();
    let (positions, uvs) = quad();
    renderer.draw_quads(&positions, &uvs, &texture).unwrap();
    renderer.swap_buffers();
    assert_eq!(renderer.device().count_draws(), 1);
    assert_eq!(renderer.device().count_presents(), 1);
}

#[test]
fn failed_restore_leaves_the_renderer_inert() {
    let mut renderer = Renderer::new_blocking(MockDevice::new()).unwrap();
    let texture = renderer
        .create_texture_rgba("atlas", 1, 1, &[255u8; 4])
        .unwrap();

    renderer.on_device_lost();
    renderer.device().fail_shader_loads(true);
    renderer.on_device_restored();
    assert!(!renderer.is_ready());

    renderer.device().clear_calls();
    renderer.begin_frame();
    let (positions, uvs) = quad();
    renderer.draw_quads(&positions, &uvs, &texture).unwrap();
    renderer.swap_buffers();
    assert_eq!(renderer.device().call_count(), 0);

    // A later successful restore recovers.
    renderer.device().fail_shader_loads(false);
    renderer.on_device_restored();
    assert!(renderer.is_ready());
}

#[test]
fn resize_updates_dimensions_without_rebuilding() {
    let mut renderer = Renderer::new_blocking(MockDevice::new()).unwrap();
    let pipelines_before = renderer.device().count_pipeline_creates();

    renderer.device().set_output_size(1920, 1080);
    renderer.surface_resized();

    assert_eq!(renderer.width(), 1920);
    assert_eq!(renderer.height(), 1080);
    assert_eq!(renderer.device().count_pipeline_creates(), pipelines_before);
}
