use glam::{Vec3, Vec4};

use portfolio_scene::camera::PointerCamera;
use portfolio_scene::viewport::ViewportState;

fn camera_for(width: f64, height: f64) -> PointerCamera {
    let mut cam = PointerCamera::new(5.0, 75.0, 0.1, 1000.0, 0.5, 0.05);
    cam.aspect = ViewportState::from_box(width, height, 1.0, 2.0).aspect;
    cam
}

fn to_ndc(cam: &PointerCamera, p: Vec3) -> (f32, f32) {
    let clip = cam.view_projection() * Vec4::new(p.x, p.y, p.z, 1.0);
    (clip.x / clip.w, clip.y / clip.w)
}

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn vertical_extent_is_aspect_independent() {
    // Perspective keeps the vertical field of view; only x stretches.
    let wide = camera_for(1920.0, 1080.0);
    let tall = camera_for(1080.0, 1920.0);

    let samples = [
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.5, -0.7, -2.0),
        Vec3::new(-1.2, 0.3, 1.0),
    ];

    for &p in &samples {
        let (wx, wy) = to_ndc(&wide, p);
        let (tx, ty) = to_ndc(&tall, p);
        assert!(approx_eq(wy, ty), "wy={wy} ty={ty}");
        let ratio = (1920.0_f32 / 1080.0) / (1080.0 / 1920.0);
        if p.x != 0.0 {
            assert!((tx / wx - ratio).abs() < 1e-4, "wx={wx} tx={tx}");
        }
    }
}

#[test]
fn origin_projects_to_center() {
    let mut cam = camera_for(1280.0, 720.0);
    cam.position = Vec3::new(0.4, -0.3, 5.0);
    let (x, y) = to_ndc(&cam, Vec3::ZERO);
    assert!(approx_eq(x, 0.0) && approx_eq(y, 0.0), "({x}, {y})");
}
