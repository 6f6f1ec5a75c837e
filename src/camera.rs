//! Pointer-following camera.

use std::cell::Cell;

use glam::{Mat4, Vec2, Vec3};

/// Inputs written by host event handlers and read by the scene.
///
/// Handlers are the only writers; the camera step and the recolor path only
/// read, so a `Cell` per field is enough.
#[derive(Debug, Default)]
pub struct SharedInputs {
    pointer: Cell<Vec2>,
    dark_theme: Cell<bool>,
}

impl SharedInputs {
    pub fn new(dark_theme: bool) -> Self {
        Self {
            pointer: Cell::new(Vec2::ZERO),
            dark_theme: Cell::new(dark_theme),
        }
    }

    /// Store a pointer position given in client coordinates, normalized to
    /// [-1, 1] with +y up.
    pub fn set_pointer_client(&self, client_x: f64, client_y: f64, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let x = (client_x / width) * 2.0 - 1.0;
        let y = -(client_y / height) * 2.0 + 1.0;
        self.pointer.set(Vec2::new(x as f32, y as f32).clamp(Vec2::NEG_ONE, Vec2::ONE));
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer.get()
    }

    pub fn set_dark_theme(&self, dark: bool) {
        self.dark_theme.set(dark);
    }

    pub fn dark_theme(&self) -> bool {
        self.dark_theme.get()
    }
}

#[derive(Debug, Clone)]
pub struct PointerCamera {
    pub position: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pointer_scale: f32,
    smoothing: f32,
}

impl PointerCamera {
    pub fn new(distance: f32, fov_deg: f32, near: f32, far: f32, pointer_scale: f32, smoothing: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, distance),
            fov_y: fov_deg.to_radians(),
            aspect: 1.0,
            near,
            far,
            pointer_scale,
            smoothing,
        }
    }

    pub fn target(&self, pointer: Vec2) -> Vec2 {
        pointer * self.pointer_scale
    }

    /// Move x and y a fixed fraction of the way toward the pointer target.
    pub fn step(&mut self, pointer: Vec2) {
        let target = self.target(pointer);
        self.position.x += (target.x - self.position.x) * self.smoothing;
        self.position.y += (target.y - self.position.y) * self.smoothing;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}
