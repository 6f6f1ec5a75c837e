//! The handful of rotating, floating wireframe solids.

use std::f32::consts::TAU;

use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::Rng;

use crate::geometry::Shape;

/// Float offsets applied around each body's origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatAmplitude {
    pub x: f32,
    pub y: f32,
}

impl Default for FloatAmplitude {
    fn default() -> Self {
        Self { x: 0.2, y: 0.3 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecorativeBody {
    pub shape: Shape,
    /// Radians added per frame.
    pub velocity: Vec3,
    origin: Vec3,
    pub index: usize,
    pub position: Vec3,
    pub rotation: Vec3,
}

impl DecorativeBody {
    pub fn new(shape: Shape, index: usize, origin: Vec3, rotation: Vec3, velocity: Vec3) -> Self {
        Self {
            shape,
            velocity,
            origin,
            index,
            position: origin,
            rotation,
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn model_matrix(&self) -> Mat4 {
        let rot = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_rotation_translation(rot, self.position)
    }
}

/// One body per shape: random origin in x, y ∈ [-5, 5) and z ∈ [-7.5, -2.5),
/// random initial rotation, and a per-axis spin in [-0.01, 0.01).
pub fn create(shapes: &[Shape], rng: &mut impl Rng) -> Vec<DecorativeBody> {
    shapes
        .iter()
        .enumerate()
        .map(|(index, &shape)| {
            let origin = Vec3::new(
                (rng.gen::<f32>() - 0.5) * 10.0,
                (rng.gen::<f32>() - 0.5) * 10.0,
                (rng.gen::<f32>() - 0.5) * 5.0 - 5.0,
            );
            let rotation = Vec3::new(rng.gen::<f32>() * TAU, rng.gen::<f32>() * TAU, rng.gen::<f32>() * TAU);
            let velocity = Vec3::new(
                (rng.gen::<f32>() - 0.5) * 0.02,
                (rng.gen::<f32>() - 0.5) * 0.02,
                (rng.gen::<f32>() - 0.5) * 0.02,
            );
            DecorativeBody::new(shape, index, origin, rotation, velocity)
        })
        .collect()
}

/// Advance one frame. Rotation integrates by a fixed per-frame increment;
/// position is a function of `time` and the body's index only, so bodies
/// float out of phase with each other.
pub fn step(time: f32, body: &mut DecorativeBody, amplitude: FloatAmplitude) {
    body.rotation += body.velocity;
    let i = body.index as f32;
    body.position.y = body.origin.y + (time + i).sin() * amplitude.y;
    body.position.x = body.origin.x + (time + i * 0.5).cos() * amplitude.x;
    body.position.z = body.origin.z;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn create_assigns_indices_and_ranges() {
        let mut rng = SmallRng::seed_from_u64(3);
        let shapes = [Shape::Icosahedron, Shape::Octahedron, Shape::Tetrahedron, Shape::Dodecahedron];
        let bodies = create(&shapes, &mut rng);
        assert_eq!(bodies.len(), 4);
        for (i, b) in bodies.iter().enumerate() {
            assert_eq!(b.index, i);
            assert_eq!(b.shape, shapes[i]);
            assert_eq!(b.position, b.origin());
            assert!(b.velocity.abs().max_element() <= 0.01);
            assert!((-5.0..5.0).contains(&b.origin().x));
            assert!((-5.0..5.0).contains(&b.origin().y));
            assert!((-7.5..-2.5).contains(&b.origin().z));
            assert!(b.rotation.to_array().iter().all(|a| (0.0..TAU).contains(a)));
        }
    }

    #[test]
    fn rotation_accumulates_per_call() {
        let mut body = DecorativeBody::new(
            Shape::Octahedron,
            0,
            Vec3::ZERO,
            Vec3::ZERO,
            Vec3::new(0.01, -0.005, 0.0),
        );
        for _ in 0..4 {
            step(0.0, &mut body, FloatAmplitude::default());
        }
        assert!((body.rotation - Vec3::new(0.04, -0.02, 0.0)).length() < 1e-6);
    }
}
