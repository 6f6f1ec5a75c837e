//! Ambient point cloud behind the hero text.

use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::Rng;

use crate::config::Rgb;

const SPIN_X: f32 = 0.0002;
const SPIN_Y: f32 = 0.0005;

/// Fixed-size point cloud. Lengths never change after [`ParticleField::create`].
#[derive(Debug, Clone)]
pub struct ParticleField {
    positions: Vec<[f32; 3]>,
    colors: Vec<Rgb>,
    palette: (Rgb, Rgb),
    rotation: Vec3,
    colors_dirty: bool,
}

impl ParticleField {
    /// Scatter `count` points uniformly in `[-half_extent, half_extent)` on each
    /// axis. Colors start in the light palette entry.
    pub fn create(
        count: usize,
        half_extent: f32,
        dark: Rgb,
        light: Rgb,
        rng: &mut impl Rng,
    ) -> Self {
        let positions = (0..count)
            .map(|_| {
                [
                    (rng.gen::<f32>() - 0.5) * 2.0 * half_extent,
                    (rng.gen::<f32>() - 0.5) * 2.0 * half_extent,
                    (rng.gen::<f32>() - 0.5) * 2.0 * half_extent,
                ]
            })
            .collect();
        Self {
            positions,
            colors: vec![light; count],
            palette: (dark, light),
            rotation: Vec3::ZERO,
            colors_dirty: true,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Same XYZ Euler order as the decorative bodies.
    pub fn model_matrix(&self) -> Mat4 {
        let r = self.rotation;
        Mat4::from_quat(Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z))
    }

    pub fn recolor(&mut self, is_dark: bool) {
        let color = if is_dark { self.palette.0 } else { self.palette.1 };
        self.colors.fill(color);
        self.colors_dirty = true;
    }

    /// Fixed per-tick spin; speed scales with frame rate.
    pub fn step_rotation(&mut self) {
        self.rotation.x += SPIN_X;
        self.rotation.y += SPIN_Y;
    }

    /// Returns the color buffer once after each recolor so it can be re-uploaded.
    pub fn take_dirty_colors(&mut self) -> Option<&[Rgb]> {
        if std::mem::take(&mut self.colors_dirty) {
            Some(&self.colors)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn positions_stay_inside_cube() {
        let mut rng = SmallRng::seed_from_u64(7);
        let field = ParticleField::create(500, 10.0, [1.0; 3], [0.0; 3], &mut rng);
        assert_eq!(field.len(), 500);
        assert!(field
            .positions()
            .iter()
            .flatten()
            .all(|c| (-10.0..10.0).contains(c)));
    }

    #[test]
    fn dirty_flag_is_consumed_once() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut field = ParticleField::create(3, 1.0, [1.0; 3], [0.0; 3], &mut rng);
        assert!(field.take_dirty_colors().is_some());
        assert!(field.take_dirty_colors().is_none());
        field.recolor(true);
        assert_eq!(field.take_dirty_colors().map(<[_]>::len), Some(3));
        assert!(field.take_dirty_colors().is_none());
    }

    #[test]
    fn spin_rates_differ_per_axis() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut field = ParticleField::create(1, 1.0, [1.0; 3], [0.0; 3], &mut rng);
        for _ in 0..10 {
            field.step_rotation();
        }
        assert!((field.rotation().x - 0.002).abs() < 1e-6);
        assert!((field.rotation().y - 0.005).abs() < 1e-6);
        assert_eq!(field.rotation().z, 0.0);
    }

    #[test]
    fn model_matrix_uses_xyz_euler_order() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut field = ParticleField::create(1, 1.0, [1.0; 3], [0.0; 3], &mut rng);
        for _ in 0..2000 {
            field.step_rotation();
        }
        let r = field.rotation();
        let expected = Mat4::from_rotation_x(r.x) * Mat4::from_rotation_y(r.y);
        let p = Vec3::new(1.0, 2.0, -3.0);
        let got = field.model_matrix().transform_point3(p);
        assert!((got - expected.transform_point3(p)).length() < 1e-5, "{got:?}");
    }
}
