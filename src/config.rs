//! Tunables for the hero scene.
//!
//! Defaults reproduce the shipped look. The page may override any subset by
//! putting JSON in the canvas' `data-scene-config` attribute.

use serde::Deserialize;

use crate::error::{Result, SceneError};
use crate::geometry::Shape;

pub type Rgb = [f32; 3];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    pub particle_count: usize,
    /// Particles are scattered in a cube of this half width around the origin.
    pub particle_half_extent: f32,
    pub particle_size: f32,
    pub particle_color_dark: Rgb,
    pub particle_color_light: Rgb,

    pub bodies: Vec<Shape>,
    pub body_color_dark: Rgb,
    pub body_color_light: Rgb,
    pub float_amplitude_y: f32,
    pub float_amplitude_x: f32,

    pub camera_fov_deg: f32,
    pub camera_near: f32,
    pub camera_far: f32,
    pub camera_distance: f32,
    pub pointer_scale: f32,
    pub smoothing: f32,

    pub max_pixel_ratio: f64,
    pub resize_debounce_ms: f64,
    pub scroll_throttle_ms: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particle_count: 1000,
            particle_half_extent: 10.0,
            particle_size: 0.05,
            particle_color_dark: [0.392, 1.0, 0.855],
            particle_color_light: [0.145, 0.388, 0.922],

            bodies: vec![
                Shape::Icosahedron,
                Shape::Octahedron,
                Shape::Tetrahedron,
                Shape::Dodecahedron,
            ],
            body_color_dark: [0.392, 1.0, 0.855],
            body_color_light: [0.145, 0.388, 0.922],
            float_amplitude_y: 0.3,
            float_amplitude_x: 0.2,

            camera_fov_deg: 75.0,
            camera_near: 0.1,
            camera_far: 1000.0,
            camera_distance: 5.0,
            pointer_scale: 0.5,
            smoothing: 0.05,

            max_pixel_ratio: 2.0,
            resize_debounce_ms: 200.0,
            scroll_throttle_ms: 100.0,
        }
    }
}

impl SceneConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: SceneConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            return Err(SceneError::Config("particle_count must be at least 1".into()));
        }
        if !(self.smoothing > 0.0 && self.smoothing < 1.0) {
            return Err(SceneError::Config(format!(
                "smoothing must lie in (0, 1), got {}",
                self.smoothing
            )));
        }
        if self.max_pixel_ratio <= 0.0 {
            return Err(SceneError::Config("max_pixel_ratio must be positive".into()));
        }
        if self.particle_half_extent <= 0.0 {
            return Err(SceneError::Config("particle_half_extent must be positive".into()));
        }
        if !(self.camera_fov_deg > 0.0 && self.camera_fov_deg < 180.0) {
            return Err(SceneError::Config(format!(
                "camera_fov_deg must lie in (0, 180), got {}",
                self.camera_fov_deg
            )));
        }
        if !(self.camera_near > 0.0 && self.camera_near < self.camera_far) {
            return Err(SceneError::Config(format!(
                "camera planes need 0 < near < far, got near {} far {}",
                self.camera_near, self.camera_far
            )));
        }
        if !(self.resize_debounce_ms >= 0.0 && self.scroll_throttle_ms >= 0.0) {
            return Err(SceneError::Config("debounce and throttle delays must not be negative".into()));
        }
        Ok(())
    }

    pub fn particle_color(&self, is_dark: bool) -> Rgb {
        if is_dark {
            self.particle_color_dark
        } else {
            self.particle_color_light
        }
    }

    pub fn body_color(&self, is_dark: bool) -> Rgb {
        if is_dark {
            self.body_color_dark
        } else {
            self.body_color_light
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = SceneConfig::from_json(r#"{ "particle_count": 250 }"#).unwrap();
        assert_eq!(cfg.particle_count, 250);
        assert_eq!(cfg.smoothing, 0.05);
        assert_eq!(cfg.bodies.len(), 4);
    }

    #[test]
    fn shapes_parse_lowercase() {
        let cfg = SceneConfig::from_json(r#"{ "bodies": ["tetrahedron", "dodecahedron"] }"#).unwrap();
        assert_eq!(cfg.bodies, vec![Shape::Tetrahedron, Shape::Dodecahedron]);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            SceneConfig::from_json(r#"{ "smoothing": 1.5 }"#),
            Err(SceneError::Config(_))
        ));
        assert!(matches!(
            SceneConfig::from_json(r#"{ "particle_count": 0 }"#),
            Err(SceneError::Config(_))
        ));
        for raw in [
            r#"{ "camera_near": 0.0 }"#,
            r#"{ "camera_near": 10.0, "camera_far": 10.0 }"#,
            r#"{ "camera_fov_deg": 180.0 }"#,
            r#"{ "camera_fov_deg": -5.0 }"#,
            r#"{ "resize_debounce_ms": -1.0 }"#,
            r#"{ "scroll_throttle_ms": -0.5 }"#,
        ] {
            assert!(matches!(SceneConfig::from_json(raw), Err(SceneError::Config(_))), "{raw}");
        }
        assert!(SceneConfig::from_json(r#"{ "resize_debounce_ms": 0.0 }"#).is_ok());
        assert!(matches!(
            SceneConfig::from_json(r#"{ "nope": true }"#),
            Err(SceneError::ConfigJson(_))
        ));
    }
}
