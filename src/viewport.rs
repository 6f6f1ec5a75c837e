/// Size of the render surface as the camera and rasterizer see it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// CSS pixels.
    pub width: f64,
    pub height: f64,
    pub aspect: f32,
    pub pixel_ratio: f64,
}

/// Something with a CSS pixel box and a device pixel ratio, normally the
/// element that contains the canvas.
pub trait Container {
    fn pixel_box(&self) -> (f64, f64);
    fn device_pixel_ratio(&self) -> f64;
}

impl ViewportState {
    pub fn from_box(width: f64, height: f64, device_pixel_ratio: f64, max_pixel_ratio: f64) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        let aspect = if height > 0.0 { (width / height) as f32 } else { 1.0 };
        let pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(max_pixel_ratio)
        } else {
            1.0
        };
        Self { width, height, aspect, pixel_ratio }
    }

    /// Backing-store size in device pixels.
    pub fn drawing_buffer(&self) -> (u32, u32) {
        (
            (self.width * self.pixel_ratio).round() as u32,
            (self.height * self.pixel_ratio).round() as u32,
        )
    }
}

pub fn bind(container: &impl Container, max_pixel_ratio: f64) -> ViewportState {
    let (w, h) = container.pixel_box();
    ViewportState::from_box(w, h, container.device_pixel_ratio(), max_pixel_ratio)
}

/// Same computation as [`bind`]; kept separate so call sites read as the
/// event they handle.
pub fn on_resize(container: &impl Container, max_pixel_ratio: f64) -> ViewportState {
    bind(container, max_pixel_ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64, f64, f64);

    impl Container for Fixed {
        fn pixel_box(&self) -> (f64, f64) {
            (self.0, self.1)
        }
        fn device_pixel_ratio(&self) -> f64 {
            self.2
        }
    }

    #[test]
    fn pixel_ratio_is_capped() {
        let vp = bind(&Fixed(800.0, 400.0, 3.0), 2.0);
        assert_eq!(vp.pixel_ratio, 2.0);
        assert_eq!(vp.aspect, 2.0);
        assert_eq!(vp.drawing_buffer(), (1600, 800));

        let vp = on_resize(&Fixed(800.0, 400.0, 1.25), 2.0);
        assert_eq!(vp.pixel_ratio, 1.25);
    }

    #[test]
    fn zero_height_keeps_unit_aspect() {
        let vp = bind(&Fixed(640.0, 0.0, 1.0), 2.0);
        assert_eq!(vp.aspect, 1.0);
        assert_eq!(vp.drawing_buffer(), (640, 0));
    }
}
