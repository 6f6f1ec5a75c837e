#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use portfolio_scene::bodies::DecorativeBody;
use portfolio_scene::config::Rgb;
use portfolio_scene::error::{Result, SceneError};
use portfolio_scene::frame::{FrameCallback, FrameScheduler};
use portfolio_scene::particles::ParticleField;
use portfolio_scene::scene::{FrameView, Rasterizer, RenderSurface};
use portfolio_scene::viewport::{Container, ViewportState};

/// Display-refresh stand-in: frames fire only when the test says so.
#[derive(Default)]
pub struct ManualScheduler {
    next_id: Cell<i32>,
    pending: RefCell<Vec<(i32, FrameCallback)>>,
    pub cancelled: RefCell<Vec<i32>>,
}

impl ManualScheduler {
    pub fn fire(&self, ts: f64) {
        let due: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        for (_, cb) in due {
            cb(ts);
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Remove pending callbacks without cancelling them.
    pub fn steal(&self) -> Vec<FrameCallback> {
        self.pending.borrow_mut().drain(..).map(|(_, cb)| cb).collect()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<i32> {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.pending.borrow_mut().push((id, callback));
        Ok(id)
    }

    fn cancel_frame(&self, id: i32) {
        self.cancelled.borrow_mut().push(id);
        self.pending.borrow_mut().retain(|(p, _)| *p != id);
    }
}

#[derive(Debug, Default)]
pub struct Calls {
    pub created: Cell<usize>,
    pub resizes: RefCell<Vec<ViewportState>>,
    pub color_uploads: Cell<usize>,
    pub draws: Cell<usize>,
    pub releases: Cell<usize>,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.created.get()
            + self.resizes.borrow().len()
            + self.color_uploads.get()
            + self.draws.get()
            + self.releases.get()
    }
}

pub struct CountingRasterizer {
    pub calls: Rc<Calls>,
    pub last_colors: Vec<Rgb>,
    pub fail_draws: bool,
}

impl Rasterizer for CountingRasterizer {
    fn resize(&mut self, viewport: &ViewportState) {
        self.calls.resizes.borrow_mut().push(*viewport);
    }

    fn upload_particle_colors(&mut self, colors: &[Rgb]) {
        self.calls.color_uploads.set(self.calls.color_uploads.get() + 1);
        self.last_colors = colors.to_vec();
    }

    fn draw(&mut self, _frame: &FrameView<'_>) -> Result<()> {
        self.calls.draws.set(self.calls.draws.get() + 1);
        if self.fail_draws {
            return Err(SceneError::Unsupported("WebGL context lost".into()));
        }
        Ok(())
    }

    fn release(&mut self) {
        self.calls.releases.set(self.calls.releases.get() + 1);
    }
}

pub struct FakeSurface {
    pub size: Cell<(f64, f64)>,
    pub dpr: f64,
    pub supported: bool,
    pub fail_draws: bool,
    pub calls: Rc<Calls>,
}

impl FakeSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Cell::new((width, height)),
            dpr: 1.0,
            supported: true,
            fail_draws: false,
            calls: Rc::new(Calls::default()),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(800.0, 600.0)
        }
    }
}

impl Container for FakeSurface {
    fn pixel_box(&self) -> (f64, f64) {
        self.size.get()
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }
}

impl RenderSurface for FakeSurface {
    type Rasterizer = CountingRasterizer;

    fn create_rasterizer(
        &self,
        _particles: &ParticleField,
        _bodies: &[DecorativeBody],
    ) -> Result<Option<CountingRasterizer>> {
        if !self.supported {
            return Ok(None);
        }
        self.calls.created.set(self.calls.created.get() + 1);
        Ok(Some(CountingRasterizer {
            calls: Rc::clone(&self.calls),
            last_colors: Vec::new(),
            fail_draws: self.fail_draws,
        }))
    }
}
