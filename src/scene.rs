//! Scene setup, the render loop and teardown.

use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::ops::ControlFlow;
use std::rc::Rc;

use glam::Mat4;
use rand::Rng;

use crate::bodies::{self, DecorativeBody, FloatAmplitude};
use crate::camera::{PointerCamera, SharedInputs};
use crate::clock::FrameClock;
use crate::config::{Rgb, SceneConfig};
use crate::error::{Result, SceneError};
use crate::frame::{spawn_periodic, FrameScheduler, TaskHandle};
use crate::particles::ParticleField;
use crate::timing::Debouncer;
use crate::viewport::{self, Container, ViewportState};

/// Everything a rasterizer needs to draw one frame.
pub struct FrameView<'a> {
    pub view_projection: Mat4,
    pub particle_model: Mat4,
    pub bodies: &'a [DecorativeBody],
    pub body_color: Rgb,
}

pub trait Rasterizer {
    fn resize(&mut self, viewport: &ViewportState);
    fn upload_particle_colors(&mut self, colors: &[Rgb]);
    fn draw(&mut self, frame: &FrameView<'_>) -> Result<()>;
    /// Free native resources. Called once, at teardown.
    fn release(&mut self);
}

/// Where the scene draws. `create_rasterizer` returns `Ok(None)` when the host
/// has no 3D-capable context to offer.
pub trait RenderSurface: Container {
    type Rasterizer: Rasterizer;

    fn create_rasterizer(
        &self,
        particles: &ParticleField,
        bodies: &[DecorativeBody],
    ) -> Result<Option<Self::Rasterizer>>;
}

pub enum SceneSetup<R> {
    Unavailable(SceneError),
    Ready(SceneState<R>),
}

pub struct SceneState<R> {
    rasterizer: R,
    camera: PointerCamera,
    particles: ParticleField,
    bodies: Vec<DecorativeBody>,
    viewport: ViewportState,
    clock: FrameClock,
    amplitude: FloatAmplitude,
    config: SceneConfig,
    released: bool,
}

impl<R: Rasterizer> SceneState<R> {
    /// Build the scene on `surface`. Content is generated before the
    /// rasterizer is requested, so an unsupported surface sees no draw calls.
    pub fn setup<S>(surface: &S, config: SceneConfig, dark_theme: bool, rng: &mut impl Rng) -> SceneSetup<R>
    where
        S: RenderSurface<Rasterizer = R>,
    {
        if let Err(err) = config.validate() {
            return SceneSetup::Unavailable(err);
        }

        let mut particles = ParticleField::create(
            config.particle_count,
            config.particle_half_extent,
            config.particle_color_dark,
            config.particle_color_light,
            rng,
        );
        particles.recolor(dark_theme);
        let bodies = bodies::create(&config.bodies, rng);

        let rasterizer = match surface.create_rasterizer(&particles, &bodies) {
            Ok(Some(r)) => r,
            Ok(None) => {
                return SceneSetup::Unavailable(SceneError::Unsupported("no WebGL2 context".into()))
            }
            Err(err) => return SceneSetup::Unavailable(err),
        };

        let camera = PointerCamera::new(
            config.camera_distance,
            config.camera_fov_deg,
            config.camera_near,
            config.camera_far,
            config.pointer_scale,
            config.smoothing,
        );
        let viewport = viewport::bind(surface, config.max_pixel_ratio);
        let amplitude = FloatAmplitude {
            x: config.float_amplitude_x,
            y: config.float_amplitude_y,
        };

        let mut state = SceneState {
            rasterizer,
            camera,
            particles,
            bodies,
            viewport,
            clock: FrameClock::new(),
            amplitude,
            config,
            released: false,
        };
        state.resize(viewport);
        if let Some(colors) = state.particles.take_dirty_colors() {
            state.rasterizer.upload_particle_colors(colors);
        }
        SceneSetup::Ready(state)
    }

    pub fn resize(&mut self, viewport: ViewportState) {
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect;
        self.rasterizer.resize(&viewport);
    }

    pub fn apply_theme(&mut self, dark: bool) {
        self.particles.recolor(dark);
    }

    pub fn step_camera(&mut self, inputs: &SharedInputs) {
        self.camera.step(inputs.pointer());
    }

    /// One render-loop tick.
    pub fn render_frame(&mut self, now_ms: f64, dark_theme: bool) -> Result<()> {
        // Float offsets are 2π-periodic in t; wrapping in f64 keeps the phase
        // precise in f32 on pages left open for days.
        let time = (self.clock.sample(now_ms) % TAU) as f32;
        self.particles.step_rotation();
        for body in &mut self.bodies {
            bodies::step(time, body, self.amplitude);
        }
        if let Some(colors) = self.particles.take_dirty_colors() {
            self.rasterizer.upload_particle_colors(colors);
        }
        let frame = FrameView {
            view_projection: self.camera.view_projection(),
            particle_model: self.particles.model_matrix(),
            bodies: &self.bodies,
            body_color: self.config.body_color(dark_theme),
        };
        self.rasterizer.draw(&frame)
    }

    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.rasterizer.release();
        }
    }

    pub fn camera(&self) -> &PointerCamera {
        &self.camera
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn bodies(&self) -> &[DecorativeBody] {
        &self.bodies
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    NotStarted,
    Running,
    /// Terminal; a stopped scene is never restarted.
    Stopped,
}

/// A ready scene plus its two frame tasks.
pub struct Scene<R> {
    state: Rc<RefCell<SceneState<R>>>,
    inputs: Rc<SharedInputs>,
    loop_state: Rc<Cell<LoopState>>,
    render_task: Option<TaskHandle>,
    camera_task: Rc<RefCell<Option<TaskHandle>>>,
    resize: Debouncer<ViewportState>,
    on_viewport_change: Option<Box<dyn Fn(&ViewportState)>>,
    on_render_failure: Option<Rc<dyn Fn(&SceneError)>>,
}

impl<R: Rasterizer + 'static> Scene<R> {
    pub fn new(state: SceneState<R>, inputs: Rc<SharedInputs>) -> Self {
        let delay = state.config.resize_debounce_ms;
        Self {
            state: Rc::new(RefCell::new(state)),
            inputs,
            loop_state: Rc::new(Cell::new(LoopState::NotStarted)),
            render_task: None,
            camera_task: Rc::new(RefCell::new(None)),
            resize: Debouncer::new(delay),
            on_viewport_change: None,
            on_render_failure: None,
        }
    }

    /// Hook run after every applied viewport change.
    pub fn on_viewport_change(&mut self, hook: impl Fn(&ViewportState) + 'static) {
        self.on_viewport_change = Some(Box::new(hook));
    }

    /// Hook run once if a frame fails to draw, after the scene has stopped
    /// and released the rasterizer. Must be set before [`Scene::start`].
    pub fn on_render_failure(&mut self, hook: impl Fn(&SceneError) + 'static) {
        self.on_render_failure = Some(Rc::new(hook));
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state.get()
    }

    pub fn inputs(&self) -> &Rc<SharedInputs> {
        &self.inputs
    }

    pub fn state(&self) -> std::cell::Ref<'_, SceneState<R>> {
        self.state.borrow()
    }

    /// Start the render loop and the camera updater. Only the first call on
    /// a fresh scene does anything.
    pub fn start(&mut self, scheduler: Rc<dyn FrameScheduler>) -> Result<()> {
        if self.loop_state.get() != LoopState::NotStarted {
            return Ok(());
        }

        let state = Rc::clone(&self.state);
        let inputs = Rc::clone(&self.inputs);
        let loop_state = Rc::clone(&self.loop_state);
        let camera_task = Rc::clone(&self.camera_task);
        let on_failure = self.on_render_failure.clone();
        let render = spawn_periodic(Rc::clone(&scheduler), move |timestamp| {
            let result = state.borrow_mut().render_frame(timestamp, inputs.dark_theme());
            match result {
                Ok(()) => ControlFlow::Continue(()),
                Err(err) => {
                    log::error!("render failed, stopping scene: {err}");
                    loop_state.set(LoopState::Stopped);
                    if let Some(task) = camera_task.borrow_mut().take() {
                        task.cancel();
                    }
                    state.borrow_mut().release();
                    if let Some(hook) = &on_failure {
                        hook(&err);
                    }
                    ControlFlow::Break(())
                }
            }
        })?;

        let state = Rc::clone(&self.state);
        let inputs = Rc::clone(&self.inputs);
        let camera = match spawn_periodic(scheduler, move |_| {
            state.borrow_mut().step_camera(&inputs);
            ControlFlow::Continue(())
        }) {
            Ok(task) => task,
            Err(err) => {
                render.cancel();
                return Err(err);
            }
        };

        self.render_task = Some(render);
        *self.camera_task.borrow_mut() = Some(camera);
        self.loop_state.set(LoopState::Running);
        log::info!("hero scene running");
        Ok(())
    }

    pub fn set_theme(&self, dark: bool) {
        self.inputs.set_dark_theme(dark);
        self.state.borrow_mut().apply_theme(self.inputs.dark_theme());
    }

    /// Record a resize event; the viewport is applied by [`Scene::flush_resize`]
    /// once the burst settles.
    pub fn signal_resize(&mut self, now_ms: f64, viewport: ViewportState) {
        self.resize.signal(now_ms, viewport);
    }

    pub fn resize_pending(&self) -> bool {
        self.resize.is_pending()
    }

    pub fn resize_delay_ms(&self) -> f64 {
        self.resize.delay_ms()
    }

    /// Apply the last signalled viewport if the debounce window has passed.
    pub fn flush_resize(&mut self, now_ms: f64) -> bool {
        let Some(viewport) = self.resize.poll(now_ms) else {
            return false;
        };
        if self.loop_state.get() == LoopState::Stopped {
            return false;
        }
        self.state.borrow_mut().resize(viewport);
        log::debug!("viewport {}x{} @{}x", viewport.width, viewport.height, viewport.pixel_ratio);
        if let Some(hook) = &self.on_viewport_change {
            hook(&viewport);
        }
        true
    }

    /// Cancel both frame tasks and release the rasterizer. Safe to call twice.
    pub fn teardown(&mut self) {
        if let Some(task) = self.render_task.take() {
            task.cancel();
        }
        if let Some(task) = self.camera_task.borrow_mut().take() {
            task.cancel();
        }
        self.resize.cancel();
        self.state.borrow_mut().release();
        if self.loop_state.replace(LoopState::Stopped) != LoopState::Stopped {
            log::info!("hero scene torn down");
        }
    }
}
