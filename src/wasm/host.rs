use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    Document, Element, ErrorEvent, Event, HtmlCanvasElement, MouseEvent,
    WebGl2RenderingContext as GL, Window,
};

use super::render::WebGlRasterizer;
use crate::bodies::DecorativeBody;
use crate::camera::SharedInputs;
use crate::config::SceneConfig;
use crate::error::{Result, SceneError};
use crate::frame::{FrameCallback, FrameScheduler};
use crate::particles::ParticleField;
use crate::scene::{RenderSurface, Scene, SceneSetup, SceneState};
use crate::viewport::{self, Container};

pub const CANVAS_ID: &str = "hero-canvas";
const CONFIG_ATTR: &str = "data-scene-config";

thread_local! {
    static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

type RafClosure = Closure<dyn FnMut(f64)>;

/// `requestAnimationFrame` as a [`FrameScheduler`].
///
/// Each request's closure stays in `frames` until it fires or is cancelled, so
/// a withdrawn frame frees its closure instead of leaking it. A closure that
/// has fired moves to `spent` and is dropped when the next frame runs.
pub struct RafScheduler {
    window: Window,
    frames: Rc<RefCell<HashMap<i32, RafClosure>>>,
    spent: Rc<RefCell<Vec<RafClosure>>>,
}

impl RafScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            frames: Rc::new(RefCell::new(HashMap::new())),
            spent: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Requested frames that have neither fired nor been cancelled.
    pub fn live_frames(&self) -> usize {
        self.frames.borrow().len()
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<i32> {
        let frames = Rc::downgrade(&self.frames);
        let spent = Rc::downgrade(&self.spent);
        let id = Rc::new(Cell::new(0));
        let own_id = Rc::clone(&id);
        let mut callback = Some(callback);
        let cb = Closure::wrap(Box::new(move |timestamp: f64| {
            if let (Some(frames), Some(spent)) = (frames.upgrade(), spent.upgrade()) {
                let mut spent = spent.borrow_mut();
                spent.clear();
                if let Some(own) = frames.borrow_mut().remove(&own_id.get()) {
                    spent.push(own);
                }
            }
            if let Some(callback) = callback.take() {
                callback(timestamp);
            }
        }) as Box<dyn FnMut(f64)>);
        id.set(self.window.request_animation_frame(cb.as_ref().unchecked_ref())?);
        self.frames.borrow_mut().insert(id.get(), cb);
        Ok(id.get())
    }

    fn cancel_frame(&self, id: i32) {
        let _ = self.window.cancel_animation_frame(id);
        self.frames.borrow_mut().remove(&id);
    }
}

/// The hero canvas and the element whose box it fills.
pub struct CanvasSurface {
    window: Window,
    canvas: HtmlCanvasElement,
    container: Element,
    particle_size: f32,
}

impl CanvasSurface {
    pub fn find(window: &Window, document: &Document) -> Result<Self> {
        let canvas = document
            .get_element_by_id(CANVAS_ID)
            .ok_or(SceneError::MissingElement(CANVAS_ID))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| SceneError::MissingElement(CANVAS_ID))?;
        let container = canvas
            .parent_element()
            .unwrap_or_else(|| canvas.clone().unchecked_into());
        Ok(Self {
            window: window.clone(),
            canvas,
            container,
            particle_size: SceneConfig::default().particle_size,
        })
    }

    /// Config from the canvas attribute, or the defaults when it is absent.
    pub fn read_config(&self) -> Result<SceneConfig> {
        match self.canvas.get_attribute(CONFIG_ATTR) {
            Some(raw) => SceneConfig::from_json(&raw),
            None => Ok(SceneConfig::default()),
        }
    }

    pub fn hide(&self) {
        let _ = self.canvas.style().set_property("display", "none");
    }
}

impl Container for CanvasSurface {
    fn pixel_box(&self) -> (f64, f64) {
        (
            self.container.client_width() as f64,
            self.container.client_height() as f64,
        )
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }
}

impl RenderSurface for CanvasSurface {
    type Rasterizer = WebGlRasterizer;

    fn create_rasterizer(
        &self,
        particles: &ParticleField,
        bodies: &[DecorativeBody],
    ) -> Result<Option<WebGlRasterizer>> {
        let gl = match self.canvas.get_context("webgl2") {
            Ok(Some(ctx)) => ctx
                .dyn_into::<GL>()
                .map_err(|_| SceneError::Unsupported("context is not WebGL2".into()))?,
            _ => return Ok(None),
        };
        WebGlRasterizer::new(gl, self.canvas.clone(), particles, bodies, self.particle_size).map(Some)
    }
}

/// Live scene plus the listeners that feed it. Dropped at teardown.
struct Page {
    scene: Scene<WebGlRasterizer>,
    surface: CanvasSurface,
    window: Window,
    max_pixel_ratio: f64,
    resize_timer: Option<i32>,
    on_resize: Closure<dyn FnMut()>,
    on_resize_settled: Closure<dyn FnMut()>,
    on_pointer: Closure<dyn FnMut(MouseEvent)>,
}

impl Page {
    fn arm_resize_timer(&mut self, delay_ms: f64) {
        if let Some(id) = self.resize_timer.take() {
            self.window.clear_timeout_with_handle(id);
        }
        self.resize_timer = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                self.on_resize_settled.as_ref().unchecked_ref(),
                delay_ms.ceil() as i32,
            )
            .ok();
    }

    fn detach(&mut self) {
        if let Some(id) = self.resize_timer.take() {
            self.window.clear_timeout_with_handle(id);
        }
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref());
        let _ = self
            .window
            .remove_event_listener_with_callback("mousemove", self.on_pointer.as_ref().unchecked_ref());
        self.scene.teardown();
    }
}

fn with_page<T>(f: impl FnOnce(&mut Page) -> T) -> Option<T> {
    PAGE.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

fn now_ms(window: &Window) -> f64 {
    window
        .performance()
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

fn initial_dark_theme(document: &Document) -> bool {
    document
        .document_element()
        .and_then(|root| root.get_attribute("data-theme"))
        .is_some_and(|theme| theme == "dark")
}

/// Best-effort nudge to the page's scroll-animation library, if loaded.
fn refresh_scroll_triggers(window: &Window) {
    let Ok(trigger) = js_sys::Reflect::get(window, &JsValue::from_str("ScrollTrigger")) else {
        return;
    };
    if trigger.is_undefined() || trigger.is_null() {
        return;
    }
    if let Ok(refresh) = js_sys::Reflect::get(&trigger, &JsValue::from_str("refresh")) {
        if let Some(refresh) = refresh.dyn_ref::<js_sys::Function>() {
            let _ = refresh.call0(&trigger);
        }
    }
}

/// Bring up the hero scene. Any failure hides the canvas and leaves the rest
/// of the page alone.
pub fn launch(window: &Window, document: &Document) {
    let surface = match CanvasSurface::find(window, document) {
        Ok(surface) => surface,
        Err(err) => {
            log::info!("hero scene disabled: {err}");
            return;
        }
    };
    if let Err(err) = try_launch(window, document, surface) {
        log::error!("hero scene setup failed: {err}");
    }
}

fn try_launch(window: &Window, document: &Document, mut surface: CanvasSurface) -> Result<()> {
    let config = match surface.read_config() {
        Ok(config) => config,
        Err(err) => {
            surface.hide();
            return Err(err);
        }
    };
    surface.particle_size = config.particle_size;
    let max_pixel_ratio = config.max_pixel_ratio;
    let dark = initial_dark_theme(document);
    let mut rng = SmallRng::seed_from_u64((js_sys::Math::random() * u64::MAX as f64) as u64);

    let state = match SceneState::setup(&surface, config, dark, &mut rng) {
        SceneSetup::Ready(state) => state,
        SceneSetup::Unavailable(reason) => {
            surface.hide();
            log::warn!("hero scene unavailable: {reason}");
            return Ok(());
        }
    };

    let inputs = Rc::new(SharedInputs::new(dark));
    let mut scene = Scene::new(state, Rc::clone(&inputs));
    {
        let window = window.clone();
        scene.on_viewport_change(move |_| refresh_scroll_triggers(&window));
    }
    {
        let canvas = surface.canvas.clone();
        scene.on_render_failure(move |_| {
            let _ = canvas.style().set_property("display", "none");
        });
    }
    let scheduler = Rc::new(RafScheduler::new(window.clone()));
    if let Err(err) = scene.start(scheduler) {
        scene.teardown();
        surface.hide();
        return Err(err);
    }

    let on_resize = Closure::wrap(Box::new(move || {
        with_page(|page| {
            let now = now_ms(&page.window);
            let vp = viewport::on_resize(&page.surface, page.max_pixel_ratio);
            page.scene.signal_resize(now, vp);
            let delay = page.scene.resize_delay_ms();
            page.arm_resize_timer(delay);
        });
    }) as Box<dyn FnMut()>);

    let on_resize_settled = Closure::wrap(Box::new(move || {
        with_page(|page| {
            page.resize_timer = None;
            let now = now_ms(&page.window);
            if !page.scene.flush_resize(now) && page.scene.resize_pending() {
                // timer fired a hair before the deadline by performance.now()
                page.arm_resize_timer(1.0);
            }
        });
    }) as Box<dyn FnMut()>);

    let on_pointer = {
        let inputs = Rc::clone(&inputs);
        let window = window.clone();
        Closure::wrap(Box::new(move |event: MouseEvent| {
            let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            inputs.set_pointer_client(event.client_x() as f64, event.client_y() as f64, width, height);
        }) as Box<dyn FnMut(MouseEvent)>)
    };

    let canvas = surface.canvas.clone();
    PAGE.with(|cell| {
        *cell.borrow_mut() = Some(Page {
            scene,
            surface,
            window: window.clone(),
            max_pixel_ratio,
            resize_timer: None,
            on_resize,
            on_resize_settled,
            on_pointer,
        });
    });

    if let Err(err) = attach_listeners(window, canvas.clone()) {
        teardown();
        let _ = canvas.style().set_property("display", "none");
        return Err(err);
    }
    Ok(())
}

fn attach_listeners(window: &Window, canvas: HtmlCanvasElement) -> Result<()> {
    with_page(|page| -> Result<()> {
        window.add_event_listener_with_callback("resize", page.on_resize.as_ref().unchecked_ref())?;
        window.add_event_listener_with_callback("mousemove", page.on_pointer.as_ref().unchecked_ref())?;
        Ok(())
    })
    .unwrap_or(Ok(()))?;

    // These two outlive the page state they tear down.
    let on_pagehide = Closure::wrap(Box::new(teardown) as Box<dyn FnMut()>);
    window.add_event_listener_with_callback("pagehide", on_pagehide.as_ref().unchecked_ref())?;
    on_pagehide.forget();

    let on_error = Closure::wrap(Box::new(move |event: Event| {
        let message = event
            .dyn_ref::<ErrorEvent>()
            .map(|e| e.message())
            .unwrap_or_default();
        if message.contains("WebGL") {
            log::warn!("rendering error, hiding hero canvas: {message}");
            let _ = canvas.style().set_property("display", "none");
            teardown();
        }
    }) as Box<dyn FnMut(Event)>);
    window.add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())?;
    on_error.forget();
    Ok(())
}

/// Theme flip from the page's toggle.
pub fn set_theme(is_dark: bool) {
    let applied = with_page(|page| page.scene.set_theme(is_dark));
    if applied.is_some() {
        log::info!("hero scene theme: {}", if is_dark { "dark" } else { "light" });
    }
}

/// Stop both frame tasks, drop listeners and release GL resources.
pub fn teardown() {
    let page = PAGE.with(|cell| cell.try_borrow_mut().ok().and_then(|mut slot| slot.take()));
    if let Some(mut page) = page {
        page.detach();
    }
}
