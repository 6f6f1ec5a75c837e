use std::cell::RefCell;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Document, Window};

use crate::error::Result;
use crate::timing::Throttle;

const NAV_SCROLLED_PX: f64 = 50.0;
const BACK_TO_TOP_PX: f64 = 300.0;

/// Throttled scroll handler for the sticky nav and the back-to-top button.
/// Independent of the hero scene; installed even when the scene is not.
pub fn install_scroll(window: &Window, document: &Document, throttle_ms: f64) -> Result<()> {
    let throttle = RefCell::new(Throttle::new(throttle_ms));
    let win = window.clone();
    let doc = document.clone();
    let on_scroll = Closure::wrap(Box::new(move || {
        let now = win.performance().map(|p| p.now()).unwrap_or_else(js_sys::Date::now);
        if !throttle.borrow_mut().try_acquire(now) {
            return;
        }
        let y = win.scroll_y().unwrap_or(0.0);
        apply_scroll(&doc, y);
    }) as Box<dyn FnMut()>);
    window.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())?;
    on_scroll.forget();

    apply_scroll(document, window.scroll_y().unwrap_or(0.0));
    Ok(())
}

fn apply_scroll(document: &Document, y: f64) {
    if let Ok(Some(nav)) = document.query_selector("nav") {
        let _ = nav.class_list().toggle_with_force("scrolled", y > NAV_SCROLLED_PX);
    }
    if let Some(button) = document.get_element_by_id("back-to-top") {
        let _ = button.class_list().toggle_with_force("visible", y > BACK_TO_TOP_PX);
    }
}
