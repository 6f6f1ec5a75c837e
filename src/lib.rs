#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Decorative hero scene for the portfolio page: a slowly turning point cloud
//! and a few floating wireframe solids, with a camera that drifts toward the
//! pointer.
//!
//! Everything outside `wasm` is platform independent and tested on the host.

pub mod bodies;
pub mod camera;
pub mod clock;
pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod particles;
pub mod scene;
pub mod timing;
pub mod viewport;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    use crate::config::SceneConfig;

    mod host;
    mod page;
    mod render;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let throttle_ms = SceneConfig::default().scroll_throttle_ms;
        if let Err(err) = page::install_scroll(&window, &document, throttle_ms) {
            log::warn!("scroll handler not installed: {err}");
        }

        host::launch(&window, &document);
        Ok(())
    }

    #[wasm_bindgen(js_name = "setTheme")]
    pub fn set_theme(is_dark: bool) {
        host::set_theme(is_dark);
    }

    #[wasm_bindgen(js_name = "teardown")]
    pub fn teardown() {
        host::teardown();
    }
}
