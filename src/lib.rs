#![warn(clippy::all, rust_2018_idioms)]

mod app;
pub mod config;
pub mod error;
pub mod koch;
mod view;

pub use app::{SnowflakeApp, SnowflakeState};
pub use error::{KochError, RenderError};
pub use koch::{generate_snowflake, subdivide_segment, Depth, Point, Polyline, Snowflake};

// ----------------------------------------------------------------------------
// When compiling for web:

#[cfg(target_arch = "wasm32")]
use eframe::wasm_bindgen::{self, prelude::*};

/// This is the entry-point for all the web-assembly.
/// This is called once from the HTML.
/// It loads the app, installs some callbacks, then returns.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start(canvas_id: &str) -> Result<(), eframe::wasm_bindgen::JsValue> {
    // Make sure panics are logged using `console.error`.
    console_error_panic_hook::set_once();

    // Redirect tracing to console.log and friends:
    tracing_wasm::set_as_global_default();

    eframe::start_web(canvas_id, Box::new(|cc| Box::new(SnowflakeApp::new(cc))))
}
