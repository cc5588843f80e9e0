//! Sprite Sheet Generator Web Frontend
//!
//! Leptos-based WASM frontend: marketing page, pricing, login, signup and the
//! signed-in dashboard. Pricing actions and form rules come from
//! `sprite-core`, the same code the server runs.

mod api;
mod app;
mod components;
mod pages;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
