#![forbid(unsafe_code)]
//! Browser bindings for the LifeGoal reward engine.
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod app;
pub mod dom;
pub mod storage;

pub use app::{LifeGoalApp, WebError};
pub use storage::{LocalStorageStore, WebStorageError};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    dom::install_console_logger(log::LevelFilter::Info);
    log::info!("lifegoal-web {} loaded", env!("CARGO_PKG_VERSION"));
}
