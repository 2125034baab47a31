//! Thin accessors over browser globals.
use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Storage, Window};

#[must_use]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Best-effort text for a thrown JS value: plain strings, `Error.message`,
/// or the debug form of anything else.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    match value.dyn_ref::<js_sys::Error>() {
        Some(err) => String::from(err.message()),
        None => format!("{value:?}"),
    }
}

/// The origin's `localStorage`.
///
/// # Errors
///
/// Fails outside a browser window, or when the browser denies storage
/// access (some private browsing modes do).
pub fn local_storage() -> Result<Storage, JsValue> {
    let window = window().ok_or_else(|| JsValue::from_str("no window in this context"))?;
    window
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage is disabled"))
}

/// Forwards `log` records to the devtools console.
struct ConsoleLogger;

static CONSOLE_LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from(format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Route engine logs to the console. Later calls are no-ops.
pub fn install_console_logger(level: LevelFilter) {
    if log::set_logger(&CONSOLE_LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
