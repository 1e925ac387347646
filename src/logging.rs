//! `log` backend for the browser console.
//!
//! Native hosts bring their own backend (`env_logger` in tests); [`init`]
//! only adjusts the level there.

use log::LevelFilter;

#[cfg(target_arch = "wasm32")]
mod console {
    use log::{Level, Log, Metadata, Record};
    use wasm_bindgen::JsValue;
    use web_sys::console;

    pub(super) struct ConsoleLogger;

    pub(super) static LOGGER: ConsoleLogger = ConsoleLogger;

    impl Log for ConsoleLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let msg = JsValue::from_str(&format!("[{} {}] {}", record.level(), record.target(), record.args()));
            match record.level() {
                Level::Error => console::error_1(&msg),
                Level::Warn => console::warn_1(&msg),
                Level::Info => console::info_1(&msg),
                Level::Debug | Level::Trace => console::debug_1(&msg),
            }
        }

        fn flush(&self) {}
    }
}

/// Installs the console logger on wasm. Later calls only adjust the level.
pub fn init(level: LevelFilter) {
    // set_logger fails if a logger is already installed; keep whichever came first.
    #[cfg(target_arch = "wasm32")]
    let _ = log::set_logger(&console::LOGGER);
    log::set_max_level(level);
}

/// Parses "error" / "warn" / "info" / "debug" / "trace" / "off"; unknown names
/// fall back to `Info`.
pub fn parse_level(name: &str) -> LevelFilter {
    name.trim().parse().unwrap_or(LevelFilter::Info)
}
