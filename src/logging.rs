//! Logging for the crate.
//!
//! Two layers:
//! - the `log` facade, backed in the browser by [`ConsoleLogger`]
//! - [`EventLog`], the structured `(event, data)` sink the loop manager is
//!   handed at construction, so it never writes to a console directly

use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::cell::RefCell;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: LevelFilter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: if cfg!(debug_assertions) {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
        }
    }
}

/// `log::Log` implementation writing to the browser console
pub struct ConsoleLogger {
    level: LevelFilter,
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
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

static LOGGER: OnceCell<ConsoleLogger> = OnceCell::new();

/// Installs the console logger once, later calls are ignored
pub fn init_logging(config: LoggingConfig) {
    if LOGGER.set(ConsoleLogger { level: config.level }).is_err() {
        return;
    }
    if let Some(logger) = LOGGER.get() {
        if log::set_logger(logger).is_ok() {
            log::set_max_level(config.level);
            log::debug!("logging initialized");
        }
    }
}

// ==================== Event Log ====================

/// Structured sink for things the game reports: input, pause changes,
/// faults caught inside a frame
pub trait EventLog {
    fn log(&self, event: &str, data: &Value);
}

/// Forwards events to the `log` facade under the `game` target
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeLog;

impl EventLog for FacadeLog {
    fn log(&self, event: &str, data: &Value) {
        log::info!(target: "game", "{} {}", event, data);
    }
}

/// Keeps every event in memory, in order
#[derive(Debug, Default)]
pub struct MemoryLog {
    events: RefCell<Vec<(String, Value)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.borrow().clone()
    }

    /// Event names only, handy for asserting on order
    pub fn names(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .map(|(event, _)| event.clone())
            .collect()
    }
}

impl EventLog for MemoryLog {
    fn log(&self, event: &str, data: &Value) {
        self.events.borrow_mut().push((event.to_owned(), data.clone()));
    }
}
