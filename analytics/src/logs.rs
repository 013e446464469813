//! Pipeline progress logging.
//!
//! Thin helpers over `tracing` so pipeline steps read the same everywhere.
//! The subscriber is installed by the binary; library users get whatever
//! subscriber they set up (or nothing).

use tracing::{debug, error, info, warn};

/// Log level of a pipeline message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Success,
    Warning,
    Error,
}

/// Emit a message at `level`, indented by `indent` steps.
pub fn log(level: LogLevel, message: &str, indent: u8) {
    let pad = "  ".repeat(indent as usize);
    match level {
        LogLevel::Debug => debug!("{pad}{message}"),
        LogLevel::Info => info!("{pad}{message}"),
        LogLevel::Success => info!(status = "ok", "{pad}{message}"),
        LogLevel::Warning => warn!("{pad}{message}"),
        LogLevel::Error => error!("{pad}{message}"),
    }
}

pub fn log_debug(msg: impl AsRef<str>) {
    log(LogLevel::Debug, msg.as_ref(), 0);
}

pub fn log_info(msg: impl AsRef<str>) {
    log(LogLevel::Info, msg.as_ref(), 0);
}

pub fn log_success(msg: impl AsRef<str>) {
    log(LogLevel::Success, msg.as_ref(), 0);
}

pub fn log_warning(msg: impl AsRef<str>) {
    log(LogLevel::Warning, msg.as_ref(), 0);
}

pub fn log_error(msg: impl AsRef<str>) {
    log(LogLevel::Error, msg.as_ref(), 0);
}

pub fn log_info_indent(msg: impl AsRef<str>, indent: u8) {
    log(LogLevel::Info, msg.as_ref(), indent);
}

pub fn log_debug_indent(msg: impl AsRef<str>, indent: u8) {
    log(LogLevel::Debug, msg.as_ref(), indent);
}
