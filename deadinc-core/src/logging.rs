//! Structured logging using **tracing**.
//!
//! The analyzer itself only emits `tracing` events: `debug` for every
//! declaration, usage and credited include, `info` per finalized unit,
//! `warn` for skipped input. Hosts decide where they go; the CLI installs the
//! JSON subscriber below.

use tracing::{error, info, warn};

/// Initializes the global tracing subscriber.
///
/// Call once at startup. JSON lines go to stderr so stdout stays free for
/// diagnostics.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=deadinc_core=debug`)
pub fn init_structured_logging() {
    // try_init: a host (or a test harness) may already have installed one
    let _ = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Logs a warning event.
pub fn log_warn(message: &str) {
    warn!(detail = %message);
}

/// Logs an info event.
pub fn log_info(message: &str) {
    info!(detail = %message);
}

/// Logs a custom event with a specific event name.
///
/// Maps to a log level based on the event name.
pub fn log_event(event: &str, detail: &str) {
    match event.to_uppercase().as_str() {
        "ERROR" => error!(event = %event, detail = %detail),
        "WARN" | "WARNING" => warn!(event = %event, detail = %detail),
        _ => info!(event = %event, detail = %detail),
    }
}
