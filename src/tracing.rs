//! Logging infrastructure for key table diagnostics
//!
//! Provides structured logging with scoped filtering for following key
//! events through a key table.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=brlkeys::keytable=debug` - module-level filtering
//!
//! # Log Files
//!
//! Logs can also be written to `~/.config/brlkeys/logs/brlkeys.log` with daily
//! rotation. File logging uses debug level so key events are always captured.

use std::path::Path;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Name of the rolling log file
pub const LOG_FILE_NAME: &str = "brlkeys.log";

/// Initialize tracing subscriber with console and optional file logging
///
/// Console output respects RUST_LOG env var for filtering and defaults to
/// `warn`. With a log directory, a file layer writes debug level logs to
/// `<log_dir>/brlkeys.log` with daily rotation.
pub fn init(log_dir: Option<&Path>) {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console layer - respects RUST_LOG
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = log_dir.and_then(|dir| match std::fs::create_dir_all(dir) {
        Ok(()) => {
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!(
                "Warning: Could not initialize file logging in {}: {}",
                dir.display(),
                e
            );
            None
        }
    });

    if tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: A tracing subscriber is already installed");
    }
}
