use std::{path::Path, sync::Mutex};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// File name prefix of the rolling log written by `run`.
pub const LOG_FILE_PREFIX: &str = "autopush.log";

// Keeps the non-blocking file writer alive until exit.
static FILE_APPENDER_GUARD: Mutex<Option<tracing_appender::non_blocking::WorkerGuard>> =
    Mutex::new(None);

/// Flush and close the log file appender.
pub fn flush_logs() {
    if let Ok(mut guard_holder) = FILE_APPENDER_GUARD.lock() {
        drop(guard_holder.take());
    }
}

// RUST_LOG (if set) wins; otherwise -v/-vv map to "debug"/"trace".
fn env_filter(verbosity: u8) -> Result<EnvFilter> {
    let base = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| base.to_string());
    EnvFilter::try_new(filter).context("invalid RUST_LOG / filter")
}

/// Initialize console tracing.
pub fn init_tracing(verbosity: u8) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*};

    let fmt_layer = fmt::layer().with_target(false);
    let filter_layer = env_filter(verbosity)?;

    // Allow re-init to be a no-op in tests
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init();

    Ok(())
}

/// Initialize console tracing plus a daily-rolling log file in `log_dir`.
pub fn init_tracing_with_file(log_dir: &Path, verbosity: u8) -> Result<()> {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*};

    let filter_layer = env_filter(verbosity)?;

    let file_appender = rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    if let Ok(mut guard_holder) = FILE_APPENDER_GUARD.lock() {
        *guard_holder = Some(guard);
    }

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(non_blocking);
    let console_layer = fmt::layer().with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    Ok(())
}
