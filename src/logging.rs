// Structured logging to a file
// The TUI owns stdout/stderr, so log lines go through a non-blocking file writer.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Filter used when RUST_LOG is unset
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "stock_chart=debug,warn"
    } else {
        "stock_chart=info,warn"
    }
}

/// Install the global subscriber. Keep the guard alive until exit or
/// buffered lines are lost.
pub fn init(log_file: &Path, verbose: bool) -> Result<WorkerGuard> {
    let file_name = log_file
        .file_name()
        .with_context(|| format!("log path {} has no file name", log_file.display()))?;
    let dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {e}"))?;

    Ok(guard)
}

// ============================================================================
// TESTS
// ============================================================================
