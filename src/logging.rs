//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/clonewatch/clonewatch.log` (or platform
//! equivalent) with 10 MB size-based rotation. Set `DEBUG_LOGGING=1`, or
//! enable `debug_mode` in the settings, for debug output from the clonewatch
//! crates.

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEBUG_DIRECTIVE: &str = "info,clonewatch=debug,clonewatch_core=debug,clonewatch_overlay=debug";

/// Initialize logging with dual output (file + stderr).
///
/// Returns a `WorkerGuard` that MUST be held for the application lifetime
/// so buffered file logs are flushed on shutdown. Console output goes to
/// stderr to keep the REPL's stdout readable.
///
/// Falls back to console-only logging (returning `None`) when the log file
/// cannot be created.
pub fn init(debug_mode: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = debug_mode || std::env::var("DEBUG_LOGGING").is_ok();

    let log_dir = match dirs::config_dir() {
        Some(config) => config.join("clonewatch"),
        None => {
            init_console_only(debug_logging);
            return None;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Subscriber not initialized yet
        eprintln!(
            "Failed to create log directory {:?}: {}, using console only",
            log_dir, e
        );
        init_console_only(debug_logging);
        return None;
    }

    // 10 MB, keep clonewatch.log and clonewatch.log.1
    let log_path = log_dir.join("clonewatch.log");
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(10 * 1024 * 1024),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {:?}: {}", log_path, e);
            init_console_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(filter(debug_logging))
        .init();

    tracing::info!(
        log_file = ?log_path,
        debug_logging,
        "clonewatch logging initialized"
    );

    Some(guard)
}

fn init_console_only(debug_logging: bool) {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(filter(debug_logging))
        .init();

    tracing::info!(debug_logging, "clonewatch logging initialized (console only)");
}

fn filter(debug_logging: bool) -> EnvFilter {
    EnvFilter::new(if debug_logging { DEBUG_DIRECTIVE } else { "info" })
}
