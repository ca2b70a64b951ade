//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/lapwatch/lapwatch.log` (or platform equivalent)
//! with 10 MB size-based rotation. Stdout carries timer output, so the console
//! layer writes to stderr and only shows warnings unless `DEBUG_LOGGING=1`.

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize logging with dual output (file + stderr).
///
/// Returns a `WorkerGuard` that MUST be held for the application lifetime
/// to ensure all buffered logs are flushed on shutdown.
///
/// Falls back to stderr-only logging (and returns `None`) if the log
/// directory or file cannot be created.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let log_dir = match dirs::config_dir() {
        Some(config) => config.join("lapwatch"),
        None => {
            init_stderr_only(debug_logging);
            return None;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Can't use tracing yet since subscriber not initialized
        eprintln!(
            "Failed to create log directory {:?}: {}, using stderr only",
            log_dir, e
        );
        init_stderr_only(debug_logging);
        return None;
    }

    // 10 MB, keep lapwatch.log and lapwatch.log.1
    let log_path = log_dir.join("lapwatch.log");
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(10 * 1024 * 1024),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {:?}: {}", log_path, e);
            init_stderr_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_filter(EnvFilter::new(filter_directive(debug_logging)));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer(debug_logging))
        .init();

    tracing::info!(log_file = ?log_path, debug_logging, "lapwatch logging initialized");

    Some(guard)
}

fn init_stderr_only(debug_logging: bool) {
    tracing_subscriber::registry()
        .with(stderr_layer(debug_logging))
        .init();

    tracing::debug!(debug_logging, "lapwatch logging initialized (stderr only)");
}

fn stderr_layer<S>(debug_logging: bool) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span> + 'static,
{
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    if debug_logging {
        layer.with_filter(EnvFilter::new(filter_directive(true))).boxed()
    } else {
        layer.with_filter(LevelFilter::WARN).boxed()
    }
}

fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        "info,lapwatch_core=debug,lapwatch_cli=debug"
    } else {
        "info"
    }
}
