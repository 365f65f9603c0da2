//! Logging setup.
//!
//! Writing log lines to the terminal would corrupt the form while it owns the
//! alternate screen, so the form logs to a file and the one-shot commands log
//! to stderr (stdout stays clean for results). `APPROVAL_LOG_MODE` overrides
//! the choice; `RUST_LOG` sets the filter.

use std::fs::{File, OpenOptions};
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ENV_LOG_FILE, ENV_LOG_MODE};
use crate::error::{AppError, EXIT_RUNTIME};

const DEFAULT_LOG_FILE: &str = "approval.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    File,
    Stderr,
}

/// Pick the sink from `APPROVAL_LOG_MODE` (`auto`, `file`, `stderr`).
pub fn choose_sink(mode: Option<&str>, interactive: bool) -> LogSink {
    match mode.map(str::trim) {
        Some("file") => LogSink::File,
        Some("stderr") | Some("stdout") => LogSink::Stderr,
        _ if interactive => LogSink::File,
        _ => LogSink::Stderr,
    }
}

/// Install the global subscriber. Keep the guard alive until exit so buffered
/// lines are flushed.
pub fn init(interactive: bool) -> Result<WorkerGuard, AppError> {
    let mode = std::env::var(ENV_LOG_MODE).ok();
    let sink = choose_sink(mode.as_deref(), interactive);

    let (writer, guard) = match sink {
        LogSink::File => {
            let log_file = std::env::var(ENV_LOG_FILE).unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
            tracing_appender::non_blocking(open_log_file(Path::new(&log_file))?)
        }
        LogSink::Stderr => tracing_appender::non_blocking(std::io::stderr()),
    };

    let ansi = sink == LogSink::Stderr;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to initialize logging: {e}")))?;

    Ok(guard)
}

/// Open `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<File, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::new(
                EXIT_RUNTIME,
                format!("Failed to create log directory '{}': {e}", parent.display()),
            )
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to open log file '{}': {e}", path.display())))
}
