//! Tracing subscriber setup for the `sbos` binary.
//!
//! Logs always go to stderr (or a file), never stdout, so `--ui json` output
//! stays machine-readable.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;

#[derive(Debug, Clone, Default)]
pub struct LogOptions<'a> {
    pub verbose: bool,
    /// Configured level, used when `RUST_LOG` is unset and not verbose.
    pub level: &'a str,
    pub format: LogFormat,
    pub file: Option<&'a Path>,
    /// Progress spinners are drawing on stderr.
    pub spinners: bool,
}

/// Filter directive when `RUST_LOG` is not set.
///
/// Spinners redraw over stderr, so routine `info` lines drop to `warn` while
/// they are active unless logs go to a file.
pub fn default_directive(options: &LogOptions<'_>) -> String {
    let level = options.level.trim();
    if options.verbose {
        "sbos=debug,info".to_string()
    } else if options.spinners && options.file.is_none() && matches!(level, "" | "info") {
        "warn".to_string()
    } else if level.is_empty() {
        "info".to_string()
    } else {
        level.to_string()
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process.
pub fn init_tracing(options: &LogOptions<'_>) -> Result<WorkerGuard> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive(options))
            .with_context(|| format!("Invalid log level '{}'", options.level))?,
    };

    let (writer, guard) = match options.file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            tracing_appender::non_blocking(appender)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };
    let ansi = options.file.is_none();

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match options.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer).with_current_span(false))
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(options.verbose)
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init(),
    };
    installed.context("Failed to install tracing subscriber")?;

    Ok(guard)
}
