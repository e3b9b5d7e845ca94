use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "mumbai_bench.log";
const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Sets up status lines on stdout and, when `log_dir` is given, a plain-text
/// copy in `<log_dir>/mumbai_bench.log`.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the program.
pub fn setup_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let console_layer = fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(env_filter());

    let Some(log_dir) = log_dir else {
        tracing_subscriber::registry()
            .with(console_layer)
            .try_init()
            .context("Failed to set global subscriber")?;
        return Ok(None);
    };

    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(env_filter());

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to set global subscriber")?;

    Ok(Some(guard))
}
