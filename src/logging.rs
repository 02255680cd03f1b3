//! Logging setup.
//!
//! The terminal belongs to the UI, so logs only ever go to a file.

use crate::config::Args;
use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber when `--log-file` is given.
///
/// The returned guard must live until exit so buffered lines are flushed.
pub fn init(args: &Args) -> Result<Option<WorkerGuard>> {
    let Some(log_file) = args.log_file.as_deref() else {
        return Ok(None);
    };

    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = log_file.file_name().unwrap_or(OsStr::new("livestock-map.log"));
    std::fs::create_dir_all(dir).with_context(|| format!("cannot create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .with_context(|| format!("invalid log filter {:?}", args.log_level))?;

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;

    Ok(Some(guard))
}
