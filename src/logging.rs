use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs::{self, File};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Create (or truncate) the run log file, creating its parent directory if needed.
pub fn open_log_file(log_file: &Utf8Path) -> Result<File> {
    if let Some(parent) = log_file.parent() {
        if !parent.as_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent))?;
        }
    }

    File::create(log_file).with_context(|| format!("Failed to create log file: {}", log_file))
}

/// Setup logging for one export run.
///
/// Every event goes to the run log (timestamped, no ANSI codes) and, when
/// `console_output` is set, to the console as well. The log file is truncated so it
/// only ever holds the latest run.
///
/// # Arguments
/// * `log_file` - Path of the run log (e.g., "MO2_Exporter_Log.txt")
/// * `debug_mode` - If true, use debug level; otherwise use info level
/// * `console_output` - If true, also log to console
///
/// # Returns
/// A guard that must be held until the program exits; dropping it flushes the log file
pub fn setup_logging(
    log_file: &Utf8Path,
    debug_mode: bool,
    console_output: bool,
) -> Result<WorkerGuard> {
    let file = open_log_file(log_file)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let env_filter = if debug_mode {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false);

    if console_output {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(console_layer)
            .try_init()
            .context("Failed to install logging subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .try_init()
            .context("Failed to install logging subscriber")?;
    }

    tracing::debug!(
        "Logging initialized: file={}, debug={}, console={}",
        log_file,
        debug_mode,
        console_output
    );

    Ok(guard)
}
