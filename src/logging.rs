//! Logging configuration using the tracing ecosystem.
//!
//! Logs go to a daily-rotated file rather than stdout/stderr, since the
//! terminal belongs to the TUI while it runs.

use std::path::PathBuf;

use anyhow::Context;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::config::Config;

/// Default log level if neither RUST_LOG nor the config sets one.
const DEFAULT_LOG_FILTER: &str = "extramem=info,warn";

/// Initialize the logging system.
///
/// Sets up tracing with a daily rotating file appender in the user's local
/// data directory. `RUST_LOG` wins over `configured`, which wins over
/// `extramem=info,warn`. Returns the log directory.
///
/// # Log Directory
///
/// - Linux: `~/.local/share/extramem/logs/`
/// - macOS: `~/Library/Application Support/extramem/logs/`
/// - Windows: `C:\Users\<User>\AppData\Local\extramem\logs\`
///
/// # Errors
///
/// Returns an error if the log directory cannot be determined or created,
/// the configured filter does not parse, or a global subscriber is already
/// set.
pub fn init(configured: Option<&str>) -> anyhow::Result<PathBuf> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "extramem.log");

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = filter_directive(configured);
            EnvFilter::try_new(directive)
                .with_context(|| format!("Invalid log filter '{}'", directive))?
        }
    };

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Extra Memory starting up");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");

    Ok(log_dir)
}

/// Record which services this run talks to.
pub fn log_session(config: &Config) {
    tracing::info!(
        backend = %config.backend_url,
        share_base = %config.share_base_url,
        link_preview = %config.link_preview_url,
        "Session endpoints"
    );
}

/// The directive used when `RUST_LOG` is unset.
fn filter_directive(configured: Option<&str>) -> &str {
    configured
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_LOG_FILTER)
}

fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("extramem").join("logs"))
}

/// Log application shutdown.
pub fn shutdown() {
    tracing::info!("Extra Memory shutting down");
}
