//! Tracing subscriber setup.
//!
//! Logs go to stderr so they never mix with command output on stdout, or to a
//! daily-rotated file under `<STACKIT_HOME>/logs` when `[logging] file = true`.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{Config, paths};

const LOG_FILE_PREFIX: &str = "stackit.log";

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held until
/// the process exits. It is `None` when logging to stderr.
///
/// # Errors
/// Returns an error if the filter is invalid, the log directory cannot be
/// created, or a subscriber is already installed.
pub fn init(config: &Config) -> Result<Option<WorkerGuard>> {
    let directives = config.effective_log_filter();
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter '{directives}'"))?;

    if config.logging.file {
        let dir = paths::logs_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

        let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .try_init()
            .context("Failed to install log subscriber")?;

        Ok(Some(guard))
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()
            .context("Failed to install log subscriber")?;

        Ok(None)
    }
}
