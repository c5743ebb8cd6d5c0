//! Tracing subscriber setup.
//!
//! Records go to stderr and, when a log file is given, are appended to it
//! as well. `DIRLEDGER_LOG` overrides the level passed on the command line.

use std::fs::OpenOptions;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a filter directive.
pub const LOG_ENV: &str = "DIRLEDGER_LOG";

/// Install the global subscriber.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = build_env_filter(level)?;
    let subscriber = Registry::default().with(filter);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_ansi(false)
                        .with_writer(file.and(std::io::stderr)),
                )
                .try_init()
                .context("Failed to install log subscriber")?;
        }
        None => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .context("Failed to install log subscriber")?;
        }
    }

    Ok(())
}

fn build_env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    EnvFilter::try_new(level).with_context(|| format!("Invalid log level '{level}'"))
}
