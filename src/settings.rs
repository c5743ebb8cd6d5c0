//! Run configuration from an optional TOML file plus command-line overrides.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};

use dirledger_core::LedgerConfig;

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub strip_prefix: Option<String>,
    pub jobs: Option<usize>,
    /// Set only when the flag was given; `false` keeps the file's value.
    pub follow_symlinks: bool,
}

/// Build the configuration for scanning `root`.
pub fn load_config(root: impl Into<PathBuf>, file: Option<&Path>, overrides: &Overrides) -> Result<LedgerConfig> {
    let mut config = match file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str::<LedgerConfig>(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => LedgerConfig::default(),
    };

    config.root = root.into();
    if let Some(prefix) = &overrides.strip_prefix {
        config.strip_prefix = Some(prefix.clone());
    }
    if let Some(jobs) = overrides.jobs {
        config.workers = jobs;
    }
    if overrides.follow_symlinks {
        config.follow_symlinks = true;
    }

    // Fail early on bad patterns.
    config.ignore_set()?;
    Ok(config.normalized())
}
