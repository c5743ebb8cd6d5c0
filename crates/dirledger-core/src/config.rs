//! Run configuration.

use std::path::PathBuf;

use derive_builder::Builder;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::natural::Collation;
use crate::path::{self, PathNormalizer};

/// Default worker bound for document inspection.
pub const DEFAULT_WORKERS: usize = 8;

/// Configuration shared by the tree builder, the index builder and the
/// flattener.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct LedgerConfig {
    /// Root path to scan.
    pub root: PathBuf,

    /// File name globs to drop from the tree (matched case-insensitively).
    #[builder(default = "vec![\"*.db\".to_string()]")]
    pub ignore_patterns: Vec<String>,

    /// Descend into symlinked directories.
    #[builder(default = "false")]
    pub follow_symlinks: bool,

    /// Extensions handed to the document inspector.
    #[builder(default = "default_inspectable()")]
    pub inspectable_extensions: Vec<String>,

    /// Extensions whose page count is shown in report rows.
    #[builder(default = "vec![\"pdf\".to_string()]")]
    pub paged_extensions: Vec<String>,

    /// Extensions highlighted as archives.
    #[builder(default = "vec![\"zip\".to_string(), \"rar\".to_string()]")]
    pub archive_extensions: Vec<String>,

    /// Leading path segment elided from normalized paths.
    #[builder(default)]
    pub strip_prefix: Option<String>,

    /// Upper bound on inspector workers (0 = default bound).
    #[builder(default = "DEFAULT_WORKERS")]
    pub workers: usize,

    /// Name collation.
    #[builder(default)]
    pub collation: Collation,
}

fn default_inspectable() -> Vec<String> {
    ["pdf", "docx", "xlsx"].map(String::from).to_vec()
}

impl LedgerConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        Ok(())
    }
}

impl LedgerConfig {
    /// Create a new config builder.
    pub fn builder() -> LedgerConfigBuilder {
        LedgerConfigBuilder::default()
    }

    /// Create a default config for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore_patterns: vec!["*.db".to_string()],
            follow_symlinks: false,
            inspectable_extensions: default_inspectable(),
            paged_extensions: vec!["pdf".to_string()],
            archive_extensions: vec!["zip".to_string(), "rar".to_string()],
            strip_prefix: None,
            workers: DEFAULT_WORKERS,
            collation: Collation::default(),
        }
    }

    /// Lower-case every extension list and drop leading dots.
    pub fn normalized(mut self) -> Self {
        for list in [
            &mut self.inspectable_extensions,
            &mut self.paged_extensions,
            &mut self.archive_extensions,
        ] {
            for ext in list.iter_mut() {
                *ext = ext.trim_start_matches('.').to_lowercase();
            }
        }
        self
    }

    /// Compile the ignore patterns.
    pub fn ignore_set(&self) -> Result<IgnoreSet, ScanError> {
        IgnoreSet::new(&self.ignore_patterns)
    }

    /// Path normalizer for metadata keys.
    pub fn normalizer(&self) -> PathNormalizer {
        PathNormalizer::with_strip_prefix(self.strip_prefix.as_deref())
    }

    /// Check if a file should be handed to the inspector.
    pub fn is_inspectable(&self, name: &str) -> bool {
        path::has_extension(name, &self.inspectable_extensions)
    }

    /// Check if a file's page count is shown.
    pub fn is_paged(&self, name: &str) -> bool {
        path::has_extension(name, &self.paged_extensions)
    }

    /// Check if a file is an archive.
    pub fn is_archive(&self, name: &str) -> bool {
        path::has_extension(name, &self.archive_extensions)
    }

    /// Worker count for inspecting `files` files.
    pub fn workers_for(&self, files: usize) -> usize {
        let bound = if self.workers == 0 {
            DEFAULT_WORKERS
        } else {
            self.workers
        };
        bound.min(files).max(1)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Compiled ignore globs.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    set: GlobSet,
}

impl IgnoreSet {
    /// Compile patterns; matching is case-insensitive.
    pub fn new(patterns: &[String]) -> Result<Self, ScanError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(true)
                .literal_separator(true)
                .build()
                .map_err(|e| ScanError::InvalidConfig {
                    message: format!("bad ignore pattern '{pattern}': {e}"),
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| ScanError::InvalidConfig {
            message: e.to_string(),
        })?;
        Ok(Self { set })
    }

    /// Set that ignores nothing.
    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
        }
    }

    /// Check if a file name is ignored.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.set.is_match(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = LedgerConfig::builder()
            .root("/srv/share")
            .workers(4usize)
            .strip_prefix(Some("6. Archive".to_string()))
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/srv/share"));
        assert_eq!(config.workers, 4);
        assert_eq!(config.ignore_patterns, vec!["*.db".to_string()]);
        assert!(!config.follow_symlinks);
        assert_eq!(config.normalizer().strip_prefix(), Some("6. Archive"));
    }

    #[test]
    fn test_builder_requires_root() {
        assert!(LedgerConfig::builder().build().is_err());
        assert!(LedgerConfig::builder().root("").build().is_err());
    }

    #[test]
    fn test_extension_sets() {
        let config = LedgerConfig::new("/x");
        assert!(config.is_inspectable("Plan.PDF"));
        assert!(config.is_inspectable("spec.docx"));
        assert!(!config.is_inspectable("notes.txt"));
        assert!(config.is_paged("a.pdf"));
        assert!(!config.is_paged("a.docx"));
        assert!(config.is_archive("backup.RAR"));
    }

    #[test]
    fn test_normalized_extensions() {
        let mut config = LedgerConfig::new("/x");
        config.archive_extensions = vec![".7Z".to_string()];
        let config = config.normalized();
        assert!(config.is_archive("pack.7z"));
    }

    #[test]
    fn test_workers_for() {
        let mut config = LedgerConfig::new("/x");
        assert_eq!(config.workers_for(3), 3);
        assert_eq!(config.workers_for(100), 8);
        assert_eq!(config.workers_for(0), 1);
        config.workers = 0;
        assert_eq!(config.workers_for(20), DEFAULT_WORKERS);
    }

    #[test]
    fn test_ignore_set() {
        let set = LedgerConfig::new("/x").ignore_set().unwrap();
        assert!(set.is_ignored("Thumbs.db"));
        assert!(set.is_ignored("CACHE.DB"));
        assert!(!set.is_ignored("data.dbx"));
        assert!(!IgnoreSet::empty().is_ignored("Thumbs.db"));
    }

    #[test]
    fn test_bad_pattern() {
        let err = IgnoreSet::new(&["[".to_string()]).unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfig { .. }));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: LedgerConfig =
            serde_json::from_str(r#"{"strip_prefix": "6. Archive", "collation": "codepoint"}"#)
                .unwrap();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.collation, Collation::Codepoint);
        assert_eq!(config.workers, DEFAULT_WORKERS);
    }
}
