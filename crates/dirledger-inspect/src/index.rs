//! Parallel metadata index construction.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use rayon::prelude::*;

use dirledger_core::{
    FileEntry, LedgerConfig, MetadataIndex, MetadataRecord, ScanWarning, ScannedTree, WarningKind,
};

use crate::error::IndexError;
use crate::inspector::{DocumentInspector, FileInspector, InspectionOutcome};

/// Shared flag for aborting a run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the token has fired.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A finished index with the per-file failures met while building it.
#[derive(Debug, Clone, Default)]
pub struct IndexOutcome {
    /// Every file of the tree, keyed by normalized path, in natural order.
    pub index: MetadataIndex,
    /// One warning per document that could not be read.
    pub warnings: Vec<ScanWarning>,
    /// Number of documents handed to the inspector.
    pub inspected: usize,
}

/// Builds the [`MetadataIndex`] for a scanned tree.
///
/// Inspectable documents are read on a bounded worker pool; all other files
/// get an explicitly empty record so lookups behave the same for both.
pub struct MetadataIndexBuilder<I = FileInspector> {
    config: LedgerConfig,
    inspector: I,
    cancel: CancelToken,
}

impl MetadataIndexBuilder<FileInspector> {
    /// Create a builder reading documents from disk.
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_inspector(config, FileInspector::new())
    }
}

impl<I: DocumentInspector> MetadataIndexBuilder<I> {
    /// Create a builder with a custom inspector.
    pub fn with_inspector(config: LedgerConfig, inspector: I) -> Self {
        Self {
            config,
            inspector,
            cancel: CancelToken::new(),
        }
    }

    /// Attach a cancel token.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token observed by the workers.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Index every file of a scanned tree.
    ///
    /// Documents inside an archive root cannot be opened individually, so
    /// they get empty records like any other non-inspectable file.
    pub fn build(&self, tree: &ScannedTree) -> Result<IndexOutcome, IndexError> {
        let files = tree.files(self.config.collation);
        if tree.root_path.is_dir() {
            self.build_from(&tree.root_path, &files)
        } else {
            tracing::debug!(root = %tree.root_path.display(), "archive root, documents not inspected");
            self.build_from_records(&files, &DashMap::new(), Vec::new(), 0)
        }
    }

    /// Index files given relative to `root`.
    pub fn build_from(&self, root: &Path, files: &[FileEntry]) -> Result<IndexOutcome, IndexError> {
        let normalizer = self.config.normalizer();
        let mut taken = HashSet::new();
        let mut targets: Vec<(String, PathBuf)> = Vec::new();
        for file in files.iter().filter(|f| self.config.is_inspectable(&f.name)) {
            let key = normalizer.normalize(&file.relative);
            // Prefix stripping can map two files onto one key; the first in
            // tree order owns it.
            if !taken.insert(key.clone()) {
                tracing::warn!(file = %file.relative, key = %key, "metadata key already taken, file skipped");
                continue;
            }
            targets.push((key, root.join(&file.relative)));
        }

        let inspected = targets.len();
        let records: DashMap<String, MetadataRecord> = DashMap::with_capacity(inspected);
        let mut warnings = Vec::new();

        if !targets.is_empty() {
            let workers = self.config.workers_for(targets.len());
            tracing::debug!(documents = targets.len(), workers, "inspecting documents");

            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("dirledger-inspect-{i}"))
                .build()
                .map_err(|e| IndexError::Pool(e.to_string()))?;

            warnings = pool.install(|| {
                targets
                    .par_iter()
                    .filter_map(|(key, path)| self.inspect_one(key, path, &records))
                    .collect()
            });
        }

        if self.cancel.is_cancelled() {
            tracing::info!("indexing cancelled, discarding partial results");
            return Err(IndexError::Cancelled);
        }

        self.build_from_records(files, &records, warnings, inspected)
    }

    /// Inspect one document and store its record; returns a warning on failure.
    fn inspect_one(
        &self,
        key: &str,
        path: &Path,
        records: &DashMap<String, MetadataRecord>,
    ) -> Option<ScanWarning> {
        if self.cancel.is_cancelled() {
            return None;
        }

        let outcome = self.inspector.inspect(path);
        let warning = match &outcome {
            InspectionOutcome::Failed(reason) => {
                tracing::warn!(path = %path.display(), "inspection failed: {reason}");
                Some(ScanWarning::new(path, reason.clone(), WarningKind::InspectionFailed))
            }
            InspectionOutcome::Inspected(facts) => {
                tracing::debug!(file = key, pages = facts.pages, "document indexed");
                None
            }
        };

        records.insert(key.to_string(), outcome.into_record());
        warning
    }

    /// Merge inspected records with empty ones for every other file.
    fn build_from_records(
        &self,
        files: &[FileEntry],
        records: &DashMap<String, MetadataRecord>,
        warnings: Vec<ScanWarning>,
        inspected: usize,
    ) -> Result<IndexOutcome, IndexError> {
        let normalizer = self.config.normalizer();
        let mut index = MetadataIndex::new();

        for file in files {
            let key = normalizer.normalize(&file.relative);
            if index.contains(&key) {
                continue;
            }
            let record = records
                .remove(&key)
                .map(|(_, record)| record)
                .unwrap_or_default();
            index.insert(key, record);
        }

        index.sort_naturally(self.config.collation);
        tracing::info!(
            entries = index.len(),
            inspected,
            failures = warnings.len(),
            "metadata index built"
        );

        Ok(IndexOutcome {
            index,
            warnings,
            inspected,
        })
    }
}
