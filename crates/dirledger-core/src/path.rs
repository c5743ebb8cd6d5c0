//! Relative path normalization and extension helpers.

use std::path::{Component, Path};

/// Builds the keys used by the metadata index.
///
/// A normalized path is relative to the scan root, uses `/` separators,
/// has no `.` segments or leading `./`, resolves `..` and preserves case.
/// When a strip prefix is configured, a leading segment sequence equal to
/// it is removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathNormalizer {
    strip_prefix: Option<String>,
}

impl PathNormalizer {
    /// Normalizer without prefix stripping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizer that elides `prefix` from the start of every path.
    pub fn with_strip_prefix(prefix: Option<&str>) -> Self {
        let strip_prefix = prefix
            .map(normalize_segments)
            .filter(|p| !p.is_empty());
        Self { strip_prefix }
    }

    /// The normalized prefix being stripped, if any.
    pub fn strip_prefix(&self) -> Option<&str> {
        self.strip_prefix.as_deref()
    }

    /// Normalize a relative path written with either separator.
    pub fn normalize(&self, relative: &str) -> String {
        let normalized = normalize_segments(relative);
        match &self.strip_prefix {
            Some(prefix) => match normalized.strip_prefix(prefix.as_str()) {
                Some(rest) if rest.starts_with('/') => rest[1..].to_string(),
                _ => normalized,
            },
            None => normalized,
        }
    }

    /// Normalize `path` relative to `root`. Returns `None` when `path` is
    /// not inside `root`.
    pub fn relative_to(&self, root: &Path, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(root).ok()?;
        let joined = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                Component::ParentDir => Some("..".to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");
        Some(self.normalize(&joined))
    }
}

fn normalize_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Join a normalized parent path and an entry name.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Lower-cased extension of a file name without the dot.
///
/// Dot-files such as `.bashrc` and names ending in a dot have no extension.
pub fn extension(name: &str) -> Option<String> {
    let stem_start = name.len() - name.trim_start_matches('.').len();
    let (_, ext) = name[stem_start..].rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

/// Check whether `name` has one of `extensions` (lower-case, no dot).
pub fn has_extension(name: &str, extensions: &[String]) -> bool {
    extension(name).is_some_and(|ext| extensions.iter().any(|e| *e == ext))
}
