//! Listing backends for the tree builder.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use compact_str::CompactString;

use dirledger_core::{IgnoreSet, ScanError};

use crate::visited::VisitedDirs;

/// One entry returned by a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Entry name.
    pub name: CompactString,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl SourceEntry {
    /// Create a directory entry.
    pub fn dir(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }

    /// Create a file entry.
    pub fn file(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }
}

/// Something that can list directories by path relative to its root.
///
/// The empty path names the root itself.
pub trait TreeSource {
    /// Display name of the root folder.
    fn root_name(&self) -> String;

    /// Absolute location of the root.
    fn root_path(&self) -> &Path;

    /// List a directory; fails with `PermissionDenied` or `NotFound`.
    fn list(&self, dir: &Path) -> Result<Vec<SourceEntry>, ScanError>;
}

/// Live filesystem source.
///
/// Symlinks are listed as plain entries unless following is enabled. When
/// it is, a link is descended only if its target directory has not been
/// seen yet, so link cycles end after one lap.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
    follow_symlinks: bool,
    visited: VisitedDirs,
}

impl FsSource {
    /// Open a directory root.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, ScanError> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .map_err(|e| ScanError::invalid_root(root, e.to_string()))?;

        if !root.is_dir() {
            return Err(ScanError::invalid_root(root, "not a directory"));
        }

        let visited = VisitedDirs::new();
        visited.track(root.clone());
        Ok(Self {
            root,
            follow_symlinks: false,
            visited,
        })
    }

    /// Descend into symlinked directories.
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Whether a symlink entry should be listed as a directory.
    fn descend_link(&self, link: &Path) -> bool {
        if !self.follow_symlinks {
            return false;
        }
        match link.canonicalize() {
            Ok(target) if target.is_dir() => {
                let first = self.visited.track(target);
                if !first {
                    tracing::debug!(link = %link.display(), "symlink target already visited");
                }
                first
            }
            _ => false,
        }
    }
}

impl TreeSource for FsSource {
    fn root_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.to_string_lossy().into_owned())
    }

    fn root_path(&self) -> &Path {
        &self.root
    }

    fn list(&self, dir: &Path) -> Result<Vec<SourceEntry>, ScanError> {
        let path = self.root.join(dir);
        let read_dir = std::fs::read_dir(&path).map_err(|e| ScanError::io(&path, e))?;
        if self.follow_symlinks {
            if let Ok(real) = path.canonicalize() {
                self.visited.track(real);
            }
        }

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| ScanError::io(&path, e))?;
            let file_type = entry.file_type().map_err(|e| ScanError::io(entry.path(), e))?;

            let is_dir = if file_type.is_symlink() {
                self.descend_link(&entry.path())
            } else {
                file_type.is_dir()
            };

            entries.push(SourceEntry {
                name: entry.file_name().to_string_lossy().as_ref().into(),
                is_dir,
            });
        }

        Ok(entries)
    }
}

/// Zip archive source. Folders are inferred from entry paths, so folders
/// without any kept file do not appear.
#[derive(Debug, Clone)]
pub struct ZipSource {
    path: PathBuf,
    listings: BTreeMap<String, Vec<SourceEntry>>,
}

impl ZipSource {
    /// Read the archive's central directory.
    pub fn open(path: impl AsRef<Path>, ignore: &IgnoreSet) -> Result<Self, ScanError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(ScanError::invalid_root(&path, "archive not found"));
        }

        let file = File::open(&path).map_err(|e| ScanError::io(&path, e))?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| ScanError::Archive {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let mut names = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i).map_err(|e| ScanError::Archive {
                path: path.clone(),
                message: e.to_string(),
            })?;
            if !entry.is_dir() {
                names.push(entry.name().replace('\\', "/"));
            }
        }

        Ok(Self {
            listings: build_listings(&names, ignore),
            path,
        })
    }

    /// Build a source from entry names (used for archives already in memory).
    pub fn from_names(path: impl Into<PathBuf>, names: &[String], ignore: &IgnoreSet) -> Self {
        Self {
            path: path.into(),
            listings: build_listings(names, ignore),
        }
    }
}

fn build_listings(names: &[String], ignore: &IgnoreSet) -> BTreeMap<String, Vec<SourceEntry>> {
    let mut listings: BTreeMap<String, Vec<SourceEntry>> = BTreeMap::new();
    listings.entry(String::new()).or_default();

    for name in names {
        let parts: Vec<&str> = name.split('/').filter(|p| !p.is_empty()).collect();
        let Some((file, dirs)) = parts.split_last() else {
            continue;
        };
        if ignore.is_ignored(file) {
            continue;
        }

        let mut parent = String::new();
        for dir in dirs {
            let listing = listings.entry(parent.clone()).or_default();
            if !listing.iter().any(|e| e.is_dir && e.name == *dir) {
                listing.push(SourceEntry::dir(*dir));
            }
            parent = dirledger_core::path::join(&parent, dir);
            listings.entry(parent.clone()).or_default();
        }

        let listing = listings.entry(parent).or_default();
        if !listing.iter().any(|e| !e.is_dir && e.name == *file) {
            listing.push(SourceEntry::file(*file));
        }
    }

    listings
}

impl TreeSource for ZipSource {
    fn root_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn root_path(&self) -> &Path {
        &self.path
    }

    fn list(&self, dir: &Path) -> Result<Vec<SourceEntry>, ScanError> {
        let key = dir
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        self.listings
            .get(&key)
            .cloned()
            .ok_or_else(|| ScanError::NotFound {
                path: self.path.join(dir),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fs_source_rejects_missing_root() {
        let err = FsSource::open("/definitely/not/here").unwrap_err();
        assert!(matches!(err, ScanError::InvalidRoot { .. }));
    }

    #[test]
    fn test_fs_source_rejects_file_root() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        fs::write(&file, "x").unwrap();

        let err = FsSource::open(&file).unwrap_err();
        assert!(matches!(err, ScanError::InvalidRoot { .. }));
    }

    #[test]
    fn test_fs_source_lists_entries() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("a.txt"), "x").unwrap();

        let source = FsSource::open(temp.path()).unwrap();
        let mut entries = source.list(Path::new("")).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(
            entries,
            vec![SourceEntry::file("a.txt"), SourceEntry::dir("sub")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_is_listed_once() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        std::os::unix::fs::symlink(temp.path(), temp.path().join("sub/up")).unwrap();

        let plain = FsSource::open(temp.path()).unwrap();
        assert_eq!(
            plain.list(Path::new("sub")).unwrap(),
            vec![SourceEntry::file("up")]
        );

        let following = FsSource::open(temp.path()).unwrap().follow_symlinks(true);
        following.list(Path::new("")).unwrap();
        // The link points back at the already listed root.
        assert_eq!(
            following.list(Path::new("sub")).unwrap(),
            vec![SourceEntry::file("up")]
        );
    }

    #[test]
    fn test_zip_listings_infer_folders() {
        let names = vec![
            "docs/a.pdf".to_string(),
            "docs/inner/b.pdf".to_string(),
            "cache.db".to_string(),
            "only_db/x.db".to_string(),
            "top.txt".to_string(),
        ];
        let ignore = IgnoreSet::new(&["*.db".to_string()]).unwrap();
        let source = ZipSource::from_names("/tmp/pack.zip", &names, &ignore);

        assert_eq!(source.root_name(), "pack.zip");
        assert_eq!(
            source.list(Path::new("")).unwrap(),
            vec![SourceEntry::dir("docs"), SourceEntry::file("top.txt")]
        );
        assert_eq!(
            source.list(Path::new("docs")).unwrap(),
            vec![SourceEntry::file("a.pdf"), SourceEntry::dir("inner")]
        );
        assert!(source.list(Path::new("only_db")).is_err());
    }
}
