//! Folder and file nodes.

use std::cmp::Ordering;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::natural::{self, Collation};

/// A single folder or file in the scanned tree.
///
/// Within a folder's `children`, every folder precedes every file and each
/// group is in natural order. Use [`order_children`] to restore that
/// invariant after building a child list by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Directory (or archive directory).
    Folder {
        /// Folder name (not full path).
        name: CompactString,
        /// Ordered children.
        children: Vec<TreeNode>,
        /// Set when the folder could not be listed; `children` is then empty.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<CompactString>,
    },
    /// Regular file.
    File {
        /// File name (not full path).
        name: CompactString,
    },
}

impl TreeNode {
    /// Create a folder node with the given children, kept as passed.
    pub fn folder(name: impl Into<CompactString>, children: Vec<TreeNode>) -> Self {
        Self::Folder {
            name: name.into(),
            children,
            error: None,
        }
    }

    /// Create a folder node whose listing failed.
    pub fn unreadable(name: impl Into<CompactString>, error: impl Into<CompactString>) -> Self {
        Self::Folder {
            name: name.into(),
            children: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Create a file node.
    pub fn file(name: impl Into<CompactString>) -> Self {
        Self::File { name: name.into() }
    }

    /// Name of this node.
    pub fn name(&self) -> &str {
        match self {
            Self::Folder { name, .. } | Self::File { name } => name.as_str(),
        }
    }

    /// Check if this node is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder { .. })
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// Children of a folder; empty for files.
    pub fn children(&self) -> &[TreeNode] {
        match self {
            Self::Folder { children, .. } => children.as_slice(),
            Self::File { .. } => &[],
        }
    }

    /// Listing error attached to a folder, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Folder { error, .. } => error.as_deref(),
            Self::File { .. } => None,
        }
    }

    /// Direct sub-folders, in order.
    pub fn subfolders(&self) -> impl Iterator<Item = &TreeNode> {
        self.children().iter().filter(|c| c.is_folder())
    }

    /// Direct files, in order.
    pub fn files(&self) -> impl Iterator<Item = &TreeNode> {
        self.children().iter().filter(|c| c.is_file())
    }

    /// Number of folders in this subtree, including this node when it is one.
    pub fn folder_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_folder() {
                count += 1;
                stack.extend(node.children());
            }
        }
        count
    }

    /// Number of files in this subtree.
    pub fn file_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Self::File { .. } => count += 1,
                Self::Folder { children, .. } => stack.extend(children),
            }
        }
        count
    }
}

impl Drop for TreeNode {
    // Unlink descendants onto a heap stack so deep trees drop without
    // recursing once per level.
    fn drop(&mut self) {
        let Self::Folder { children, .. } = self else {
            return;
        };
        let mut stack = std::mem::take(children);
        while let Some(mut node) = stack.pop() {
            if let Self::Folder { children, .. } = &mut node {
                stack.append(children);
            }
        }
    }
}

/// Put folders ahead of files and sort each group naturally.
pub fn order_children(children: &mut [TreeNode], collation: Collation) {
    children.sort_by(|a, b| match (a.is_folder(), b.is_folder()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => natural::compare_with(a.name(), b.name(), collation),
    });
}
