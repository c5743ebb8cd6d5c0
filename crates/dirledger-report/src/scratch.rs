//! Interchange file between scanning and rendering.
//!
//! The document keeps the layout consumed by external sheet writers:
//!
//! ```json
//! {
//!   "root_folder": "Project",
//!   "folders": [{"A": ["a.txt", {"B": []}]}, {"error": "Permission denied"}],
//!   "files": ["r.docx"],
//!   "pdf_analysis_data": {"A/a.txt": {"pages": "", "size": ""}}
//! }
//! ```
//!
//! Folders are single-key maps, files are plain strings and an unreadable
//! folder carries an `{"error": ...}` item in its child list.
//!
//! Conversion in both directions walks the tree with an explicit stack, and
//! reading lifts serde_json's nesting limit, so folder depth is unbounded.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use dirledger_core::{Collation, MetadataIndex, TreeNode, order_children};

use crate::error::ScratchError;

/// One child in the interchange tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScratchItem {
    File(String),
    Error { error: String },
    Folder(IndexMap<String, Vec<ScratchItem>>),
}

/// Interchange document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScratchDocument {
    pub root_folder: String,
    pub folders: Vec<ScratchItem>,
    pub files: Vec<String>,
    pub pdf_analysis_data: MetadataIndex,
}

impl ScratchDocument {
    /// Capture a tree and its index.
    pub fn from_tree(root: &TreeNode, index: &MetadataIndex) -> Self {
        let mut folders = to_items(root.subfolders().collect());
        if let Some(error) = root.error() {
            folders.push(ScratchItem::Error {
                error: error.to_string(),
            });
        }

        Self {
            root_folder: root.name().to_string(),
            folders,
            files: root.files().map(|f| f.name().to_string()).collect(),
            pdf_analysis_data: index.clone(),
        }
    }

    /// Rebuild the tree and index, ordering children with `collation`.
    pub fn into_parts(self, collation: Collation) -> (TreeNode, MetadataIndex) {
        let mut items = self.folders;
        items.extend(self.files.into_iter().map(ScratchItem::File));
        let root = to_node(self.root_folder, items, collation);
        (root, self.pdf_analysis_data)
    }

    /// Decode a parsed document.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(mut fields) = value else {
            return Err(serde_json::Error::custom("scratch document must be an object"));
        };

        let root_folder = match fields.remove("root_folder") {
            Some(Value::String(name)) => name,
            _ => return Err(serde_json::Error::missing_field("root_folder")),
        };
        let folders = match fields.remove("folders") {
            Some(Value::Array(values)) => items_from_values(values)?,
            None | Some(Value::Null) => Vec::new(),
            Some(_) => return Err(serde_json::Error::custom("`folders` must be an array")),
        };
        let files = match fields.remove("files") {
            Some(value) => serde_json::from_value(value)?,
            None => Vec::new(),
        };
        let pdf_analysis_data = match fields.remove("pdf_analysis_data") {
            Some(value) => serde_json::from_value(value)?,
            None => MetadataIndex::new(),
        };

        Ok(Self {
            root_folder,
            folders,
            files,
            pdf_analysis_data,
        })
    }
}

impl<'de> Deserialize<'de> for ScratchDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

/// Interchange items for a list of sibling nodes.
fn to_items(nodes: Vec<&TreeNode>) -> Vec<ScratchItem> {
    struct Frame<'a> {
        name: &'a str,
        error: Option<&'a str>,
        rest: std::vec::IntoIter<&'a TreeNode>,
        items: Vec<ScratchItem>,
    }

    let mut stack = vec![Frame {
        name: "",
        error: None,
        rest: nodes.into_iter(),
        items: Vec::new(),
    }];

    loop {
        let top = stack.len() - 1;
        match stack[top].rest.next() {
            Some(node) if node.is_folder() => stack.push(Frame {
                name: node.name(),
                error: node.error(),
                rest: node.children().iter().collect::<Vec<_>>().into_iter(),
                items: Vec::with_capacity(node.children().len()),
            }),
            Some(node) => stack[top]
                .items
                .push(ScratchItem::File(node.name().to_string())),
            None => {
                let mut done = stack.remove(top);
                if let Some(error) = done.error {
                    done.items.push(ScratchItem::Error {
                        error: error.to_string(),
                    });
                }
                let Some(parent) = stack.last_mut() else {
                    return done.items;
                };
                let mut map = IndexMap::with_capacity(1);
                map.insert(done.name.to_string(), done.items);
                parent.items.push(ScratchItem::Folder(map));
            }
        }
    }
}

/// Single-key `{"error": "..."}` marker.
fn error_marker(map: &Map<String, Value>) -> Option<String> {
    match map.get("error") {
        Some(Value::String(error)) if map.len() == 1 => Some(error.clone()),
        _ => None,
    }
}

/// Decode child lists from parsed JSON.
///
/// A frame's `parent` is its owner's stack slot; sibling folders from one
/// multi-key map are pushed in reverse so they finish in document order.
fn items_from_values(values: Vec<Value>) -> Result<Vec<ScratchItem>, serde_json::Error> {
    struct Frame {
        name: String,
        rest: std::vec::IntoIter<Value>,
        items: Vec<ScratchItem>,
        parent: usize,
    }

    let mut stack = vec![Frame {
        name: String::new(),
        rest: values.into_iter(),
        items: Vec::new(),
        parent: 0,
    }];

    loop {
        let top = stack.len() - 1;
        match stack[top].rest.next() {
            Some(Value::String(file)) => stack[top].items.push(ScratchItem::File(file)),
            Some(Value::Object(map)) => {
                if let Some(error) = error_marker(&map) {
                    stack[top].items.push(ScratchItem::Error { error });
                    continue;
                }
                let mut folders = Vec::with_capacity(map.len());
                for (name, children) in map {
                    let Value::Array(children) = children else {
                        return Err(serde_json::Error::custom(format!(
                            "folder `{name}` must map to an array"
                        )));
                    };
                    folders.push(Frame {
                        name,
                        rest: children.into_iter(),
                        items: Vec::new(),
                        parent: top,
                    });
                }
                stack.extend(folders.into_iter().rev());
            }
            Some(_) => {
                return Err(serde_json::Error::custom(
                    "expected a file name or a folder map",
                ));
            }
            None => {
                let done = stack.remove(top);
                if stack.is_empty() {
                    return Ok(done.items);
                }
                let mut map = IndexMap::with_capacity(1);
                map.insert(done.name, done.items);
                stack[done.parent].items.push(ScratchItem::Folder(map));
            }
        }
    }
}

/// Rebuild a folder from interchange items, re-sorting every child list.
fn to_node(name: String, items: Vec<ScratchItem>, collation: Collation) -> TreeNode {
    struct Frame {
        name: String,
        rest: std::vec::IntoIter<ScratchItem>,
        children: Vec<TreeNode>,
        marker: Option<String>,
        parent: usize,
    }

    impl Frame {
        fn new(name: String, items: Vec<ScratchItem>, parent: usize) -> Self {
            Self {
                name,
                children: Vec::with_capacity(items.len()),
                rest: items.into_iter(),
                marker: None,
                parent,
            }
        }

        fn finish(mut self, collation: Collation) -> TreeNode {
            match self.marker {
                Some(error) => TreeNode::unreadable(self.name, error),
                None => {
                    order_children(&mut self.children, collation);
                    TreeNode::folder(self.name, self.children)
                }
            }
        }
    }

    let mut stack = vec![Frame::new(name, items, 0)];

    loop {
        let top = stack.len() - 1;
        match stack[top].rest.next() {
            Some(ScratchItem::File(file)) => stack[top].children.push(TreeNode::file(file)),
            Some(ScratchItem::Error { error }) => stack[top].marker = Some(error),
            Some(ScratchItem::Folder(map)) => {
                let folders: Vec<Frame> = map
                    .into_iter()
                    .map(|(folder, nested)| Frame::new(folder, nested, top))
                    .collect();
                stack.extend(folders.into_iter().rev());
            }
            None => {
                let done = stack.remove(top);
                let parent = done.parent;
                let node = done.finish(collation);
                if stack.is_empty() {
                    return node;
                }
                stack[parent].children.push(node);
            }
        }
    }
}

/// Directory holding timestamped interchange files.
#[derive(Debug, Clone)]
pub struct ScratchStore {
    dir: PathBuf,
}

impl ScratchStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a document as `inventory_structure_<YYYYmmdd_HHMMSS>.json`.
    pub fn write(&self, document: &ScratchDocument) -> Result<PathBuf, ScratchError> {
        fs::create_dir_all(&self.dir).map_err(|e| ScratchError::io(&self.dir, e))?;

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let mut path = self.dir.join(format!("inventory_structure_{timestamp}.json"));
        let mut attempt = 1;
        while path.exists() {
            path = self
                .dir
                .join(format!("inventory_structure_{timestamp}_{attempt}.json"));
            attempt += 1;
        }

        write_document(&path, document)?;
        tracing::debug!(path = %path.display(), "scratch file written");
        Ok(path)
    }

    /// Read a document back.
    pub fn read(path: &Path) -> Result<ScratchDocument, ScratchError> {
        let file = File::open(path).map_err(|e| ScratchError::io(path, e))?;
        let json_error = |source| ScratchError::Json {
            path: path.to_path_buf(),
            source,
        };

        let mut deserializer = serde_json::Deserializer::from_reader(BufReader::new(file));
        deserializer.disable_recursion_limit();
        let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))
            .map_err(json_error)?;
        deserializer.end().map_err(json_error)?;

        ScratchDocument::from_value(value).map_err(json_error)
    }

    /// Remove a scratch file; a missing file is not an error.
    pub fn remove(path: &Path) -> Result<(), ScratchError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ScratchError::io(path, e)),
        }
    }
}

/// Write a document to an explicit path.
pub fn write_document(path: &Path, document: &ScratchDocument) -> Result<(), ScratchError> {
    let file = File::create(path).map_err(|e| ScratchError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document).map_err(|source| ScratchError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| ScratchError::io(path, e))
}
