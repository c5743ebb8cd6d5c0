//! Per-file document metadata and the index keyed by normalized path.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::natural::{self, Collation};

/// Orientation of a document's first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOrientation {
    /// Width greater than height.
    Landscape,
    /// Height greater than or equal to width.
    Portrait,
    /// Dimensions could not be read.
    Unreadable(String),
}

impl PageOrientation {
    /// Classify a page by its dimensions.
    pub fn from_dimensions(width: f64, height: f64) -> Self {
        if width > height {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }
}

impl fmt::Display for PageOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Landscape => f.write_str("landscape"),
            Self::Portrait => f.write_str("portrait"),
            Self::Unreadable(reason) => write!(f, "Error: {reason}"),
        }
    }
}

impl FromStr for PageOrientation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "landscape" => Self::Landscape,
            "portrait" => Self::Portrait,
            other => Self::Unreadable(other.strip_prefix("Error: ").unwrap_or(other).to_string()),
        })
    }
}

/// Metadata gathered for one file. Every field is optional.
///
/// The serialized shape matches the scratch file: absent numbers and
/// orientations are written as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Page count.
    #[serde(default, with = "blank_number")]
    pub pages: Option<u64>,

    /// First-page orientation.
    #[serde(rename = "size", default, with = "blank_orientation")]
    pub page_orientation: Option<PageOrientation>,

    /// Text orientation tag.
    #[serde(rename = "orientation", default, skip_serializing_if = "Option::is_none")]
    pub text_orientation: Option<String>,

    /// Character count.
    #[serde(
        default,
        with = "blank_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub char_count: Option<u64>,
}

static EMPTY_RECORD: LazyLock<MetadataRecord> = LazyLock::new(MetadataRecord::default);

impl MetadataRecord {
    /// Record with only a page count.
    pub fn with_pages(pages: u64) -> Self {
        Self {
            pages: Some(pages),
            ..Self::default()
        }
    }

    /// Check if every field is absent.
    pub fn is_empty(&self) -> bool {
        self.pages.is_none()
            && self.page_orientation.is_none()
            && self.text_orientation.is_none()
            && self.char_count.is_none()
    }

    /// Page count as a display cell.
    pub fn pages_cell(&self) -> String {
        self.pages.map(|p| p.to_string()).unwrap_or_default()
    }

    /// Page orientation as a display cell.
    pub fn page_orientation_cell(&self) -> String {
        self.page_orientation
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Text orientation as a display cell.
    pub fn text_orientation_cell(&self) -> String {
        self.text_orientation.clone().unwrap_or_default()
    }

    /// Character count as a display cell.
    pub fn char_count_cell(&self) -> String {
        self.char_count.map(|c| c.to_string()).unwrap_or_default()
    }
}

/// Metadata records keyed by normalized relative path.
///
/// Looking up a path that is not present yields an empty record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataIndex {
    entries: IndexMap<String, MetadataRecord>,
}

impl MetadataIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for a path.
    pub fn insert(&mut self, path: impl Into<String>, record: MetadataRecord) {
        self.entries.insert(path.into(), record);
    }

    /// Get the record for a path, if present.
    pub fn get(&self, path: &str) -> Option<&MetadataRecord> {
        self.entries.get(path)
    }

    /// Get the record for a path, or an empty record when absent.
    pub fn lookup(&self, path: &str) -> &MetadataRecord {
        self.entries.get(path).unwrap_or(&EMPTY_RECORD)
    }

    /// Check if a path has an entry.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataRecord)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reorder entries by natural path order.
    pub fn sort_naturally(&mut self, collation: Collation) {
        self.entries
            .sort_by(|a, _, b, _| natural::compare_with(a, b, collation));
    }
}

impl FromIterator<(String, MetadataRecord)> for MetadataIndex {
    fn from_iter<I: IntoIterator<Item = (String, MetadataRecord)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Numbers that serialize as `""` when absent and accept either form back.
mod blank_number {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(n) => serializer.serialize_u64(*n),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Some(n)),
            Raw::Text(s) if s.trim().is_empty() => Ok(None),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Orientations that serialize as their display text, `""` when absent.
mod blank_orientation {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<PageOrientation>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(o) => serializer.collect_str(o),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<PageOrientation>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        let Ok(orientation) = raw.parse::<PageOrientation>();
        Ok(Some(orientation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_dimensions() {
        assert_eq!(PageOrientation::from_dimensions(842.0, 595.0), PageOrientation::Landscape);
        assert_eq!(PageOrientation::from_dimensions(595.0, 842.0), PageOrientation::Portrait);
        assert_eq!(PageOrientation::from_dimensions(500.0, 500.0), PageOrientation::Portrait);
    }

    #[test]
    fn test_orientation_display_and_parse() {
        let err = PageOrientation::Unreadable("no MediaBox".into());
        assert_eq!(err.to_string(), "Error: no MediaBox");
        assert_eq!("Error: no MediaBox".parse::<PageOrientation>(), Ok(err));
        assert_eq!("landscape".parse::<PageOrientation>(), Ok(PageOrientation::Landscape));
    }

    #[test]
    fn test_lookup_absent_is_empty() {
        let index = MetadataIndex::new();
        let record = index.lookup("missing.pdf");
        assert!(record.is_empty());
        assert_eq!(record.pages_cell(), "");
        assert_eq!(record.page_orientation_cell(), "");
    }

    #[test]
    fn test_present_empty_vs_absent() {
        let mut index = MetadataIndex::new();
        index.insert("notes.txt", MetadataRecord::default());
        assert!(index.contains("notes.txt"));
        assert!(!index.contains("other.txt"));
        assert_eq!(index.lookup("notes.txt"), index.lookup("other.txt"));
    }

    #[test]
    fn test_sort_naturally() {
        let mut index: MetadataIndex = ["b/10.pdf", "b/2.pdf", "a.pdf"]
            .into_iter()
            .map(|p| (p.to_string(), MetadataRecord::default()))
            .collect();
        index.sort_naturally(Collation::Alphabetic);
        let keys: Vec<&str> = index.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a.pdf", "b/2.pdf", "b/10.pdf"]);
    }
}
