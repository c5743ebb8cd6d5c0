//! Row styling.
//!
//! Folder headers and separators take their fill from a fixed level
//! palette, clamped at the last entry for deep levels. Archive rows always
//! use the archive highlight. The column header row has its own bold style.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::flatten::FlatRow;

/// Fill color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Rgb {
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    /// Channels scaled to bytes.
    pub fn to_bytes(self) -> [u8; 3] {
        [self.red, self.green, self.blue].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// CSS hex notation, e.g. `#e6e680`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Level palette, indexed by `min(level, PALETTE.len() - 1)`.
pub const PALETTE: [Rgb; 10] = [
    Rgb::new(0.9, 0.9, 0.5),
    Rgb::new(0.7, 0.9, 0.7),
    Rgb::new(0.6, 0.8, 0.9),
    Rgb::new(0.9, 0.7, 0.7),
    Rgb::new(0.8, 0.8, 0.8),
    Rgb::new(0.9, 0.8, 0.6),
    Rgb::new(0.7, 0.7, 0.9),
    Rgb::new(0.8, 0.9, 0.6),
    Rgb::new(0.9, 0.6, 0.9),
    Rgb::new(0.6, 0.9, 0.8),
];

/// Fill for archive rows.
pub const ARCHIVE_HIGHLIGHT: Rgb = Rgb::new(1.0, 1.0, 0.0);

/// Fill for the column header row.
pub const HEADER_FILL: Rgb = Rgb::new(0.7, 0.7, 0.7);

/// How a row is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PresentationClass {
    /// The column header row.
    Header,
    FolderHeader,
    Separator,
    Archive,
    File,
}

/// Resolved style of one row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowStyle {
    pub class: PresentationClass,
    pub color_index: usize,
    pub fill: Option<Rgb>,
    pub bold: bool,
}

/// Palette slot for a level.
pub fn color_index(level: u32) -> usize {
    (level as usize).min(PALETTE.len() - 1)
}

/// Fill for a level.
pub fn level_color(level: u32) -> Rgb {
    PALETTE[color_index(level)]
}

/// Style a data row.
pub fn classify(row: &FlatRow) -> RowStyle {
    let color_index = color_index(row.level);
    let (class, fill) = if row.is_archive {
        (PresentationClass::Archive, Some(ARCHIVE_HIGHLIGHT))
    } else if row.is_folder_header {
        (PresentationClass::FolderHeader, Some(PALETTE[color_index]))
    } else if row.is_separator {
        (PresentationClass::Separator, Some(PALETTE[color_index]))
    } else {
        (PresentationClass::File, None)
    };

    RowStyle {
        class,
        color_index,
        fill,
        bold: false,
    }
}

/// Style of the column header row.
pub fn header_style() -> RowStyle {
    RowStyle {
        class: PresentationClass::Header,
        color_index: 0,
        fill: Some(HEADER_FILL),
        bold: true,
    }
}
