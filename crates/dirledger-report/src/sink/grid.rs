//! Spreadsheet grid update.
//!
//! Produces the payload a spreadsheet client applies to a fresh worksheet:
//! one value update for `A1:F{n}` followed by formatting requests. Folder
//! and separator rows are grouped per level, archive rows share one
//! request, and the header request comes last.

use std::collections::BTreeMap;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::SinkError;
use crate::flatten::FlatReport;
use crate::style::{self, ARCHIVE_HIGHLIGHT, HEADER_FILL, Rgb};

use super::{HEADER, ReportSink, Summary, row_cells};

const LAST_COLUMN: char = 'F';

/// Formatting applied to a set of ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatRequest {
    pub ranges: Vec<String>,
    pub background: Rgb,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
}

/// Complete worksheet update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridUpdate {
    pub worksheet: String,
    pub range: String,
    pub values: Vec<Vec<String>>,
    pub formats: Vec<FormatRequest>,
}

impl GridUpdate {
    /// Lay out a report under a worksheet title.
    pub fn build(title: impl Into<String>, report: &FlatReport) -> Self {
        let mut values = Vec::with_capacity(report.rows.len() + 1);
        values.push(HEADER.iter().map(|s| s.to_string()).collect());
        values.extend(report.rows.iter().map(|row| row_cells(row).to_vec()));

        let mut by_level: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        let mut archives = Vec::new();
        // Data rows start below the header on row 2.
        for (line, row) in (2..).zip(&report.rows) {
            if row.is_archive {
                archives.push(row_range(line));
            } else if row.is_separator || row.is_folder_header {
                by_level.entry(row.level).or_default().push(row_range(line));
            }
        }

        let mut formats: Vec<FormatRequest> = by_level
            .into_iter()
            .map(|(level, ranges)| FormatRequest {
                ranges,
                background: style::level_color(level),
                bold: false,
            })
            .collect();
        if !archives.is_empty() {
            formats.push(FormatRequest {
                ranges: archives,
                background: ARCHIVE_HIGHLIGHT,
                bold: false,
            });
        }
        formats.push(FormatRequest {
            ranges: vec![row_range(1)],
            background: HEADER_FILL,
            bold: true,
        });

        Self {
            worksheet: title.into(),
            range: format!("A1:{LAST_COLUMN}{}", values.len()),
            values,
            formats,
        }
    }
}

fn row_range(line: usize) -> String {
    format!("A{line}:{LAST_COLUMN}{line}")
}

/// Writes a [`GridUpdate`] as JSON for a spreadsheet client.
pub struct GridSink<W> {
    out: W,
    title: String,
}

impl<W: Write> GridSink<W> {
    /// Sink targeting a worksheet named `Hierarchy_<timestamp>`.
    pub fn new(out: W) -> Self {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        Self {
            out,
            title: format!("Hierarchy_{timestamp}"),
        }
    }

    /// Override the worksheet title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for GridSink<W> {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn write(&mut self, report: &FlatReport, _summary: &Summary) -> Result<String, SinkError> {
        let update = GridUpdate::build(self.title.clone(), report);
        serde_json::to_writer_pretty(&mut self.out, &update)?;
        writeln!(self.out)?;
        self.out.flush()?;

        Ok(format!("Hierarchy written to sheet '{}'.", self.title))
    }
}
