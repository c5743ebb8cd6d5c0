//! Report sinks.
//!
//! A sink consumes the flattened rows and writes them somewhere: a plain
//! text table, a JSON envelope, a spreadsheet grid update or an HTML table.

mod grid;
mod html;
mod json;
mod text;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use dirledger_core::MetadataIndex;

use crate::error::{RenderFailure, SinkError};
use crate::flatten::{FlatReport, FlatRow};

pub use grid::{FormatRequest, GridSink, GridUpdate};
pub use html::HtmlSink;
pub use json::JsonSink;
pub use text::TextSink;

/// Column titles of the header row.
pub const HEADER: [&str; 6] = [
    "Name",
    "Level",
    "Page Count",
    "Page Orientation",
    "Text Orientation",
    "Characters",
];

/// Summary returned with every rendered report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_items: usize,
    pub folders: u64,
    pub max_level: u32,
    pub files_by_extension: IndexMap<String, u64>,
    pub metadata_index_snapshot: MetadataIndex,
}

impl Summary {
    /// Summarize a report.
    pub fn new(report: &FlatReport, index: &MetadataIndex) -> Self {
        Self {
            total_items: report.rows.len(),
            folders: report.stats.folder_count,
            max_level: report.stats.max_level,
            files_by_extension: report.stats.files_by_extension.clone(),
            metadata_index_snapshot: index.clone(),
        }
    }
}

/// A successfully rendered report.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub message: String,
    pub summary: Summary,
}

/// Something that can write a flattened report.
pub trait ReportSink {
    /// Short name used in log records.
    fn name(&self) -> &'static str;

    /// Write the report; returns a message describing where it went.
    fn write(&mut self, report: &FlatReport, summary: &Summary) -> Result<String, SinkError>;
}

/// Output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SinkFormat {
    #[default]
    Text,
    Json,
    Grid,
    Html,
}

impl SinkFormat {
    /// Create the sink for this format.
    pub fn sink<'w>(self, out: Box<dyn Write + 'w>, color: bool) -> Box<dyn ReportSink + 'w> {
        match self {
            Self::Text => Box::new(TextSink::new(out).with_color(color)),
            Self::Json => Box::new(JsonSink::new(out)),
            Self::Grid => Box::new(GridSink::new(out)),
            Self::Html => Box::new(HtmlSink::new(out)),
        }
    }
}

/// Open a buffered destination: the file at `path`, or stdout.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, SinkError> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| SinkError::Destination {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

/// Render a report through a sink.
///
/// On failure the already-computed report is handed back inside the error.
pub fn render(
    sink: &mut dyn ReportSink,
    report: FlatReport,
    index: &MetadataIndex,
) -> Result<Rendered, Box<RenderFailure>> {
    let summary = Summary::new(&report, index);

    match sink.write(&report, &summary) {
        Ok(message) => {
            tracing::info!(
                sink = sink.name(),
                rows = summary.total_items,
                folders = summary.folders,
                max_level = summary.max_level,
                "{message}"
            );
            Ok(Rendered { message, summary })
        }
        Err(error) => {
            tracing::error!(sink = sink.name(), "render failed: {error}");
            Err(Box::new(RenderFailure {
                sink: sink.name(),
                error,
                report,
                summary,
            }))
        }
    }
}

/// Display cells of a row: indented name, level (blank for separators),
/// then the four data columns.
pub fn row_cells(row: &FlatRow) -> [String; 6] {
    [
        format!("{}{}", "  ".repeat(row.level as usize), row.label),
        if row.is_separator {
            String::new()
        } else {
            row.level.to_string()
        },
        row.pages.clone(),
        row.page_size.clone(),
        row.text_orientation.clone(),
        row.char_count.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_cells() {
        let row = FlatRow {
            label: "b.pdf".into(),
            level: 2,
            pages: "4".into(),
            page_size: "portrait".into(),
            ..FlatRow::default()
        };
        assert_eq!(row_cells(&row)[0], "    b.pdf");
        assert_eq!(row_cells(&row)[1], "2");
        assert_eq!(row_cells(&FlatRow::separator(3))[1], "");
        assert_eq!(row_cells(&FlatRow::separator(3))[0], "      ");
    }

    #[cfg(feature = "clap")]
    #[test]
    fn test_format_values() {
        use clap::ValueEnum;

        assert_eq!(SinkFormat::from_str("grid", false).unwrap(), SinkFormat::Grid);
        assert_eq!(SinkFormat::from_str("HTML", true).unwrap(), SinkFormat::Html);
        assert!(SinkFormat::from_str("xls", true).is_err());
        assert_eq!(SinkFormat::value_variants().len(), 4);
    }

    struct FailingSink;

    impl ReportSink for FailingSink {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn write(&mut self, _: &FlatReport, _: &Summary) -> Result<String, SinkError> {
            Err(SinkError::Io(io::Error::other("disk full")))
        }
    }

    #[test]
    fn test_failure_keeps_report() {
        let report = FlatReport {
            rows: vec![FlatRow::folder_header("A", 1)],
            ..FlatReport::default()
        };
        let failure = render(&mut FailingSink, report.clone(), &MetadataIndex::new()).unwrap_err();
        assert_eq!(failure.report, report);
        assert_eq!(failure.summary.total_items, 1);
        assert!(failure.to_string().contains("disk full"));
    }
}
