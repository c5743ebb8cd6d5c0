//! Plain text table.

use std::io::Write;

use comfy_table::Table;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use itertools::Itertools;
use owo_colors::OwoColorize;

use crate::error::SinkError;
use crate::flatten::FlatReport;
use crate::style::{self, RowStyle};

use super::{HEADER, ReportSink, Summary, row_cells};

/// Writes an aligned text table, optionally with ANSI truecolor fills.
pub struct TextSink<W> {
    out: W,
    color: bool,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, color: false }
    }

    /// Paint row fills with ANSI escape codes.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn cells<'a>(&self, cells: impl IntoIterator<Item = &'a str>, style: RowStyle) -> Vec<String> {
        cells
            .into_iter()
            .map(|cell| {
                if self.color {
                    paint(cell, style)
                } else {
                    cell.to_string()
                }
            })
            .collect()
    }

    fn table(&self, report: &FlatReport) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(self.cells(HEADER, style::header_style()));

        for row in &report.rows {
            let cells = row_cells(row);
            table.add_row(self.cells(cells.iter().map(String::as_str), style::classify(row)));
        }
        table
    }
}

impl<W: Write> ReportSink for TextSink<W> {
    fn name(&self) -> &'static str {
        "text"
    }

    fn write(&mut self, report: &FlatReport, summary: &Summary) -> Result<String, SinkError> {
        let table = self.table(report);
        writeln!(self.out, "{table}")?;

        writeln!(self.out)?;
        writeln!(
            self.out,
            "{} items, {} folders, max level {}",
            summary.total_items, summary.folders, summary.max_level
        )?;
        if !summary.files_by_extension.is_empty() {
            let by_ext = summary
                .files_by_extension
                .iter()
                .map(|(ext, count)| format!("{ext}: {count}"))
                .join(", ");
            writeln!(self.out, "Files by extension: {by_ext}")?;
        }
        self.out.flush()?;

        Ok(format!("Hierarchy written as text ({} rows).", summary.total_items))
    }
}

/// Apply a row style to one cell: dark text on the fill, bold for headers.
fn paint(cell: &str, style: RowStyle) -> String {
    let cell = match style.fill {
        Some(fill) => {
            let [r, g, b] = fill.to_bytes();
            cell.black().on_truecolor(r, g, b).to_string()
        }
        None => cell.to_string(),
    };
    if style.bold {
        cell.bold().to_string()
    } else {
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::FlatRow;
    use dirledger_core::MetadataIndex;

    fn report() -> FlatReport {
        let mut report = FlatReport::default();
        report.rows.push(FlatRow::folder_header("A", 1));
        report.rows.push(FlatRow {
            label: "a.pdf".into(),
            level: 2,
            pages: "3".into(),
            ..FlatRow::default()
        });
        report.stats.record_folder(1);
        report.stats.record_file("a.pdf");
        report
    }

    fn line_index(lines: &[&str], needle: &str) -> usize {
        lines.iter().position(|l| l.contains(needle)).unwrap()
    }

    #[test]
    fn test_plain_table() {
        let report = report();
        let summary = Summary::new(&report, &MetadataIndex::new());
        let mut sink = TextSink::new(Vec::new());
        let message = sink.write(&report, &summary).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        let header = line_index(&lines, "Page Orientation");
        let folder = line_index(&lines, "  A ");
        let file = line_index(&lines, "    a.pdf");
        assert!(header < folder && folder < file);
        assert!(lines[header].contains("Name"));
        assert!(lines[file].contains(" 2 "));
        assert!(lines[file].contains(" 3 "));
        assert!(text.contains("Files by extension: .pdf: 1"));
        assert!(!text.contains('\x1b'));
        assert!(message.contains("2 rows"));
    }

    #[test]
    fn test_colored_table() {
        let report = report();
        let summary = Summary::new(&report, &MetadataIndex::new());
        let mut sink = TextSink::new(Vec::new()).with_color(true);
        sink.write(&report, &summary).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        let header = lines[line_index(&lines, "Name")];
        assert!(header.contains("\x1b[1m"));
        let [r, g, b] = style::HEADER_FILL.to_bytes();
        assert!(header.contains(&format!("\x1b[48;2;{r};{g};{b}m")));

        let folder = lines[line_index(&lines, "  A")];
        let [r, g, b] = style::PALETTE[1].to_bytes();
        assert!(folder.contains(&format!("\x1b[48;2;{r};{g};{b}m")));
        assert!(!lines[line_index(&lines, "a.pdf")].contains("\x1b[48;2"));
    }

    #[test]
    fn test_paint() {
        let plain = style::classify(&FlatRow {
            label: "x.txt".into(),
            level: 1,
            ..FlatRow::default()
        });
        assert_eq!(paint("x.txt", plain), "x.txt");
        assert_ne!(paint("Name", style::header_style()), "Name");
    }
}
