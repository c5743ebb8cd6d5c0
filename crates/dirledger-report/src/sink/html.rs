//! Standalone HTML table.

use std::io::Write;

use crate::error::SinkError;
use crate::flatten::FlatReport;
use crate::style::{self, RowStyle};

use super::{HEADER, ReportSink, Summary, row_cells};

/// Writes a self-contained HTML page with inline row colors.
pub struct HtmlSink<W> {
    out: W,
    title: String,
}

impl<W: Write> HtmlSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            title: "Hierarchy".to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_row(&mut self, cell_tag: &str, cells: &[String], style: RowStyle) -> std::io::Result<()> {
        let mut attrs = format!(" class=\"{}\"", style.class);
        if let Some(fill) = style.fill {
            attrs.push_str(&format!(" style=\"background-color:{}\"", fill.to_hex()));
        }

        write!(self.out, "<tr{attrs}>")?;
        for cell in cells {
            write!(self.out, "<{cell_tag}>{}</{cell_tag}>", escape(cell))?;
        }
        writeln!(self.out, "</tr>")
    }
}

impl<W: Write> ReportSink for HtmlSink<W> {
    fn name(&self) -> &'static str {
        "html"
    }

    fn write(&mut self, report: &FlatReport, summary: &Summary) -> Result<String, SinkError> {
        writeln!(self.out, "<!DOCTYPE html>")?;
        writeln!(self.out, "<html><head><meta charset=\"utf-8\">")?;
        writeln!(self.out, "<title>{}</title>", escape(&self.title))?;
        writeln!(
            self.out,
            "<style>td,th{{white-space:pre;padding:2px 8px;text-align:left}}.header{{font-weight:bold}}</style>"
        )?;
        writeln!(self.out, "</head><body><table>")?;

        let header: Vec<String> = HEADER.iter().map(|s| s.to_string()).collect();
        self.write_row("th", &header, style::header_style())?;
        for row in &report.rows {
            self.write_row("td", &row_cells(row), style::classify(row))?;
        }

        writeln!(self.out, "</table>")?;
        writeln!(
            self.out,
            "<p>{} items, {} folders, max level {}</p>",
            summary.total_items, summary.folders, summary.max_level
        )?;
        writeln!(self.out, "</body></html>")?;
        self.out.flush()?;

        Ok(format!("Hierarchy written as HTML ({} rows).", summary.total_items))
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::FlatRow;
    use dirledger_core::MetadataIndex;

    #[test]
    fn test_html_rows() {
        let mut report = FlatReport::default();
        report.rows.push(FlatRow::folder_header("R&D <draft>", 1));
        report.rows.push(FlatRow {
            label: "a.txt".into(),
            level: 2,
            ..FlatRow::default()
        });
        let summary = Summary::new(&report, &MetadataIndex::new());

        let mut sink = HtmlSink::new(Vec::new());
        sink.write(&report, &summary).unwrap();
        let html = String::from_utf8(sink.into_inner()).unwrap();

        let header = format!(
            "<tr class=\"header\" style=\"background-color:{}\"><th>Name</th>",
            crate::style::HEADER_FILL.to_hex()
        );
        assert!(html.contains(&header));
        assert!(html.contains("<td>  R&amp;D &lt;draft&gt;</td>"));
        assert!(html.contains("<tr class=\"file\"><td>    a.txt</td>"));
    }
}
