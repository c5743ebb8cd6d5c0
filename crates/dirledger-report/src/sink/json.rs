//! JSON envelope.

use std::io::Write;

use serde::Serialize;

use crate::error::SinkError;
use crate::flatten::FlatReport;
use crate::style::{self, PresentationClass};

use super::{HEADER, ReportSink, Summary, row_cells};

#[derive(Serialize)]
struct Envelope<'a> {
    header: [&'static str; 6],
    rows: Vec<JsonRow>,
    summary: &'a Summary,
}

#[derive(Serialize)]
struct JsonRow {
    cells: [String; 6],
    level: u32,
    class: PresentationClass,
    fill: Option<String>,
}

/// Writes header, styled rows and summary as one pretty-printed document.
pub struct JsonSink<W> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn name(&self) -> &'static str {
        "json"
    }

    fn write(&mut self, report: &FlatReport, summary: &Summary) -> Result<String, SinkError> {
        let rows = report
            .rows
            .iter()
            .map(|row| {
                let style = style::classify(row);
                JsonRow {
                    cells: row_cells(row),
                    level: row.level,
                    class: style.class,
                    fill: style.fill.map(|c| c.to_hex()),
                }
            })
            .collect();

        let envelope = Envelope {
            header: HEADER,
            rows,
            summary,
        };
        serde_json::to_writer_pretty(&mut self.out, &envelope)?;
        writeln!(self.out)?;
        self.out.flush()?;

        Ok(format!("Hierarchy written as JSON ({} rows).", summary.total_items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::FlatRow;
    use dirledger_core::MetadataIndex;

    #[test]
    fn test_envelope_shape() {
        let mut report = FlatReport::default();
        report.rows.push(FlatRow::folder_header("A", 1));
        report.rows.push(FlatRow {
            label: "x.zip".into(),
            level: 2,
            is_archive: true,
            ..FlatRow::default()
        });
        let summary = Summary::new(&report, &MetadataIndex::new());

        let mut sink = JsonSink::new(Vec::new());
        sink.write(&report, &summary).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&sink.into_inner()).unwrap();

        assert_eq!(value["header"][0], "Name");
        assert_eq!(value["rows"][0]["class"], "folder_header");
        assert_eq!(value["rows"][1]["class"], "archive");
        assert_eq!(value["rows"][1]["fill"], "#ffff00");
        assert_eq!(value["rows"][1]["cells"][0], "    x.zip");
        assert_eq!(value["summary"]["total_items"], 2);
    }
}
