//! Office Open XML packages (DOCX, XLSX).
//!
//! DOCX counts come from the extended properties part and the section
//! properties of the body; XLSX workbooks are opened with calamine.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Reader, Xlsx, open_workbook};
use roxmltree::{Document, Node};
use zip::ZipArchive;

use crate::error::InspectError;
use crate::inspector::DocumentFacts;

const APP_PROPERTIES: &str = "docProps/app.xml";
const DOCUMENT_BODY: &str = "word/document.xml";

/// Pages and characters from the extended properties, text orientation
/// from the last section of the body.
pub(crate) fn inspect_docx(path: &Path) -> Result<DocumentFacts, InspectError> {
    let mut archive = open(path)?;
    let app_xml = read_part(&mut archive, path, APP_PROPERTIES)?;
    let app = Document::parse(&app_xml).map_err(|e| InspectError::package(path, e))?;

    let pages = property(&app, "Pages").unwrap_or(0);
    let char_count = property(&app, "Characters");

    let text_orientation = read_part(&mut archive, path, DOCUMENT_BODY)
        .ok()
        .and_then(|body| section_orientation(&body));

    Ok(DocumentFacts {
        pages,
        orientation: None,
        text_orientation,
        char_count,
    })
}

/// Worksheet count stands in for the page count.
pub(crate) fn inspect_xlsx(path: &Path) -> Result<DocumentFacts, InspectError> {
    let workbook: Xlsx<_> = open_workbook(path).map_err(|e| InspectError::package(path, e))?;

    Ok(DocumentFacts {
        pages: workbook.sheet_names().len() as u64,
        ..DocumentFacts::default()
    })
}

fn open(path: &Path) -> Result<ZipArchive<File>, InspectError> {
    let file = File::open(path).map_err(|e| InspectError::open(path, e))?;
    ZipArchive::new(file).map_err(|e| InspectError::package(path, e))
}

fn read_part(
    archive: &mut ZipArchive<File>,
    path: &Path,
    part: &str,
) -> Result<String, InspectError> {
    let mut entry = archive.by_name(part).map_err(|_| InspectError::MissingPart {
        path: path.to_path_buf(),
        part: part.to_string(),
    })?;

    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|e| InspectError::package(path, e))?;
    Ok(text)
}

/// Numeric child of the properties root, matched by local name.
fn property(doc: &Document, name: &str) -> Option<u64> {
    doc.root_element()
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
        .and_then(|n| n.text())
        .and_then(|text| text.trim().parse().ok())
}

/// Orientation of the last `pgSz` element: explicit `orient`, else by size.
fn section_orientation(xml: &str) -> Option<String> {
    let doc = Document::parse(xml).ok()?;
    let page_size = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "pgSz")
        .last()?;

    if let Some(orient) = attribute(page_size, "orient") {
        return Some(orient.to_string());
    }

    let width: f64 = attribute(page_size, "w")?.parse().ok()?;
    let height: f64 = attribute(page_size, "h")?.parse().ok()?;
    let orientation = if width > height { "landscape" } else { "portrait" };
    Some(orientation.to_string())
}

/// Attribute value by local name, whatever namespace it is bound to.
fn attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|attr| attr.name() == name)
        .map(|attr| attr.value())
}
