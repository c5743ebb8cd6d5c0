//! PDF page count and first-page orientation.

use std::path::Path;

use dirledger_core::PageOrientation;
use lopdf::{Document, Object, ObjectId};

use crate::error::InspectError;
use crate::inspector::DocumentFacts;

/// Page tree depth after which `Parent` links are assumed to be cyclic.
const MAX_PARENT_HOPS: usize = 64;

/// Read the page count and the orientation of the first page.
///
/// A document whose page size cannot be determined still reports its page
/// count; the orientation then carries the reason.
pub(crate) fn inspect(path: &Path) -> Result<DocumentFacts, InspectError> {
    let doc = Document::load(path).map_err(|e| InspectError::Pdf {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let pages = doc.get_pages();
    let orientation = match pages.values().next() {
        Some(&page) => match media_box(&doc, page) {
            Ok((width, height)) => PageOrientation::from_dimensions(width, height),
            Err(reason) => PageOrientation::Unreadable(reason),
        },
        None => PageOrientation::Unreadable("Unable to get size".to_string()),
    };

    Ok(DocumentFacts {
        pages: pages.len() as u64,
        orientation: Some(orientation),
        ..DocumentFacts::default()
    })
}

/// Width and height of a page, following inherited `MediaBox` entries.
fn media_box(doc: &Document, page: ObjectId) -> Result<(f64, f64), String> {
    let mut current = Some(page);
    let mut hops = 0;

    while let Some(id) = current {
        let dict = doc.get_dictionary(id).map_err(|e| e.to_string())?;
        if let Ok(value) = dict.get(b"MediaBox") {
            return dimensions(doc, value);
        }

        hops += 1;
        if hops > MAX_PARENT_HOPS {
            break;
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Err("Unable to get size".to_string())
}

fn dimensions(doc: &Document, value: &Object) -> Result<(f64, f64), String> {
    let array = resolve(doc, value)?.as_array().map_err(|e| e.to_string())?;
    if array.len() != 4 {
        return Err(format!("MediaBox has {} entries", array.len()));
    }

    let mut rect = [0.0f64; 4];
    for (slot, item) in rect.iter_mut().zip(array) {
        *slot = number(resolve(doc, item)?)?;
    }

    Ok(((rect[2] - rect[0]).abs(), (rect[3] - rect[1]).abs()))
}

fn resolve<'a>(doc: &'a Document, value: &'a Object) -> Result<&'a Object, String> {
    match value {
        Object::Reference(id) => doc.get_object(*id).map_err(|e| e.to_string()),
        other => Ok(other),
    }
}

fn number(value: &Object) -> Result<f64, String> {
    match value {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(r) => Ok(f64::from(*r)),
        other => Err(format!("MediaBox entry is not a number: {other:?}")),
    }
}
