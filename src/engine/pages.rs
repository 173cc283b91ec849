//! Page tree handling
//!
//! Documents are edited as a flat, in-memory list of page object ids. The
//! catalog's page tree is rewritten from that list before serialization, so
//! inherited page attributes are copied onto each page when it is loaded.

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::document::{OperationError, Result};

use super::geometry::PageFrame;

/// Attributes a page may inherit from its ancestors
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `/Parent` chains
const MAX_TREE_DEPTH: usize = 32;

/// US Letter, used when no media box is found
pub const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Read an integer or real
pub fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Follow a reference, returning the object itself otherwise
pub fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object> {
    match object {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// `/Type` of a dictionary or stream
pub fn object_type(object: &Object) -> Option<&[u8]> {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return None,
    };
    dict.get(b"Type").ok().and_then(|t| t.as_name().ok())
}

/// Page ids in document order
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

fn inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

/// Copy inherited attributes onto the page itself
pub fn materialize_inherited(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let page = doc.get_dictionary(page_id)?;
    let missing: Vec<(&[u8], Object)> = INHERITABLE
        .iter()
        .filter(|key| !page.has(key))
        .filter_map(|key| inherited(doc, page, key).map(|value| (*key, value)))
        .collect();
    let needs_media_box = !page.has(b"MediaBox") && !missing.iter().any(|(k, _)| *k == b"MediaBox");

    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in missing {
        page.set(key, value);
    }
    if needs_media_box {
        page.set(
            "MediaBox",
            Object::Array(DEFAULT_MEDIA_BOX.iter().map(|v| Object::Real(*v)).collect()),
        );
    }
    Ok(())
}

fn read_box(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<[f32; 4]> {
    let value = resolve(doc, page.get(key).ok()?).ok()?;
    let values: Vec<f32> = value
        .as_array()
        .ok()?
        .iter()
        .filter_map(|v| resolve(doc, v).ok().and_then(number))
        .collect();
    match values[..] {
        [x0, y0, x1, y1] => Some([x0, y0, x1, y1]),
        _ => None,
    }
}

/// Visible box and rotation of a page
pub fn page_frame(doc: &Document, page_id: ObjectId) -> Result<PageFrame> {
    let page = doc.get_dictionary(page_id)?;
    let bbox = read_box(doc, page, b"CropBox")
        .or_else(|| read_box(doc, page, b"MediaBox"))
        .unwrap_or(DEFAULT_MEDIA_BOX);
    let rotate = page
        .get(b"Rotate")
        .ok()
        .and_then(|r| resolve(doc, r).ok())
        .and_then(number)
        .unwrap_or(0.0);
    Ok(PageFrame::new(bbox, rotate as i64))
}

fn root_pages_id(doc: &Document) -> Result<ObjectId> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| OperationError::Engine("trailer has no Root reference".to_string()))?;
    doc.get_dictionary(catalog_id)?
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| OperationError::Engine("catalog has no Pages reference".to_string()))
}

/// Point the root page tree node at exactly `pages`, in order
pub fn rebuild_page_tree(doc: &mut Document, pages: &[ObjectId]) -> Result<()> {
    let pages_id = root_pages_id(doc)?;

    let root = doc.get_dictionary_mut(pages_id)?;
    root.set(
        "Kids",
        Object::Array(pages.iter().map(|id| Object::Reference(*id)).collect()),
    );
    root.set("Count", pages.len() as i64);
    // Attributes are materialized on every page
    for key in INHERITABLE {
        root.remove(key);
    }

    for page_id in pages {
        doc.get_dictionary_mut(*page_id)?
            .set("Parent", Object::Reference(pages_id));
    }
    Ok(())
}

/// A document with an empty page tree
pub fn empty_document() -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(Vec::new())),
        ("Count", Object::Integer(0)),
    ]));
    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}
