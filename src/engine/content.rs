//! Page content streams and resources
//!
//! New drawing is appended as separate content streams. Edited pages always
//! get their own inline `/Contents`, `/Annots` and `/Resources` so pages
//! that shared those objects (duplicated pages, merged inputs) stay
//! independent.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::document::{Result, Rgb};

use super::pages::resolve;

/// Entries of an array-valued page key, following one level of reference
pub fn page_array(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Vec<Object>> {
    let page = doc.get_dictionary(page_id)?;
    let Ok(value) = page.get(key) else {
        return Ok(Vec::new());
    };
    match value {
        Object::Array(items) => Ok(items.clone()),
        Object::Reference(id) => match doc.get_object(*id)? {
            Object::Array(items) => Ok(items.clone()),
            // A single stream referenced directly
            _ => Ok(vec![Object::Reference(*id)]),
        },
        _ => Ok(Vec::new()),
    }
}

fn add_stream(doc: &mut Document, bytes: Vec<u8>) -> ObjectId {
    doc.add_object(Stream::new(Dictionary::new(), bytes))
}

/// Append drawing operations to a page
///
/// With `isolate`, the existing content is wrapped in `q`/`Q` first so a
/// graphics state it leaves behind cannot leak into the new operations.
pub fn append_operations(
    doc: &mut Document,
    page_id: ObjectId,
    operations: Vec<Operation>,
    isolate: bool,
) -> Result<()> {
    let encoded = Content { operations }.encode()?;
    let mut contents = page_array(doc, page_id, b"Contents")?;

    if isolate && !contents.is_empty() {
        let save = add_stream(doc, b"q\n".to_vec());
        let restore = add_stream(doc, b"Q\n".to_vec());
        contents.insert(0, Object::Reference(save));
        contents.push(Object::Reference(restore));
    }
    let added = add_stream(doc, encoded);
    contents.push(Object::Reference(added));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

fn inline_dictionary(doc: &Document, object: Option<&Object>) -> Dictionary {
    object
        .and_then(|o| resolve(doc, o).ok())
        .and_then(|o| o.as_dict().ok())
        .cloned()
        .unwrap_or_default()
}

/// Register `object_id` under `/Resources/<category>`, returning its name
pub fn add_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &str,
    prefix: &str,
    object_id: ObjectId,
) -> Result<String> {
    let page = doc.get_dictionary(page_id)?;
    let mut resources = inline_dictionary(doc, page.get(b"Resources").ok());
    let mut entries = inline_dictionary(doc, resources.get(category.as_bytes()).ok());

    // Reuse the name when the object is already registered
    let existing = entries.iter().find_map(|(name, value)| match value {
        Object::Reference(id) if *id == object_id => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    });
    let name = match existing {
        Some(name) => name,
        None => (1..)
            .map(|n| format!("{}{}", prefix, n))
            .find(|candidate| !entries.has(candidate.as_bytes()))
            .unwrap_or_else(|| prefix.to_string()),
    };

    entries.set(name.as_bytes(), Object::Reference(object_id));
    resources.set(category, Object::Dictionary(entries));
    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));
    Ok(name)
}

/// Append a reference to an array-valued page key
pub fn push_to_page_array(doc: &mut Document, page_id: ObjectId, key: &str, item: ObjectId) -> Result<()> {
    let mut items = page_array(doc, page_id, key.as_bytes())?;
    items.push(Object::Reference(item));
    doc.get_dictionary_mut(page_id)?
        .set(key, Object::Array(items));
    Ok(())
}

fn fill_color(color: Rgb) -> Operation {
    let [r, g, b] = color.components();
    Operation::new("rg", vec![r.into(), g.into(), b.into()])
}

/// Opaque filled rectangles, one color per rect, in user space
pub fn fill_rects(regions: &[([f32; 4], Rgb)]) -> Vec<Operation> {
    let mut ops = vec![Operation::new("q", vec![])];
    for ([x0, y0, x1, y1], color) in regions {
        ops.push(fill_color(*color));
        ops.push(Operation::new(
            "re",
            vec![(*x0).into(), (*y0).into(), (x1 - x0).into(), (y1 - y0).into()],
        ));
        ops.push(Operation::new("f", vec![]));
    }
    ops.push(Operation::new("Q", vec![]));
    ops
}

/// One line of text set with a full text matrix
#[derive(Debug, Clone)]
pub struct TextRun {
    pub matrix: [f32; 6],
    pub bytes: Vec<u8>,
    pub word_spacing: f32,
}

/// Text runs in a single font, size and color
pub fn text_runs(font: &str, size: f32, color: Rgb, runs: &[TextRun]) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("q", vec![]),
        fill_color(color),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), size.into()]),
    ];
    for run in runs {
        ops.push(Operation::new("Tw", vec![run.word_spacing.into()]));
        ops.push(Operation::new(
            "Tm",
            run.matrix.iter().map(|v| Object::Real(*v)).collect(),
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(run.bytes.clone(), StringFormat::Literal)],
        ));
    }
    ops.push(Operation::new("ET", vec![]));
    ops.push(Operation::new("Q", vec![]));
    ops
}

/// Paint an image XObject onto the unit square mapped by `matrix`
pub fn draw_xobject(name: &str, matrix: [f32; 6]) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new("cm", matrix.iter().map(|v| Object::Real(*v)).collect()),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}
