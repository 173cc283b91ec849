//! Generated PDFs for engine tests

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat};

/// One page of a generated document
#[derive(Debug, Clone)]
pub struct FixturePage {
    pub width: f32,
    pub height: f32,
    pub rotate: i64,
    /// Lines of 12pt Helvetica starting 72pt from the top-left corner
    pub lines: Vec<String>,
}

impl FixturePage {
    pub fn new(width: f32, lines: &[&str]) -> Self {
        Self {
            width,
            height: 792.0,
            rotate: 0,
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn rotated(mut self, rotate: i64) -> Self {
        self.rotate = rotate;
        self
    }
}

/// Displayed top of line `n` on an unrotated fixture page
pub fn line_top(n: usize) -> f32 {
    72.0 + n as f32 * 20.0 - 12.0
}

/// Serialize a document with a Helvetica font shared by every page
pub fn build_pdf(pages: &[FixturePage], title: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]));
    let resources_id = doc.add_object(Dictionary::from_iter([(
        "Font",
        Object::Dictionary(Dictionary::from_iter([("F1", Object::Reference(font_id))])),
    )]));

    let mut kids = Vec::new();
    for page in pages {
        let mut operations = Vec::new();
        for (n, line) in page.lines.iter().enumerate() {
            let baseline = page.height - 72.0 - n as f32 * 20.0;
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), 12.into()]),
                Operation::new("Td", vec![72.into(), baseline.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(line.as_bytes().to_vec(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ]);
        }
        let bytes = Content { operations }.encode().unwrap_or_default();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), bytes));

        let page_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
            (
                "MediaBox",
                Object::Array(vec![0.into(), 0.into(), page.width.into(), page.height.into()]),
            ),
            ("Rotate", Object::Integer(page.rotate)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    // Resources are inherited from the tree root
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
            ("Resources", Object::Reference(resources_id)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    let info_id = doc.add_object(Dictionary::from_iter([
        ("Title", Object::String(title.as_bytes().to_vec(), StringFormat::Literal)),
        ("Author", Object::String(b"Fixture Author".to_vec(), StringFormat::Literal)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.trailer.set("Info", Object::Reference(info_id));

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap_or_default();
    out
}

/// Pages of widths `600, 601, ...` each carrying `Page <n>`
pub fn numbered_pages(count: usize) -> Vec<FixturePage> {
    (0..count)
        .map(|n| FixturePage::new(600.0 + n as f32, &[&format!("Page {}", n)]))
        .collect()
}

/// PNG of the given size filled with one color
pub fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}
