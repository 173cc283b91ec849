//! Text location through MuPDF
//!
//! MuPDF reports quads in displayed page space, which is the coordinate
//! space used throughout the crate, so hits need no conversion.

use mupdf::{Document, MetadataName, Quad, TextPageOptions};

use crate::document::{DocumentMetadata, Point, Rect, Result};

/// Cap used when a search asks for every hit
pub const SEARCH_HIT_CAP: u32 = 4096;

/// Read-only MuPDF view of a serialized document
pub struct TextView {
    doc: Document,
}

fn quad_rect(q: &Quad) -> Rect {
    Rect::new(
        q.ul.x.min(q.ll.x),
        q.ul.y.min(q.ur.y),
        q.ur.x.max(q.lr.x),
        q.ll.y.max(q.lr.y),
    )
}

impl TextView {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = Document::from_bytes(bytes, "application/pdf")?;
        Ok(Self { doc })
    }

    pub fn search(&self, index: usize, needle: &str, hit_max: usize) -> Result<Vec<Rect>> {
        let hit_max = match hit_max {
            0 => SEARCH_HIT_CAP,
            n => u32::try_from(n).unwrap_or(SEARCH_HIT_CAP).min(SEARCH_HIT_CAP),
        };
        let page = self.doc.load_page(index as i32)?;
        let quads = page.search(needle, hit_max)?;
        Ok(quads.iter().map(quad_rect).collect())
    }

    /// For each rect, the characters whose centers fall inside it, lines
    /// separated by `\n`. The page is laid out once for all rects.
    pub fn extract(&self, index: usize, rects: &[Rect]) -> Result<Vec<String>> {
        let page = self.doc.load_page(index as i32)?;
        let text_page = page.to_text_page(TextPageOptions::empty())?;

        let mut lines: Vec<Vec<String>> = vec![Vec::new(); rects.len()];
        for block in text_page.blocks() {
            for line in block.lines() {
                let chars: Vec<(Point, char)> = line
                    .chars()
                    .filter_map(|ch| Some((quad_rect(&ch.quad()).center(), ch.char()?)))
                    .collect();
                for (rect, out) in rects.iter().zip(lines.iter_mut()) {
                    let text: String = chars
                        .iter()
                        .filter(|(center, _)| rect.contains(*center))
                        .map(|(_, ch)| *ch)
                        .collect();
                    if !text.is_empty() {
                        out.push(text);
                    }
                }
            }
        }
        Ok(lines.into_iter().map(|l| l.join("\n")).collect())
    }

    pub fn metadata(&self) -> DocumentMetadata {
        let get = |name: MetadataName| metadata_field(name, self.doc.metadata(name));
        DocumentMetadata {
            title: get(MetadataName::Title),
            author: get(MetadataName::Author),
            subject: get(MetadataName::Subject),
            creator: get(MetadataName::Creator),
        }
    }
}

/// Unreadable fields read as empty
fn metadata_field(name: MetadataName, value: std::result::Result<String, mupdf::Error>) -> String {
    value.unwrap_or_else(|e| {
        tracing::warn!("Failed to read {:?} metadata: {}", name, e);
        String::new()
    })
}

impl std::fmt::Debug for TextView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextView").finish_non_exhaustive()
    }
}
