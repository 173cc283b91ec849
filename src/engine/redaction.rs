//! Glyph removal through MuPDF
//!
//! lopdf can only paint over content. Removing the text, image pixels and
//! links under a `/Redact` annotation is done by MuPDF on a serialized copy,
//! which is then parsed back.

use mupdf::pdf::{PdfDocument, PdfPage};

use crate::document::Result;

/// Apply every `/Redact` annotation on the listed pages of `bytes`
///
/// Returns the rewritten document. The redaction annotations themselves
/// are removed; no fill is painted.
pub fn burn_in(bytes: &[u8], pages: &[usize]) -> Result<Vec<u8>> {
    let doc = PdfDocument::from_bytes(bytes)?;
    for &index in pages {
        let mut page = PdfPage::try_from(doc.load_page(index as i32)?)?;
        if !page.redact()? {
            tracing::warn!("Page {} had no redaction annotations to apply", index);
        }
    }

    let mut out = Vec::with_capacity(bytes.len());
    doc.write_to(&mut out)?;
    Ok(out)
}
