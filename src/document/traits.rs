//! Engine traits
//!
//! The seam between the operation service and the PDF engine. The service
//! only validates indices, filters matches and sequences calls; everything
//! that touches the PDF format goes through these traits.

use std::path::Path;

use super::error::Result;
use super::types::{DocumentMetadata, ImagePlacement, PageInfo, Point, Rect, Rgb, TextAlign, TextStyle, TextboxFit};

/// Opens and creates documents
pub trait PdfEngine: Send + Sync {
    type Document: EngineDocument;

    /// Decode the document stored at `path`
    fn open(&self, path: &Path) -> Result<Self::Document>;

    /// Create an empty document (merge target)
    fn create(&self) -> Result<Self::Document>;
}

/// An open, exclusively owned document
///
/// Page indices passed to these methods are already validated by the
/// caller. Dropping the value releases the document.
pub trait EngineDocument: Sized {
    fn page_count(&self) -> usize;

    fn page_info(&self, index: usize) -> Result<PageInfo>;

    fn metadata(&mut self) -> Result<DocumentMetadata>;

    /// Locate occurrences of `needle` on a page; `hit_max == 0` is unbounded
    fn search_page(&mut self, index: usize, needle: &str, hit_max: usize) -> Result<Vec<Rect>>;

    /// Text whose glyphs fall inside each rect, one entry per rect
    ///
    /// The page's text is read once per call, so callers batch every rect
    /// they need from a page.
    fn extract_text(&mut self, index: usize, rects: &[Rect]) -> Result<Vec<String>>;

    /// Draw a single line of text with its baseline starting at `origin`
    fn insert_text(&mut self, index: usize, origin: Point, text: &str, style: &TextStyle) -> Result<()>;

    /// Wrap text into `rect`; nothing is drawn when it does not fit
    fn insert_textbox(
        &mut self,
        index: usize,
        rect: Rect,
        text: &str,
        style: &TextStyle,
        align: TextAlign,
    ) -> Result<TextboxFit>;

    fn insert_image(&mut self, index: usize, placement: ImagePlacement, image: &[u8]) -> Result<()>;

    /// Mark a region for redaction; takes effect on [`EngineDocument::apply_redactions`]
    fn add_redaction(&mut self, index: usize, rect: Rect, fill: Rgb) -> Result<()>;

    /// Commit every pending mark on the page, returning how many were applied
    fn apply_redactions(&mut self, index: usize) -> Result<usize>;

    fn delete_page(&mut self, index: usize) -> Result<()>;

    /// Keep only the listed pages in the listed order; repeats duplicate a page
    fn select(&mut self, order: &[usize]) -> Result<()>;

    /// Append every page of `other`
    fn append(&mut self, other: Self) -> Result<()>;

    fn save(&mut self, path: &Path) -> Result<()>;
}
