//! In-memory engine for exercising the operation logic without PDFs
//!
//! Pages carry labelled text spans; searching matches span text
//! case-insensitively (as MuPDF does) and `extract_text` returns the spans
//! whose centers fall inside each requested rect. Every engine call is recorded.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::{OperationError, Result};
use super::traits::{EngineDocument, PdfEngine};
use super::types::{
    DocumentMetadata, ImagePlacement, PageInfo, Point, Rect, Rgb, TextAlign, TextStyle, TextboxFit,
};

type Store = Arc<Mutex<HashMap<PathBuf, FakeDocument>>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search(usize),
    ExtractText(usize),
    InsertText(usize),
    InsertTextbox(usize),
    InsertImage(usize),
    Mark(usize),
    Apply(usize),
    Delete(usize),
    Select(Vec<usize>),
    Append(usize),
    Save(PathBuf),
}

impl Call {
    pub fn page(&self) -> Option<usize> {
        match self {
            Call::Search(p)
            | Call::ExtractText(p)
            | Call::InsertText(p)
            | Call::InsertTextbox(p)
            | Call::InsertImage(p)
            | Call::Mark(p)
            | Call::Apply(p)
            | Call::Delete(p) => Some(*p),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Span {
    pub text: String,
    pub rect: Rect,
}

#[derive(Debug, Clone)]
pub struct FakePage {
    pub label: String,
    pub width: f32,
    pub height: f32,
    pub rotation: u16,
    pub spans: Vec<Span>,
    pub inserted_text: Vec<(Point, String, TextStyle)>,
    pub textboxes: Vec<(Rect, String, TextAlign)>,
    pub images: Vec<ImagePlacement>,
    pub pending: Vec<(Rect, Rgb)>,
    pub applied: Vec<(Rect, Rgb)>,
    pub apply_calls: usize,
}

impl FakePage {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            width: 612.0,
            height: 792.0,
            rotation: 0,
            spans: Vec::new(),
            inserted_text: Vec::new(),
            textboxes: Vec::new(),
            images: Vec::new(),
            pending: Vec::new(),
            applied: Vec::new(),
            apply_calls: 0,
        }
    }

    /// Add a text span on its own line starting at `y`
    pub fn with_span(mut self, text: &str, y: f32) -> Self {
        let width = 6.0 * text.chars().count() as f32;
        self.spans.push(Span {
            text: text.to_string(),
            rect: Rect::new(72.0, y, 72.0 + width, y + 12.0),
        });
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_rotation(mut self, rotation: u16) -> Self {
        self.rotation = rotation;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeDocument {
    pub pages: Vec<FakePage>,
    pub metadata: DocumentMetadata,
    pub calls: Vec<Call>,
    store: Option<Store>,
}

impl FakeDocument {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn labels(&self) -> Vec<String> {
        self.pages.iter().map(|p| p.label.clone()).collect()
    }

    /// Pages searched so far, in call order
    pub fn searched_pages(&self) -> Vec<usize> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Search(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    fn page_mut(&mut self, index: usize) -> Result<&mut FakePage> {
        self.pages
            .get_mut(index)
            .ok_or_else(|| OperationError::Engine(format!("page {} out of range", index)))
    }

    fn page(&self, index: usize) -> Result<&FakePage> {
        self.pages
            .get(index)
            .ok_or_else(|| OperationError::Engine(format!("page {} out of range", index)))
    }
}

impl EngineDocument for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_info(&self, index: usize) -> Result<PageInfo> {
        let page = self.page(index)?;
        Ok(PageInfo {
            page_number: index,
            width: page.width,
            height: page.height,
            rotation: page.rotation,
        })
    }

    fn metadata(&mut self) -> Result<DocumentMetadata> {
        Ok(self.metadata.clone())
    }

    fn search_page(&mut self, index: usize, needle: &str, hit_max: usize) -> Result<Vec<Rect>> {
        self.calls.push(Call::Search(index));
        let needle = needle.to_lowercase();
        let limit = if hit_max == 0 { usize::MAX } else { hit_max };
        let page = self.page(index)?;
        let mut rects = Vec::new();
        for span in &page.spans {
            let haystack = span.text.to_lowercase();
            for _ in haystack.matches(needle.as_str()) {
                rects.push(span.rect);
            }
        }
        rects.truncate(limit);
        Ok(rects)
    }

    fn extract_text(&mut self, index: usize, rects: &[Rect]) -> Result<Vec<String>> {
        self.calls.push(Call::ExtractText(index));
        let page = self.page(index)?;
        Ok(rects
            .iter()
            .map(|rect| {
                let texts: Vec<&str> = page
                    .spans
                    .iter()
                    .filter(|s| rect.contains(s.rect.center()))
                    .map(|s| s.text.as_str())
                    .collect();
                texts.join(" ")
            })
            .collect())
    }

    fn insert_text(&mut self, index: usize, origin: Point, text: &str, style: &TextStyle) -> Result<()> {
        self.calls.push(Call::InsertText(index));
        self.page_mut(index)?
            .inserted_text
            .push((origin, text.to_string(), style.clone()));
        Ok(())
    }

    fn insert_textbox(
        &mut self,
        index: usize,
        rect: Rect,
        text: &str,
        style: &TextStyle,
        align: TextAlign,
    ) -> Result<TextboxFit> {
        self.calls.push(Call::InsertTextbox(index));
        let fit = TextboxFit {
            spare_height: rect.height() - style.font_size * 1.2,
        };
        if fit.fits() {
            self.page_mut(index)?
                .textboxes
                .push((rect, text.to_string(), align));
        }
        Ok(fit)
    }

    fn insert_image(&mut self, index: usize, placement: ImagePlacement, image: &[u8]) -> Result<()> {
        self.calls.push(Call::InsertImage(index));
        if image.is_empty() {
            return Err(OperationError::UnsupportedImage("empty image".into()));
        }
        self.page_mut(index)?.images.push(placement);
        Ok(())
    }

    fn add_redaction(&mut self, index: usize, rect: Rect, fill: Rgb) -> Result<()> {
        self.calls.push(Call::Mark(index));
        self.page_mut(index)?.pending.push((rect, fill));
        Ok(())
    }

    fn apply_redactions(&mut self, index: usize) -> Result<usize> {
        self.calls.push(Call::Apply(index));
        let page = self.page_mut(index)?;
        page.apply_calls += 1;
        let pending: Vec<(Rect, Rgb)> = page.pending.drain(..).collect();
        let applied = pending.len();
        page.applied.extend(pending);
        Ok(applied)
    }

    fn delete_page(&mut self, index: usize) -> Result<()> {
        self.calls.push(Call::Delete(index));
        self.page(index)?;
        self.pages.remove(index);
        Ok(())
    }

    fn select(&mut self, order: &[usize]) -> Result<()> {
        self.calls.push(Call::Select(order.to_vec()));
        let pages = order
            .iter()
            .map(|&i| self.page(i).cloned())
            .collect::<Result<Vec<_>>>()?;
        self.pages = pages;
        Ok(())
    }

    fn append(&mut self, other: Self) -> Result<()> {
        self.calls.push(Call::Append(other.pages.len()));
        self.pages.extend(other.pages);
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.calls.push(Call::Save(path.to_path_buf()));
        let store = self
            .store
            .clone()
            .ok_or_else(|| OperationError::Engine("document has no store".into()))?;
        let mut saved = self.clone();
        saved.store = None;
        store.lock().insert(path.to_path_buf(), saved);
        Ok(())
    }
}

/// Engine backed by an in-memory path -> document map
#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    store: Store,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, doc: FakeDocument) {
        self.store.lock().insert(path.into(), doc);
    }

    pub fn get(&self, path: &Path) -> Option<FakeDocument> {
        self.store.lock().get(path).cloned()
    }
}

impl PdfEngine for FakeEngine {
    type Document = FakeDocument;

    fn open(&self, path: &Path) -> Result<FakeDocument> {
        let mut doc = self
            .get(path)
            .ok_or_else(|| OperationError::Engine(format!("cannot open {}", path.display())))?;
        doc.store = Some(Arc::clone(&self.store));
        Ok(doc)
    }

    fn create(&self) -> Result<FakeDocument> {
        Ok(FakeDocument {
            store: Some(Arc::clone(&self.store)),
            ..Default::default()
        })
    }
}
