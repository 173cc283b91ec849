//! Editable document handle
//!
//! Edits go through lopdf's object model. Text location and metadata come
//! from a MuPDF view of the serialized document, rebuilt lazily after any
//! edit that changes page text or page order.
//!
//! Applied redactions are committed lazily too: every applied mark in the
//! document is removed in one MuPDF pass before the next edit, query or
//! save, and only then is the fill painted.

use std::collections::{HashMap, HashSet};
use std::io::{BufWriter, Write};
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::document::{
    DocumentMetadata, EngineDocument, ImagePlacement, OperationError, PageInfo, Point, Rect,
    Result, Rgb, TextAlign, TextStyle, TextboxFit,
};

use super::content::{
    add_resource, append_operations, draw_xobject, fill_rects, push_to_page_array, text_runs, TextRun,
};
use super::fonts::{encode_win_ansi, Base14};
use super::geometry::PageFrame;
use super::image::RasterImage;
use super::layout::layout_textbox;
use super::pages::{empty_document, materialize_inherited, object_type, page_frame, page_ids, rebuild_page_tree};
use super::redaction::burn_in;
use super::text::TextView;

#[derive(Debug, Clone, Copy)]
struct RedactionMark {
    /// User space rect
    rect: [f32; 4],
    fill: Rgb,
}

type Marks = HashMap<ObjectId, Vec<RedactionMark>>;

/// A PDF open for editing
#[derive(Debug)]
pub struct EditableDocument {
    doc: Document,
    pages: Vec<ObjectId>,
    /// Serialized bytes matching the current text, feeding `view`
    snapshot: Option<Vec<u8>>,
    view: Option<TextView>,
    fonts: HashMap<Base14, ObjectId>,
    isolated: HashSet<ObjectId>,
    /// Marked, not yet applied
    pending: Marks,
    /// Applied, waiting for glyph removal
    committed: Marks,
}

impl EditableDocument {
    /// Parse a PDF, keeping `bytes` as the initial text snapshot
    pub fn load(bytes: Vec<u8>) -> Result<Self> {
        let mut doc = Document::load_mem(&bytes)?;
        let pages = page_ids(&doc);
        for page_id in &pages {
            materialize_inherited(&mut doc, *page_id)?;
        }
        Ok(Self::with_pages(doc, pages, Some(bytes)))
    }

    /// A document without pages
    pub fn empty() -> Self {
        Self::with_pages(empty_document(), Vec::new(), None)
    }

    fn with_pages(doc: Document, pages: Vec<ObjectId>, snapshot: Option<Vec<u8>>) -> Self {
        Self {
            doc,
            pages,
            snapshot,
            view: None,
            fonts: HashMap::new(),
            isolated: HashSet::new(),
            pending: HashMap::new(),
            committed: HashMap::new(),
        }
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.pages.get(index).copied().ok_or_else(|| {
            OperationError::Engine(format!(
                "page {} out of range ({} pages)",
                index,
                self.pages.len()
            ))
        })
    }

    fn frame(&self, index: usize) -> Result<(ObjectId, PageFrame)> {
        let page_id = self.page_id(index)?;
        Ok((page_id, page_frame(&self.doc, page_id)?))
    }

    /// Drop the text view after an edit that changes text or page order
    fn invalidate_text(&mut self) {
        self.view = None;
        self.snapshot = None;
    }

    fn text_view(&mut self) -> Result<&TextView> {
        self.commit_redactions()?;
        if self.view.is_none() {
            if self.snapshot.is_none() {
                self.snapshot = Some(self.serialize()?);
            }
            let bytes = self.snapshot.as_deref().unwrap_or_default();
            self.view = Some(TextView::from_bytes(bytes)?);
        }
        self.view
            .as_ref()
            .ok_or_else(|| OperationError::Engine("text view unavailable".to_string()))
    }

    fn serialize(&mut self) -> Result<Vec<u8>> {
        rebuild_page_tree(&mut self.doc, &self.pages)?;
        let mut out = Vec::new();
        self.doc.save_to(&mut out)?;
        Ok(out)
    }

    fn place_marks(&mut self, page_id: ObjectId, marks: &[RedactionMark]) -> Result<()> {
        for mark in marks {
            let [r, g, b] = mark.fill.components();
            let annot = self.doc.add_object(Dictionary::from_iter([
                ("Type", Object::Name(b"Annot".to_vec())),
                ("Subtype", Object::Name(b"Redact".to_vec())),
                ("Rect", Object::Array(mark.rect.iter().map(|v| Object::Real(*v)).collect())),
                ("IC", Object::Array(vec![r.into(), g.into(), b.into()])),
                ("P", Object::Reference(page_id)),
            ]));
            push_to_page_array(&mut self.doc, page_id, "Annots", annot)?;
        }
        Ok(())
    }

    /// Remove the content under every applied mark, then paint the fills
    ///
    /// The document is reparsed from MuPDF's output, so page and object
    /// ids change; pending marks are carried over by page position.
    fn commit_redactions(&mut self) -> Result<()> {
        if self.committed.is_empty() {
            return Ok(());
        }
        let committed = std::mem::take(&mut self.committed);

        let mut targets: Vec<(usize, Vec<RedactionMark>)> = Vec::new();
        for (index, page_id) in self.pages.iter().enumerate() {
            if let Some(marks) = committed.get(page_id) {
                targets.push((index, marks.clone()));
            }
        }
        for (index, marks) in &targets {
            self.place_marks(self.pages[*index], marks)?;
        }

        let bytes = self.serialize()?;
        let indices: Vec<usize> = targets.iter().map(|(index, _)| *index).collect();
        let reloaded = Self::load(burn_in(&bytes, &indices)?)?;
        if reloaded.pages.len() != self.pages.len() {
            return Err(OperationError::Engine(format!(
                "redaction changed the page count from {} to {}",
                self.pages.len(),
                reloaded.pages.len()
            )));
        }

        let previous = std::mem::replace(self, reloaded);
        for (page_id, marks) in previous.pending {
            if let Some(index) = previous.pages.iter().position(|p| *p == page_id) {
                self.pending.insert(self.pages[index], marks);
            }
        }

        for (index, marks) in &targets {
            let regions: Vec<([f32; 4], Rgb)> = marks.iter().map(|m| (m.rect, m.fill)).collect();
            self.draw(self.pages[*index], fill_rects(&regions))?;
        }

        tracing::debug!(
            "Committed {} redactions on {} pages",
            targets.iter().map(|(_, marks)| marks.len()).sum::<usize>(),
            targets.len()
        );
        Ok(())
    }

    fn font_object(&mut self, font: Base14) -> ObjectId {
        if let Some(id) = self.fonts.get(&font) {
            return *id;
        }
        let id = self.doc.add_object(font.dictionary());
        self.fonts.insert(font, id);
        id
    }

    fn draw(&mut self, page_id: ObjectId, operations: Vec<lopdf::content::Operation>) -> Result<()> {
        let isolate = self.isolated.insert(page_id);
        append_operations(&mut self.doc, page_id, operations, isolate)
    }

    fn draw_text(&mut self, index: usize, style: &TextStyle, lines: &[(Point, &str, f32)]) -> Result<()> {
        let font = Base14::from_name(&style.font_name)?;
        if style.font_size.is_nan() || style.font_size <= 0.0 {
            return Err(OperationError::malformed(format!(
                "font_size must be positive, got {}",
                style.font_size
            )));
        }
        self.commit_redactions()?;
        let (page_id, frame) = self.frame(index)?;
        let font_id = self.font_object(font);
        let font_name = add_resource(&mut self.doc, page_id, "Font", "F", font_id)?;

        let runs: Vec<TextRun> = lines
            .iter()
            .map(|(origin, text, word_spacing)| TextRun {
                matrix: frame.text_matrix(*origin),
                bytes: encode_win_ansi(text),
                word_spacing: *word_spacing,
            })
            .collect();
        self.draw(page_id, text_runs(&font_name, style.font_size, style.color, &runs))?;
        self.invalidate_text();
        Ok(())
    }
}

impl EngineDocument for EditableDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_info(&self, index: usize) -> Result<PageInfo> {
        let (_, frame) = self.frame(index)?;
        let (width, height) = frame.displayed_size();
        Ok(PageInfo {
            page_number: index,
            width,
            height,
            rotation: frame.rotation,
        })
    }

    fn metadata(&mut self) -> Result<DocumentMetadata> {
        Ok(self.text_view()?.metadata())
    }

    fn search_page(&mut self, index: usize, needle: &str, hit_max: usize) -> Result<Vec<Rect>> {
        self.page_id(index)?;
        self.text_view()?.search(index, needle, hit_max)
    }

    fn extract_text(&mut self, index: usize, rects: &[Rect]) -> Result<Vec<String>> {
        self.page_id(index)?;
        self.text_view()?.extract(index, rects)
    }

    fn insert_text(&mut self, index: usize, origin: Point, text: &str, style: &TextStyle) -> Result<()> {
        self.draw_text(index, style, &[(origin, text, 0.0)])
    }

    fn insert_textbox(
        &mut self,
        index: usize,
        rect: Rect,
        text: &str,
        style: &TextStyle,
        align: TextAlign,
    ) -> Result<TextboxFit> {
        let font = Base14::from_name(&style.font_name)?;
        let layout = layout_textbox(text, rect, font, style.font_size, align);
        if !layout.fit.fits() {
            return Ok(layout.fit);
        }

        let lines: Vec<(Point, &str, f32)> = layout
            .lines
            .iter()
            .filter(|line| !line.text.is_empty())
            .map(|line| (line.origin, line.text.as_str(), line.word_spacing))
            .collect();
        if !lines.is_empty() {
            self.draw_text(index, style, &lines)?;
        }
        Ok(layout.fit)
    }

    fn insert_image(&mut self, index: usize, placement: ImagePlacement, image: &[u8]) -> Result<()> {
        let raster = RasterImage::decode(image)?;
        self.commit_redactions()?;
        let (page_id, frame) = self.frame(index)?;

        let target = raster.target_rect(placement);
        let image_id = raster.add_to(&mut self.doc)?;
        let name = add_resource(&mut self.doc, page_id, "XObject", "Im", image_id)?;
        self.draw(page_id, draw_xobject(&name, frame.image_matrix(target)))
    }

    fn add_redaction(&mut self, index: usize, rect: Rect, fill: Rgb) -> Result<()> {
        let (page_id, frame) = self.frame(index)?;
        self.pending.entry(page_id).or_default().push(RedactionMark {
            rect: frame.rect_to_user(rect),
            fill,
        });
        Ok(())
    }

    fn apply_redactions(&mut self, index: usize) -> Result<usize> {
        let page_id = self.page_id(index)?;
        let marks = self.pending.remove(&page_id).unwrap_or_default();
        if marks.is_empty() {
            return Ok(0);
        }

        let count = marks.len();
        self.committed.entry(page_id).or_default().extend(marks);
        self.invalidate_text();

        tracing::debug!("Applied {} redactions on page {}", count, index);
        Ok(count)
    }

    fn delete_page(&mut self, index: usize) -> Result<()> {
        self.commit_redactions()?;
        let page_id = self.page_id(index)?;
        self.pages.remove(index);
        if !self.pages.contains(&page_id) {
            self.pending.remove(&page_id);
        }
        self.invalidate_text();
        Ok(())
    }

    fn select(&mut self, order: &[usize]) -> Result<()> {
        self.commit_redactions()?;
        let mut seen = HashSet::new();
        let mut selected = Vec::with_capacity(order.len());
        for &index in order {
            let page_id = self.page_id(index)?;
            if seen.insert(page_id) {
                selected.push(page_id);
            } else {
                let copy = self.doc.get_dictionary(page_id)?.clone();
                selected.push(self.doc.add_object(copy));
            }
        }
        self.pending.retain(|page_id, _| seen.contains(page_id));
        self.pages = selected;
        self.invalidate_text();
        Ok(())
    }

    fn append(&mut self, mut other: Self) -> Result<()> {
        self.commit_redactions()?;
        other.commit_redactions()?;
        let mut source = other.doc;
        rebuild_page_tree(&mut source, &other.pages)?;
        source.renumber_objects_with(self.doc.max_id + 1);

        let pages = page_ids(&source);
        self.doc.max_id = self.doc.max_id.max(source.max_id);
        for (id, object) in source.objects {
            // The target keeps its own catalog and page tree
            let tree_node = matches!(object_type(&object), Some(b"Catalog") | Some(b"Pages"));
            if !tree_node {
                self.doc.objects.insert(id, object);
            }
        }
        self.pages.extend(pages);
        self.invalidate_text();
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.commit_redactions()?;
        // Marks never applied are kept as plain redaction annotations
        for (page_id, marks) in std::mem::take(&mut self.pending) {
            if self.pages.contains(&page_id) {
                self.place_marks(page_id, &marks)?;
            }
        }
        rebuild_page_tree(&mut self.doc, &self.pages)?;
        self.doc.prune_objects();

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let staged = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(staged.as_file());
            self.doc.save_to(&mut writer)?;
            writer.flush()?;
        }
        staged.persist(path).map_err(|e| OperationError::from(e.error))?;

        tracing::debug!("Saved {} pages to {}", self.pages.len(), path.display());
        Ok(())
    }
}
