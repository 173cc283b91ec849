//! Redaction and replacement pipelines
//!
//! Every page is searched before anything is marked, so the engine reads
//! the document's text once per operation. Marks are then placed per page
//! and committed with a single `apply_redactions` call per page, after
//! every mark on that page.

use super::error::Result;
use super::traits::EngineDocument;
use super::types::{Point, Rect, Rgb, TextStyle};

/// Vertical nudge applied to the baseline of bulk replacement text
pub const BASELINE_NUDGE: f32 = 2.0;

/// Share of the matched rect height used as the derived font size
pub const DERIVED_FONT_SCALE: f32 = 0.8;

/// Redact every occurrence of every target, returning the number of marks
///
/// Counts are taken at mark time, so overlapping targets that hit the same
/// text each count.
pub fn redact_targets<D: EngineDocument>(doc: &mut D, targets: &[String], fill: Rgb) -> Result<usize> {
    let mut hits = Vec::with_capacity(doc.page_count());
    for page in 0..doc.page_count() {
        let mut rects = Vec::new();
        for target in targets {
            rects.extend(doc.search_page(page, target, 0)?);
        }
        hits.push(rects);
    }

    let mut removed = 0;
    for (page, rects) in hits.iter().enumerate() {
        for rect in rects {
            doc.add_redaction(page, *rect, fill)?;
        }
        doc.apply_redactions(page)?;

        if !rects.is_empty() {
            tracing::debug!("Page {}: marked {} regions", page, rects.len());
        }
        removed += rects.len();
    }

    Ok(removed)
}

/// Parameters for search-driven replacement
#[derive(Debug, Clone)]
pub struct BulkReplace<'a> {
    pub search_term: &'a str,
    pub replacement: &'a str,
    /// Explicit size, or derived from each match height when `None`
    pub font_size: Option<f32>,
    pub font_name: &'a str,
    pub color: Rgb,
}

impl BulkReplace<'_> {
    /// Font size used for a match rect
    pub fn font_size_for(&self, rect: &Rect) -> f32 {
        self.font_size.unwrap_or(rect.height() * DERIVED_FONT_SCALE)
    }

    /// Baseline origin used for a match rect
    pub fn origin_for(rect: &Rect) -> Point {
        let rect = rect.normalized();
        Point::new(rect.x0, rect.y1 - BASELINE_NUDGE)
    }
}

/// Replace every occurrence of a term on the given pages
///
/// All pages are searched first. Matches are then blanked with white and
/// each page's marks applied, and only after that is the replacement drawn,
/// so the fill never covers the new text. Replacement text longer than the
/// original may run past the blanked area.
pub fn replace_matches<D: EngineDocument>(
    doc: &mut D,
    pages: &[usize],
    request: &BulkReplace<'_>,
) -> Result<usize> {
    let mut hits = Vec::with_capacity(pages.len());
    for &page in pages {
        hits.push((page, doc.search_page(page, request.search_term, 0)?));
    }

    for (page, rects) in &hits {
        for rect in rects {
            doc.add_redaction(*page, *rect, Rgb::WHITE)?;
        }
        doc.apply_redactions(*page)?;
    }

    if !request.replacement.is_empty() {
        for (page, rects) in &hits {
            for rect in rects {
                let style = TextStyle {
                    font_name: request.font_name.to_string(),
                    font_size: request.font_size_for(rect),
                    color: request.color,
                };
                doc.insert_text(*page, BulkReplace::origin_for(rect), request.replacement, &style)?;
            }
        }
    }

    Ok(hits.iter().map(|(_, rects)| rects.len()).sum())
}
