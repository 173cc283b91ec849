//! Document operation service
//!
//! Each public operation opens its input, validates the request against the
//! opened document, performs the edit and saves to the output path. Failures
//! never escape: they are folded into an [`OperationResult`] and logged.

use std::path::{Path, PathBuf};

use super::error::{OperationError, Result};
use super::redact::{redact_targets, replace_matches, BulkReplace};
use super::search::SearchMatches;
use super::traits::{EngineDocument, PdfEngine};
use super::types::{
    DocumentInfo, EditSummary, ImagePlacement, OperationResult, Point, Rect, Rgb, SearchOptions,
    SearchReport, TextAlign, TextStyle,
};
use super::validate::{check_order, check_page, check_pages, deletion_order};

/// Text drawn at a baseline point
#[derive(Debug, Clone)]
pub struct TextInsertion {
    pub page: i64,
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub style: TextStyle,
}

/// Image placed at a point, optionally fitted into a box
#[derive(Debug, Clone)]
pub struct ImageInsertion {
    pub image_path: PathBuf,
    pub page: i64,
    pub x: f32,
    pub y: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl ImageInsertion {
    fn placement(&self) -> Result<ImagePlacement> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w <= 0.0 || h <= 0.0 => Err(OperationError::malformed(format!(
                "image box must have a positive size, got {}x{}",
                w, h
            ))),
            (Some(w), Some(h)) => Ok(ImagePlacement::Fit(Rect::new(
                self.x,
                self.y,
                self.x + w,
                self.y + h,
            ))),
            _ => Ok(ImagePlacement::At(Point::new(self.x, self.y))),
        }
    }
}

/// Replace the content of one region
#[derive(Debug, Clone)]
pub struct InstanceReplace {
    pub page: i64,
    pub rect: Rect,
    /// Nothing is drawn when absent or empty
    pub replacement: Option<String>,
    pub style: TextStyle,
    pub align: TextAlign,
    pub fill: Rgb,
}

/// Replace every occurrence of a term
#[derive(Debug, Clone)]
pub struct ReplaceAll {
    pub search_term: String,
    pub replacement: String,
    /// Restrict to one page; all pages when `None`
    pub page: Option<i64>,
    pub font_size: Option<f32>,
    pub font_name: String,
    pub color: Rgb,
}

/// Runs document operations on top of a [`PdfEngine`]
#[derive(Debug, Clone)]
pub struct DocumentOperationService<E: PdfEngine> {
    engine: E,
}

fn finish<T>(operation: &'static str, result: Result<T>) -> OperationResult<T> {
    if let Err(err) = &result {
        tracing::warn!(operation, kind = ?err.kind(), "Operation failed: {}", err);
    }
    result.into()
}

impl<E: PdfEngine> DocumentOperationService<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Insert a line of text
    pub fn add_text(&self, input: &Path, output: &Path, request: &TextInsertion) -> OperationResult {
        finish("add_text", self.try_add_text(input, output, request))
    }

    fn try_add_text(&self, input: &Path, output: &Path, request: &TextInsertion) -> Result<EditSummary> {
        let mut doc = self.engine.open(input)?;
        let page = check_page(request.page, doc.page_count())?;

        doc.insert_text(
            page,
            Point::new(request.x, request.y),
            &request.text,
            &request.style,
        )?;
        doc.save(output)?;

        tracing::info!(operation = "add_text", page, "Text added");
        Ok(EditSummary::new(
            format!("Text added to page {}", page),
            output.to_path_buf(),
        ))
    }

    /// Insert an image read from disk
    pub fn add_image(&self, input: &Path, output: &Path, request: &ImageInsertion) -> OperationResult {
        finish("add_image", self.try_add_image(input, output, request))
    }

    fn try_add_image(&self, input: &Path, output: &Path, request: &ImageInsertion) -> Result<EditSummary> {
        if !request.image_path.exists() {
            return Err(OperationError::SourceNotFound(vec![request.image_path.clone()]));
        }
        let placement = request.placement()?;

        let mut doc = self.engine.open(input)?;
        let page = check_page(request.page, doc.page_count())?;

        let image = std::fs::read(&request.image_path)?;
        doc.insert_image(page, placement, &image)?;
        doc.save(output)?;

        tracing::info!(operation = "add_image", page, bytes = image.len(), "Image added");
        Ok(EditSummary::new(
            format!("Image added to page {}", page),
            output.to_path_buf(),
        ))
    }

    /// Delete pages; duplicates are collapsed
    pub fn delete_pages(&self, input: &Path, output: &Path, pages: &[i64]) -> OperationResult {
        finish("delete_pages", self.try_delete_pages(input, output, pages))
    }

    fn try_delete_pages(&self, input: &Path, output: &Path, pages: &[i64]) -> Result<EditSummary> {
        if pages.is_empty() {
            return Err(OperationError::malformed("page_numbers must not be empty"));
        }

        let mut doc = self.engine.open(input)?;
        let page_count = doc.page_count();
        let order = deletion_order(&check_pages(pages, page_count)?);
        if order.len() >= page_count {
            return Err(OperationError::NoPagesRemaining);
        }

        for &page in &order {
            doc.delete_page(page)?;
        }
        doc.save(output)?;

        tracing::info!(operation = "delete_pages", deleted = order.len(), remaining = doc.page_count(), "Pages deleted");
        Ok(EditSummary::new(
            format!("Deleted {} pages", order.len()),
            output.to_path_buf(),
        ))
    }

    /// Reorder pages by a complete permutation
    pub fn reorder_pages(&self, input: &Path, output: &Path, order: &[i64]) -> OperationResult {
        finish("reorder_pages", self.try_reorder_pages(input, output, order))
    }

    fn try_reorder_pages(&self, input: &Path, output: &Path, order: &[i64]) -> Result<EditSummary> {
        let mut doc = self.engine.open(input)?;
        let order = check_order(order, doc.page_count())?;

        doc.select(&order)?;
        doc.save(output)?;

        tracing::info!(operation = "reorder_pages", pages = order.len(), "Pages reordered");
        Ok(EditSummary::new(
            format!("Reordered {} pages", order.len()),
            output.to_path_buf(),
        ))
    }

    /// Keep the listed pages in the listed order
    pub fn extract_pages(&self, input: &Path, output: &Path, pages: &[i64]) -> OperationResult {
        finish("extract_pages", self.try_extract_pages(input, output, pages))
    }

    fn try_extract_pages(&self, input: &Path, output: &Path, pages: &[i64]) -> Result<EditSummary> {
        if pages.is_empty() {
            return Err(OperationError::malformed("page_numbers must not be empty"));
        }

        let mut doc = self.engine.open(input)?;
        let pages = check_pages(pages, doc.page_count())?;

        doc.select(&pages)?;
        doc.save(output)?;

        tracing::info!(operation = "extract_pages", pages = pages.len(), "Pages extracted");
        Ok(EditSummary::new(
            format!("Extracted {} pages", pages.len()),
            output.to_path_buf(),
        ))
    }

    /// Concatenate documents in input order
    pub fn merge(&self, inputs: &[PathBuf], output: &Path) -> OperationResult {
        finish("merge", self.try_merge(inputs, output))
    }

    fn try_merge(&self, inputs: &[PathBuf], output: &Path) -> Result<EditSummary> {
        if inputs.is_empty() {
            return Err(OperationError::malformed("no documents to merge"));
        }

        let missing: Vec<PathBuf> = inputs.iter().filter(|p| !p.exists()).cloned().collect();
        if !missing.is_empty() {
            return Err(OperationError::SourceNotFound(missing));
        }

        let mut merged = self.engine.create()?;
        for input in inputs {
            let source = self.engine.open(input)?;
            tracing::debug!("Appending {} pages from {}", source.page_count(), input.display());
            merged.append(source)?;
        }
        merged.save(output)?;

        tracing::info!(operation = "merge", documents = inputs.len(), pages = merged.page_count(), "Documents merged");
        Ok(EditSummary::new(
            format!("Merged {} PDFs", inputs.len()),
            output.to_path_buf(),
        ))
    }

    /// Search every page for a query
    pub fn search_text(&self, input: &Path, query: &str, options: &SearchOptions) -> OperationResult<SearchReport> {
        finish("search_text", self.try_search_text(input, query, options))
    }

    fn try_search_text(&self, input: &Path, query: &str, options: &SearchOptions) -> Result<SearchReport> {
        if query.is_empty() {
            return Err(OperationError::malformed("query must not be empty"));
        }

        let mut doc = self.engine.open(input)?;
        let page_count = doc.page_count();
        let matches = SearchMatches::new(&mut doc, query, options).collect::<Result<Vec<_>>>()?;

        tracing::info!(operation = "search_text", matches = matches.len(), "Search finished");
        Ok(SearchReport {
            query: query.to_string(),
            match_count: matches.len(),
            matches,
            page_count,
        })
    }

    /// Redact every occurrence of every target
    pub fn redact_text(&self, input: &Path, output: &Path, targets: &[String], fill: Rgb) -> OperationResult {
        finish("redact_text", self.try_redact_text(input, output, targets, fill))
    }

    fn try_redact_text(&self, input: &Path, output: &Path, targets: &[String], fill: Rgb) -> Result<EditSummary> {
        if targets.is_empty() || targets.iter().any(|t| t.is_empty()) {
            return Err(OperationError::malformed("targets must be non-empty strings"));
        }

        let mut doc = self.engine.open(input)?;
        let removed = redact_targets(&mut doc, targets, fill)?;
        doc.save(output)?;

        tracing::info!(operation = "redact_text", removed, "Text redacted");
        Ok(EditSummary::new(format!("Redacted {} instances", removed), output.to_path_buf())
            .with_removed(removed))
    }

    /// Blank one region and optionally draw a replacement into it
    pub fn replace_text_instance(&self, input: &Path, output: &Path, request: &InstanceReplace) -> OperationResult {
        finish("replace_text_instance", self.try_replace_text_instance(input, output, request))
    }

    fn try_replace_text_instance(
        &self,
        input: &Path,
        output: &Path,
        request: &InstanceReplace,
    ) -> Result<EditSummary> {
        let mut doc = self.engine.open(input)?;
        let page = check_page(request.page, doc.page_count())?;

        doc.add_redaction(page, request.rect, request.fill)?;
        doc.apply_redactions(page)?;

        let replacement = request.replacement.as_deref().filter(|r| !r.is_empty());
        if let Some(text) = replacement {
            let fit = doc.insert_textbox(page, request.rect, text, &request.style, request.align)?;
            if !fit.fits() {
                tracing::warn!(
                    page,
                    spare_height = fit.spare_height,
                    "Replacement text does not fit its region, nothing inserted"
                );
            }
        }
        doc.save(output)?;

        tracing::info!(operation = "replace_text_instance", page, "Region replaced");
        let message = if replacement.is_some() {
            "Replaced text"
        } else {
            "Removed text"
        };
        Ok(EditSummary::new(message, output.to_path_buf()))
    }

    /// Replace every occurrence of a term on one page or all pages
    pub fn replace_text(&self, input: &Path, output: &Path, request: &ReplaceAll) -> OperationResult {
        finish("replace_text", self.try_replace_text(input, output, request))
    }

    fn try_replace_text(&self, input: &Path, output: &Path, request: &ReplaceAll) -> Result<EditSummary> {
        if request.search_term.is_empty() {
            return Err(OperationError::malformed("search_term must not be empty"));
        }
        if let Some(size) = request.font_size.filter(|s| *s <= 0.0) {
            return Err(OperationError::malformed(format!("font_size must be positive, got {}", size)));
        }

        let mut doc = self.engine.open(input)?;
        let pages: Vec<usize> = match request.page {
            Some(page) => vec![check_page(page, doc.page_count())?],
            None => (0..doc.page_count()).collect(),
        };

        let bulk = BulkReplace {
            search_term: &request.search_term,
            replacement: &request.replacement,
            font_size: request.font_size,
            font_name: &request.font_name,
            color: request.color,
        };
        let replaced = replace_matches(&mut doc, &pages, &bulk)?;
        doc.save(output)?;

        tracing::info!(operation = "replace_text", replaced, "Text replaced");
        Ok(EditSummary::new(format!("Replaced {} instances", replaced), output.to_path_buf())
            .with_replaced(replaced))
    }

    /// Page geometry and document metadata
    pub fn get_info(&self, input: &Path) -> OperationResult<DocumentInfo> {
        finish("get_info", self.try_get_info(input))
    }

    fn try_get_info(&self, input: &Path) -> Result<DocumentInfo> {
        let mut doc = self.engine.open(input)?;
        let page_count = doc.page_count();
        let pages = (0..page_count)
            .map(|i| doc.page_info(i))
            .collect::<Result<Vec<_>>>()?;
        let metadata = doc.metadata()?;

        Ok(DocumentInfo {
            page_count,
            pages,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::error::ErrorKind;
    use crate::document::testing::{Call, FakeDocument, FakeEngine, FakePage};
    use crate::document::types::DocumentMetadata;
    use tempfile::TempDir;

    fn pages(count: usize) -> FakeDocument {
        FakeDocument::new((0..count).map(|i| FakePage::new(&format!("p{}", i))).collect())
    }

    fn service_with(doc: FakeDocument) -> DocumentOperationService<FakeEngine> {
        let engine = FakeEngine::new();
        engine.insert("in.pdf", doc);
        DocumentOperationService::new(engine)
    }

    fn saved(service: &DocumentOperationService<FakeEngine>) -> Option<FakeDocument> {
        service.engine().get(Path::new("out.pdf"))
    }

    #[test]
    fn test_delete_keeps_remaining_pages_in_order() {
        let service = service_with(pages(5));
        let result = service
            .delete_pages(Path::new("in.pdf"), Path::new("out.pdf"), &[1, 3])
            .into_result()
            .unwrap();

        assert_eq!(result.message, "Deleted 2 pages");
        assert_eq!(saved(&service).unwrap().labels(), vec!["p0", "p2", "p4"]);
    }

    #[test]
    fn test_delete_processes_highest_first_and_collapses_duplicates() {
        let service = service_with(pages(5));
        service
            .delete_pages(Path::new("in.pdf"), Path::new("out.pdf"), &[0, 3, 0])
            .into_result()
            .unwrap();

        let out = saved(&service).unwrap();
        let deletes: Vec<&Call> = out.calls.iter().filter(|c| matches!(c, Call::Delete(_))).collect();
        assert_eq!(deletes, vec![&Call::Delete(3), &Call::Delete(0)]);
        assert_eq!(out.labels(), vec!["p1", "p2", "p4"]);
    }

    #[test]
    fn test_out_of_range_pages_leave_no_output() {
        let service = service_with(pages(3));
        let result = service.delete_pages(Path::new("in.pdf"), Path::new("out.pdf"), &[1, 5, -1]);

        assert!(!result.success);
        match result.failure_ref() {
            Some(OperationError::InvalidPageIndex { pages, page_count }) => {
                assert_eq!(pages, &vec![5, -1]);
                assert_eq!(*page_count, 3);
            }
            other => panic!("unexpected failure: {other:?}"),
        }
        assert!(saved(&service).is_none());

        let result = service.extract_pages(Path::new("in.pdf"), Path::new("out.pdf"), &[7]);
        assert!(!result.success);
        assert!(saved(&service).is_none());
    }

    #[test]
    fn test_delete_every_page_fails() {
        let service = service_with(pages(2));
        let result = service.delete_pages(Path::new("in.pdf"), Path::new("out.pdf"), &[1, 0, 1]);
        assert!(matches!(result.failure_ref(), Some(OperationError::NoPagesRemaining)));
        assert!(saved(&service).is_none());
    }

    #[test]
    fn test_empty_page_list_is_malformed() {
        let service = service_with(pages(2));
        let result = service.extract_pages(Path::new("in.pdf"), Path::new("out.pdf"), &[]);
        assert_eq!(result.failure_ref().map(|e| e.kind()), Some(ErrorKind::MalformedParameter));
    }

    #[test]
    fn test_reorder_applies_permutation() {
        let service = service_with(pages(3));
        let summary = service
            .reorder_pages(Path::new("in.pdf"), Path::new("out.pdf"), &[2, 0, 1])
            .into_result()
            .unwrap();
        assert_eq!(summary.message, "Reordered 3 pages");
        assert_eq!(saved(&service).unwrap().labels(), vec!["p2", "p0", "p1"]);
    }

    #[test]
    fn test_reorder_rejects_bad_orders_before_mutation() {
        let service = service_with(pages(3));

        let result = service.reorder_pages(Path::new("in.pdf"), Path::new("out.pdf"), &[1, 0]);
        assert!(matches!(
            result.failure_ref(),
            Some(OperationError::OrderLengthMismatch { expected: 3, actual: 2 })
        ));

        let result = service.reorder_pages(Path::new("in.pdf"), Path::new("out.pdf"), &[0, 0, 1]);
        assert!(matches!(
            result.failure_ref(),
            Some(OperationError::OrderNotPermutation { .. })
        ));
        assert!(saved(&service).is_none());
    }

    #[test]
    fn test_extract_keeps_order_and_repeats() {
        let service = service_with(pages(4));
        service
            .extract_pages(Path::new("in.pdf"), Path::new("out.pdf"), &[3, 1, 3])
            .into_result()
            .unwrap();
        assert_eq!(saved(&service).unwrap().labels(), vec!["p3", "p1", "p3"]);
    }

    #[test]
    fn test_merge_concatenates_in_input_order() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();

        let engine = FakeEngine::new();
        engine.insert(&a, FakeDocument::new(vec![FakePage::new("a0"), FakePage::new("a1")]));
        engine.insert(
            &b,
            FakeDocument::new(vec![FakePage::new("b0"), FakePage::new("b1"), FakePage::new("b2")]),
        );
        let service = DocumentOperationService::new(engine);

        let summary = service
            .merge(&[a, b], Path::new("out.pdf"))
            .into_result()
            .unwrap();
        assert_eq!(summary.message, "Merged 2 PDFs");
        assert_eq!(
            saved(&service).unwrap().labels(),
            vec!["a0", "a1", "b0", "b1", "b2"]
        );
    }

    #[test]
    fn test_merge_reports_every_missing_source() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("present.pdf");
        std::fs::write(&present, b"x").unwrap();
        let gone = dir.path().join("gone.pdf");
        let lost = dir.path().join("lost.pdf");

        let service = DocumentOperationService::new(FakeEngine::new());
        let result = service.merge(&[gone.clone(), present, lost.clone()], Path::new("out.pdf"));
        match result.failure_ref() {
            Some(OperationError::SourceNotFound(missing)) => assert_eq!(missing, &vec![gone, lost]),
            other => panic!("unexpected failure: {other:?}"),
        }

        let result = service.merge(&[], Path::new("out.pdf"));
        assert_eq!(result.failure_ref().map(|e| e.kind()), Some(ErrorKind::MalformedParameter));
    }

    #[test]
    fn test_search_counts_matches_across_pages() {
        let service = service_with(FakeDocument::new(vec![
            FakePage::new("p0").with_span("Invoice", 10.0).with_span("invoice", 40.0),
            FakePage::new("p1").with_span("Receipt", 10.0),
            FakePage::new("p2").with_span("INVOICE", 10.0),
        ]));
        let report = service
            .search_text(Path::new("in.pdf"), "invoice", &SearchOptions::default())
            .into_result()
            .unwrap();

        assert_eq!(report.match_count, 3);
        assert_eq!(report.page_count, 3);
        assert_eq!(report.matches.iter().map(|m| m.page).collect::<Vec<_>>(), vec![0, 0, 2]);

        let result = service.search_text(Path::new("in.pdf"), "", &SearchOptions::default());
        assert_eq!(result.failure_ref().map(|e| e.kind()), Some(ErrorKind::MalformedParameter));
    }

    #[test]
    fn test_redact_reports_removed_count() {
        let service = service_with(FakeDocument::new(vec![
            FakePage::new("p0").with_span("Foo", 10.0).with_span("Foo", 40.0),
            FakePage::new("p1").with_span("Bar", 10.0),
        ]));
        let fill = Rgb::new(0.0, 0.0, 0.0).unwrap();
        let summary = service
            .redact_text(
                Path::new("in.pdf"),
                Path::new("out.pdf"),
                &["Foo".to_string(), "Bar".to_string()],
                fill,
            )
            .into_result()
            .unwrap();

        assert_eq!(summary.removed_count, Some(3));
        let out = saved(&service).unwrap();
        assert_eq!(out.pages[0].applied.len(), 2);
        assert_eq!(out.pages[1].applied, vec![(out.pages[1].spans[0].rect, fill)]);
        assert!(out.pages.iter().all(|p| p.apply_calls == 1));
    }

    #[test]
    fn test_replace_instance_draws_after_fill() {
        let service = service_with(pages(1));
        let request = InstanceReplace {
            page: 0,
            rect: Rect::new(10.0, 10.0, 200.0, 60.0),
            replacement: Some("Hello".to_string()),
            style: TextStyle::default(),
            align: TextAlign::Center,
            fill: Rgb::WHITE,
        };
        let summary = service
            .replace_text_instance(Path::new("in.pdf"), Path::new("out.pdf"), &request)
            .into_result()
            .unwrap();
        assert_eq!(summary.message, "Replaced text");

        let out = saved(&service).unwrap();
        assert_eq!(out.pages[0].applied, vec![(request.rect, Rgb::WHITE)]);
        assert_eq!(out.pages[0].textboxes[0].1, "Hello");
        assert_eq!(out.pages[0].textboxes[0].2, TextAlign::Center);
    }

    #[test]
    fn test_replace_instance_without_replacement_only_removes() {
        let service = service_with(pages(1));
        let request = InstanceReplace {
            page: 0,
            rect: Rect::new(10.0, 10.0, 200.0, 60.0),
            replacement: None,
            style: TextStyle::default(),
            align: TextAlign::Left,
            fill: Rgb::WHITE,
        };
        let summary = service
            .replace_text_instance(Path::new("in.pdf"), Path::new("out.pdf"), &request)
            .into_result()
            .unwrap();
        assert_eq!(summary.message, "Removed text");
        assert!(saved(&service).unwrap().pages[0].textboxes.is_empty());
    }

    #[test]
    fn test_replace_all_restricted_to_page() {
        let service = service_with(FakeDocument::new(vec![
            FakePage::new("p0").with_span("draft", 10.0),
            FakePage::new("p1").with_span("draft", 10.0).with_span("draft", 30.0),
        ]));
        let request = ReplaceAll {
            search_term: "draft".to_string(),
            replacement: "final".to_string(),
            page: Some(1),
            font_size: None,
            font_name: "helv".to_string(),
            color: Rgb::BLACK,
        };
        let summary = service
            .replace_text(Path::new("in.pdf"), Path::new("out.pdf"), &request)
            .into_result()
            .unwrap();

        assert_eq!(summary.replaced_count, Some(2));
        let out = saved(&service).unwrap();
        assert!(out.pages[0].inserted_text.is_empty());
        assert_eq!(out.pages[1].inserted_text.len(), 2);

        let all_pages = ReplaceAll { page: None, ..request };
        let summary = service
            .replace_text(Path::new("in.pdf"), Path::new("out.pdf"), &all_pages)
            .into_result()
            .unwrap();
        assert_eq!(summary.replaced_count, Some(3));
    }

    #[test]
    fn test_add_text_validates_page() {
        let service = service_with(pages(2));
        let request = TextInsertion {
            page: 2,
            x: 72.0,
            y: 72.0,
            text: "Hi".to_string(),
            style: TextStyle::default(),
        };
        let result = service.add_text(Path::new("in.pdf"), Path::new("out.pdf"), &request);
        assert_eq!(result.failure_ref().map(|e| e.kind()), Some(ErrorKind::Validation));

        let request = TextInsertion { page: 1, ..request };
        let summary = service
            .add_text(Path::new("in.pdf"), Path::new("out.pdf"), &request)
            .into_result()
            .unwrap();
        assert_eq!(summary.message, "Text added to page 1");
        let (origin, text, _) = &saved(&service).unwrap().pages[1].inserted_text[0];
        assert_eq!(*origin, Point::new(72.0, 72.0));
        assert_eq!(text, "Hi");
    }

    #[test]
    fn test_add_image_placement() {
        let dir = TempDir::new().unwrap();
        let image_path = dir.path().join("logo.png");
        std::fs::write(&image_path, b"not empty").unwrap();

        let service = service_with(pages(1));
        let request = ImageInsertion {
            image_path: image_path.clone(),
            page: 0,
            x: 10.0,
            y: 20.0,
            width: Some(100.0),
            height: Some(50.0),
        };
        service
            .add_image(Path::new("in.pdf"), Path::new("out.pdf"), &request)
            .into_result()
            .unwrap();
        assert_eq!(
            saved(&service).unwrap().pages[0].images,
            vec![ImagePlacement::Fit(Rect::new(10.0, 20.0, 110.0, 70.0))]
        );

        let missing = ImageInsertion {
            image_path: dir.path().join("missing.png"),
            width: None,
            ..request
        };
        let result = service.add_image(Path::new("in.pdf"), Path::new("out.pdf"), &missing);
        assert!(matches!(result.failure_ref(), Some(OperationError::SourceNotFound(_))));
    }

    #[test]
    fn test_get_info_reports_pages_and_metadata() {
        let metadata = DocumentMetadata {
            title: "Report".to_string(),
            author: "Ops".to_string(),
            ..Default::default()
        };
        let service = service_with(
            FakeDocument::new(vec![
                FakePage::new("p0"),
                FakePage::new("p1").with_size(842.0, 595.0).with_rotation(90),
            ])
            .with_metadata(metadata.clone()),
        );
        let info = service.get_info(Path::new("in.pdf")).into_result().unwrap();

        assert_eq!(info.page_count, 2);
        assert_eq!(info.pages[1].page_number, 1);
        assert_eq!(info.pages[1].width, 842.0);
        assert_eq!(info.pages[1].rotation, 90);
        assert_eq!(info.metadata, metadata);
    }

    #[test]
    fn test_engine_failure_is_folded_into_result() {
        let service = DocumentOperationService::new(FakeEngine::new());
        let result = service.get_info(Path::new("nowhere.pdf"));
        assert!(!result.success);
        assert_eq!(result.failure_ref().map(|e| e.kind()), Some(ErrorKind::Engine));
        assert!(result.error.unwrap().starts_with("PDF engine error"));
    }
}
