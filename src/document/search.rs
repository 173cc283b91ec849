//! Text search
//!
//! Candidate rects come from the engine's locate primitive; each candidate
//! is re-read from the page (one extraction per page) and filtered here, so case sensitivity and
//! whole-word matching do not depend on how the engine searches.

use std::collections::VecDeque;

use super::error::Result;
use super::traits::EngineDocument;
use super::types::{MatchRecord, Rect, SearchOptions};

/// Decides whether the text extracted from a candidate rect is a match
#[derive(Debug, Clone)]
pub struct MatchFilter {
    query: String,
    case_sensitive: bool,
    whole_word: bool,
}

impl MatchFilter {
    pub fn new(query: &str, options: &SearchOptions) -> Self {
        Self {
            query: normalize(query, options.case_sensitive),
            case_sensitive: options.case_sensitive,
            whole_word: options.whole_word,
        }
    }

    /// `extracted` is expected to be trimmed already
    pub fn accepts(&self, extracted: &str) -> bool {
        let candidate = normalize(extracted, self.case_sensitive);
        if self.whole_word {
            candidate == self.query
        } else {
            candidate.contains(&self.query)
        }
    }
}

fn normalize(text: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

/// Lazy sequence of matches across a document
///
/// Pages are searched one at a time as the iterator is advanced. The first
/// engine error is yielded and ends the sequence.
pub struct SearchMatches<'d, D: EngineDocument> {
    doc: &'d mut D,
    query: String,
    filter: MatchFilter,
    max_hits: usize,
    include_context: bool,
    next_page: usize,
    page_count: usize,
    pending: VecDeque<MatchRecord>,
    done: bool,
}

impl<'d, D: EngineDocument> SearchMatches<'d, D> {
    pub fn new(doc: &'d mut D, query: &str, options: &SearchOptions) -> Self {
        let page_count = doc.page_count();
        Self {
            doc,
            query: query.to_string(),
            filter: MatchFilter::new(query, options),
            max_hits: options.max_hits,
            include_context: options.include_context,
            next_page: 0,
            page_count,
            pending: VecDeque::new(),
            done: false,
        }
    }

    fn search_page(&mut self, page: usize) -> Result<()> {
        let rects = self.doc.search_page(page, &self.query, self.max_hits)?;
        if rects.is_empty() {
            return Ok(());
        }

        // Candidates first, then one context band per candidate
        let mut regions = rects.clone();
        if self.include_context {
            let page_width = self.doc.page_info(page)?.width;
            regions.extend(rects.iter().map(|r| Rect::new(0.0, r.y0, page_width, r.y1)));
        }
        let texts = self.doc.extract_text(page, &regions)?;
        let (extracted, bands) = texts.split_at(rects.len().min(texts.len()));

        for (i, (rect, text)) in rects.iter().zip(extracted).enumerate() {
            let text = text.trim();
            if !self.filter.accepts(text) {
                continue;
            }
            self.pending.push_back(MatchRecord {
                page,
                text: text.to_string(),
                rect: *rect,
                context: bands.get(i).map(|band| band.trim().to_string()),
            });
        }

        Ok(())
    }
}

impl<D: EngineDocument> Iterator for SearchMatches<'_, D> {
    type Item = Result<MatchRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }
            if self.done || self.next_page >= self.page_count {
                return None;
            }

            let page = self.next_page;
            self.next_page += 1;
            if let Err(err) = self.search_page(page) {
                self.done = true;
                return Some(Err(err));
            }
        }
    }
}
