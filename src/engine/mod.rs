//! PDF engine
//!
//! Production [`PdfEngine`]: lopdf owns the object model, edits and
//! serialization; MuPDF locates text, reads metadata and removes redacted
//! content.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              EditableDocument                │
//! │   page list + redaction marks                │
//! └──────────────────────────────────────────────┘
//!          │ edits                   │ text queries
//!          ▼                         ▼
//!   ┌──────────────┐        ┌────────────────┐
//!   │    lopdf     │──save─▶│ MuPDF TextView │
//!   │   Document   │        │ (lazy snapshot)│
//!   └──────────────┘        └────────────────┘
//!          ▲  │ applied marks
//!   reload │  ▼
//!   ┌──────────────┐
//!   │ MuPDF redact │
//!   └──────────────┘
//! ```

mod content;
mod fonts;
mod geometry;
mod handle;
mod image;
mod layout;
mod pages;
mod redaction;
mod text;

#[cfg(test)]
pub(crate) mod fixtures;

use std::path::Path;

use crate::document::{PdfEngine, Result};

pub use fonts::Base14;
pub use handle::EditableDocument;

/// lopdf + MuPDF engine
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfEditEngine;

impl PdfEditEngine {
    pub fn new() -> Self {
        Self
    }
}

impl PdfEngine for PdfEditEngine {
    type Document = EditableDocument;

    fn open(&self, path: &Path) -> Result<EditableDocument> {
        let bytes = std::fs::read(path)?;
        EditableDocument::load(bytes)
    }

    fn create(&self) -> Result<EditableDocument> {
        Ok(EditableDocument::empty())
    }
}
