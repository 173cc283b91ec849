//! Document operations
//!
//! Engine-independent editing logic: page index validation, match
//! filtering, the redaction pipeline and the operation service that ties
//! them together. The PDF format itself lives behind [`PdfEngine`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use pdfedit_server::document::DocumentOperationService;
//! use pdfedit_server::engine::PdfEditEngine;
//!
//! let service = DocumentOperationService::new(PdfEditEngine::new());
//! let result = service.delete_pages(&input, &output, &[1, 3]);
//! assert!(result.success);
//! ```

pub mod error;
pub mod redact;
pub mod search;
pub mod service;
pub mod traits;
pub mod types;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ErrorKind, OperationError, Result};
pub use service::{DocumentOperationService, ImageInsertion, InstanceReplace, ReplaceAll, TextInsertion};
pub use traits::{EngineDocument, PdfEngine};
pub use types::{
    DocumentInfo, DocumentMetadata, EditSummary, ImagePlacement, MatchRecord, OperationResult,
    PageInfo, Point, Rect, Rgb, SearchOptions, SearchReport, TextAlign, TextStyle, TextboxFit,
};
