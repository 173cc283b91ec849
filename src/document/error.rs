//! Operation error types
//!
//! Failures raised by document operations. Every variant falls into one of
//! three classes (see [`ErrorKind`]) which the HTTP layer maps to status codes.

use std::path::PathBuf;

use thiserror::Error;

/// Broad classification of an [`OperationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was well-formed but violates a document constraint
    Validation,
    /// A request parameter could not be parsed or is out of its domain
    MalformedParameter,
    /// The PDF engine failed to decode, edit or encode a document
    Engine,
}

/// Document operation error
#[derive(Debug, Error)]
pub enum OperationError {
    /// One or more page indices are outside `0..page_count`
    #[error("Invalid page numbers: {pages:?} (document has {page_count} pages)")]
    InvalidPageIndex { pages: Vec<i64>, page_count: usize },

    /// A reorder request does not name every page exactly once by length
    #[error("Order length ({actual}) doesn't match page count ({expected})")]
    OrderLengthMismatch { expected: usize, actual: usize },

    /// A reorder request repeats pages
    #[error("Order is not a permutation, repeated pages: {duplicates:?}")]
    OrderNotPermutation { duplicates: Vec<usize> },

    /// The requested deletion would leave an empty document
    #[error("Cannot delete every page of the document")]
    NoPagesRemaining,

    /// Input files missing before work started
    #[error("Files not found: {0:?}")]
    SourceNotFound(Vec<PathBuf>),

    /// A parameter could not be parsed or is out of range
    #[error("Malformed parameter: {0}")]
    MalformedParameter(String),

    /// Image bytes could not be decoded
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// Catch-all for decode, edit and encode failures in the PDF engine
    #[error("PDF engine error: {0}")]
    Engine(String),
}

/// Result type alias for document operations
pub type Result<T> = std::result::Result<T, OperationError>;

impl OperationError {
    /// Shorthand for [`OperationError::MalformedParameter`]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedParameter(message.into())
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedParameter(_) => ErrorKind::MalformedParameter,
            Self::Engine(_) => ErrorKind::Engine,
            Self::InvalidPageIndex { .. }
            | Self::OrderLengthMismatch { .. }
            | Self::OrderNotPermutation { .. }
            | Self::NoPagesRemaining
            | Self::SourceNotFound(_)
            | Self::UnsupportedImage(_) => ErrorKind::Validation,
        }
    }
}

impl From<lopdf::Error> for OperationError {
    fn from(err: lopdf::Error) -> Self {
        OperationError::Engine(err.to_string())
    }
}

impl From<mupdf::Error> for OperationError {
    fn from(err: mupdf::Error) -> Self {
        OperationError::Engine(err.to_string())
    }
}

impl From<std::io::Error> for OperationError {
    fn from(err: std::io::Error) -> Self {
        OperationError::Engine(format!("IO error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = OperationError::InvalidPageIndex {
            pages: vec![-1, 7],
            page_count: 5,
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            OperationError::malformed("bad list").kind(),
            ErrorKind::MalformedParameter
        );
        assert_eq!(
            OperationError::Engine("broken xref".into()).kind(),
            ErrorKind::Engine
        );
    }

    #[test]
    fn test_invalid_page_message_lists_every_offender() {
        let err = OperationError::InvalidPageIndex {
            pages: vec![-1, 7],
            page_count: 5,
        };
        assert_eq!(
            err.to_string(),
            "Invalid page numbers: [-1, 7] (document has 5 pages)"
        );
    }
}
