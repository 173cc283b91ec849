//! PDF download responses

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::document::EditSummary;
use crate::error::{AppError, Result};

pub const OPERATION_MESSAGE: HeaderName = HeaderName::from_static("x-operation-message");
pub const REMOVED_COUNT: HeaderName = HeaderName::from_static("x-removed-count");
pub const REPLACED_COUNT: HeaderName = HeaderName::from_static("x-replaced-count");

/// Headers browsers may read from a cross-origin download
pub const EXPOSED_HEADERS: [HeaderName; 4] = [
    header::CONTENT_DISPOSITION,
    OPERATION_MESSAGE,
    REMOVED_COUNT,
    REPLACED_COUNT,
];

/// An output document read back from its workspace
#[derive(Debug)]
pub struct PdfFile {
    pub bytes: Vec<u8>,
    pub summary: EditSummary,
}

impl PdfFile {
    /// Read the output named by `summary`
    ///
    /// Runs inside the blocking task, before the workspace holding the file
    /// is released.
    pub fn read(summary: EditSummary) -> Result<Self> {
        let bytes = std::fs::read(&summary.output_path).map_err(|e| {
            AppError::Internal(format!(
                "Output file {} was not created: {}",
                summary.output_path.display(),
                e
            ))
        })?;
        Ok(Self { bytes, summary })
    }
}

fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        urlencoding::encode(filename)
    )
}

/// `application/pdf` attachment named `<operation>-<stem>.pdf`
pub fn pdf_response(file: PdfFile, operation: &str, stem: &str) -> Response {
    let filename = format!("{}-{}.pdf", operation, stem);
    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_LENGTH, file.bytes.len())
        .header(header::CONTENT_DISPOSITION, content_disposition(&filename))
        .body(Body::from(file.bytes))
        .unwrap_or_else(|e| {
            AppError::Internal(format!("Failed to build response: {}", e)).into_response()
        });

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&file.summary.message) {
        headers.insert(OPERATION_MESSAGE, value);
    }
    if let Some(count) = file.summary.removed_count {
        headers.insert(REMOVED_COUNT, HeaderValue::from(count));
    }
    if let Some(count) = file.summary.replaced_count {
        headers.insert(REPLACED_COUNT, HeaderValue::from(count));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_content_disposition_escapes_names() {
        assert_eq!(
            content_disposition("redact-a b.pdf"),
            "attachment; filename=\"redact-a_b.pdf\"; filename*=UTF-8''redact-a%20b.pdf"
        );
        assert!(content_disposition("merge-résumé.pdf").is_ascii());
    }

    #[test]
    fn test_pdf_response_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let summary = EditSummary::new("Redacted 3 instances", path).with_removed(3);
        let response = pdf_response(PdfFile::read(summary).unwrap(), "redact", "report");

        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(headers[REMOVED_COUNT], "3");
        assert_eq!(headers[OPERATION_MESSAGE], "Redacted 3 instances");
        assert!(!headers.contains_key(REPLACED_COUNT));
    }

    #[test]
    fn test_missing_output_is_internal() {
        let summary = EditSummary::new("Deleted 1 pages", "/nonexistent/out.pdf".into());
        assert!(matches!(PdfFile::read(summary), Err(AppError::Internal(_))));
    }
}
