//! Error types for collaborator boundaries and the HTTP surface.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Failure of a remote collaborator (shopping search, LLM, reviews, marketplace API).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Missing credentials: {0} is not configured")]
    MissingCredentials(&'static str),

    #[error("Request failed: {0}")]
    Transport(#[from] wreq::Error),

    #[error("Rate limited (status {0})")]
    RateLimited(u16),

    #[error("Request failed with status: {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Empty response")]
    Empty,
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Malformed(err.to_string())
    }
}

impl SourceError {
    /// True for overload signals worth retrying (429/503).
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::RateLimited(_))
    }
}

/// Failure while reading or writing a spreadsheet on disk.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to read workbook: {0}")]
    Read(#[from] calamine::XlsxError),

    #[error("Workbook has no worksheet")]
    NoWorksheet,
}

impl SheetError {
    /// True if the file is locked or not writable (e.g. open in a spreadsheet app).
    pub fn is_permission_denied(&self) -> bool {
        match self {
            SheetError::Io(err) => err.kind() == std::io::ErrorKind::PermissionDenied,
            SheetError::Write(rust_xlsxwriter::XlsxError::IoError(err)) => {
                err.kind() == std::io::ErrorKind::PermissionDenied
            }
            _ => false,
        }
    }
}

/// Request-level failure surfaced by the HTTP API.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Kitap bulunamadı: {0}")]
    NotFound(String),

    #[error("Geçersiz istek: {0}")]
    InvalidRequest(String),

    #[error("Kitap arama hatası: {0}")]
    Internal(String),
}

impl ResponseError for SearchError {
    fn status_code(&self) -> StatusCode {
        match self {
            SearchError::NotFound(_) => StatusCode::NOT_FOUND,
            SearchError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SearchError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(json!({ "success": false, "detail": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_messages() {
        assert_eq!(
            SourceError::MissingCredentials("SERP_API_KEY").to_string(),
            "Missing credentials: SERP_API_KEY is not configured"
        );
        assert!(SourceError::Status(500).to_string().contains("500"));
        assert!(SourceError::RateLimited(429).to_string().contains("Rate limited"));
    }

    #[test]
    fn test_is_transient() {
        assert!(SourceError::RateLimited(503).is_transient());
        assert!(!SourceError::Status(400).is_transient());
        assert!(!SourceError::Empty.is_transient());
    }

    #[test]
    fn test_json_error_is_malformed() {
        let err: SourceError =
            serde_json::from_str::<serde_json::Value>("{oops").unwrap_err().into();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn test_sheet_error_permission() {
        let denied = SheetError::Io(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(denied.is_permission_denied());

        let missing = SheetError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(!missing.is_permission_denied());
        assert!(!SheetError::NoWorksheet.is_permission_denied());
    }

    #[test]
    fn test_search_error_status_codes() {
        assert_eq!(SearchError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(SearchError::InvalidRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            SearchError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_search_error_message() {
        let err = SearchError::NotFound("Nutuk".into());
        assert_eq!(err.to_string(), "Kitap bulunamadı: Nutuk");
    }
}
