//! Error types for the docx2pdf server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Request-level errors
///
/// Converter and I/O failures collapse into one generic 500 for the caller;
/// the underlying detail is logged server-side only.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Missing API token")]
    MissingApiToken,

    #[error("Invalid API token")]
    InvalidApiToken,

    #[error("No file provided")]
    MissingFile,

    #[error("No file selected")]
    EmptyFilename,

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(#[from] axum::extract::multipart::MultipartError),

    #[error("File too large, maximum is {limit} bytes")]
    FileTooLarge { limit: usize },

    #[error("Conversion error: {0}")]
    Conversion(#[from] convert_engine::ConvertError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::MissingApiToken => {
                (StatusCode::UNAUTHORIZED, "Missing API token".to_string())
            }
            ServerError::InvalidApiToken => {
                (StatusCode::FORBIDDEN, "Invalid API token".to_string())
            }
            ServerError::MissingFile => (StatusCode::BAD_REQUEST, "No file provided".to_string()),
            ServerError::EmptyFilename => {
                (StatusCode::BAD_REQUEST, "No file selected".to_string())
            }
            ServerError::UnsupportedFileType(name) => (
                StatusCode::BAD_REQUEST,
                format!("Unsupported file type: {}", name),
            ),
            ServerError::InvalidUpload(e) => {
                (StatusCode::BAD_REQUEST, format!("Invalid upload: {}", e))
            }
            ServerError::FileTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("File too large, maximum is {} bytes", limit),
            ),
            ServerError::Conversion(e) => {
                tracing::error!("conversion failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Conversion failed".to_string(),
                )
            }
            ServerError::Io(e) => {
                tracing::error!("io error during conversion: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Conversion failed".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
