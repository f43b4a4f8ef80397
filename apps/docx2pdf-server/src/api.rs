//! API handlers for the docx2pdf server
//!
//! Provides REST endpoints for:
//! - Health checking
//! - Authenticated document-to-PDF conversion

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::files::ConversionJob;
use crate::AppState;

/// Header carrying the shared-secret credential
pub const API_TOKEN_HEADER: &str = "x-api-token";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "docx2pdf-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: POST /convert
///
/// Authenticates, stages the upload under a per-request name, runs the
/// converter, and streams the PDF back. Working files are removed on every
/// exit path when the job drops.
pub async fn handle_convert(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    authenticate(&headers, state.secret.as_deref())?;

    let (file_name, bytes) = read_upload(multipart).await?;
    if bytes.len() > state.max_upload_bytes {
        return Err(ServerError::FileTooLarge {
            limit: state.max_upload_bytes,
        });
    }

    info!("convert request: name={}, {} bytes", file_name, bytes.len());

    let job = ConversionJob::stage(&state.work_dir, &file_name, &bytes).await?;
    let pdf_path = state
        .converter
        .convert_to_pdf(&job.input_path, &state.work_dir)
        .await?;
    let pdf_bytes = tokio::fs::read(&pdf_path).await?;

    debug!(
        "conversion done: {} -> {} ({} bytes)",
        file_name,
        job.download_name,
        pdf_bytes.len()
    );

    let disposition = format!("attachment; filename={}", job.download_name);
    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        pdf_bytes,
    )
        .into_response())
}

/// Check the credential header against the configured secret
///
/// Missing header and wrong token are distinct failures (401 vs 403). With
/// no secret configured, every presented token mismatches.
fn authenticate(headers: &HeaderMap, secret: Option<&str>) -> Result<(), ServerError> {
    let presented = headers
        .get(API_TOKEN_HEADER)
        .ok_or(ServerError::MissingApiToken)?;
    let presented = presented
        .to_str()
        .map_err(|_| ServerError::InvalidApiToken)?;

    let Some(secret) = secret else {
        return Err(ServerError::InvalidApiToken);
    };

    if !tokens_match(presented, secret) {
        return Err(ServerError::InvalidApiToken);
    }
    Ok(())
}

/// Constant-time token comparison via digest equality
fn tokens_match(presented: &str, expected: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// Pull the uploaded file out of the multipart body
///
/// The first field carrying a filename is the upload; text-only fields are
/// skipped.
async fn read_upload(mut multipart: Multipart) -> Result<(String, Bytes), ServerError> {
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        if name.is_empty() {
            return Err(ServerError::EmptyFilename);
        }
        let bytes = field.bytes().await?;
        return Ok((name, bytes));
    }
    Err(ServerError::MissingFile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_token(token: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(API_TOKEN_HEADER, HeaderValue::from_static(token));
        headers
    }

    #[test]
    fn authenticate_rejects_missing_header() {
        let err = authenticate(&HeaderMap::new(), Some("secret")).unwrap_err();
        assert!(matches!(err, ServerError::MissingApiToken));
    }

    #[test]
    fn authenticate_rejects_wrong_token() {
        let err = authenticate(&headers_with_token("wrong"), Some("secret")).unwrap_err();
        assert!(matches!(err, ServerError::InvalidApiToken));
    }

    #[test]
    fn authenticate_accepts_matching_token() {
        assert!(authenticate(&headers_with_token("secret"), Some("secret")).is_ok());
    }

    #[test]
    fn authenticate_without_configured_secret_never_matches() {
        let err = authenticate(&headers_with_token("anything"), None).unwrap_err();
        assert!(matches!(err, ServerError::InvalidApiToken));
    }

    #[test]
    fn token_comparison_is_case_sensitive() {
        assert!(!tokens_match("Secret", "secret"));
        assert!(tokens_match("secret", "secret"));
    }

    #[tokio::test]
    async fn health_reports_service_name() {
        let response = handle_health().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.service, "docx2pdf-server");
    }
}
