//! API handlers for the PDF unlock server
//!
//! Provides REST endpoints for:
//! - PDF unlocking
//! - Health checks

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use pdfunlock_core::unlock_document;

use crate::config::AppConfig;
use crate::error::ServerError;
use crate::upload::receive_upload;

/// File name offered to the browser for the unlocked document
pub const DOWNLOAD_FILENAME: &str = "unlocked.pdf";

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
        service: "pdfunlock-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: POST /unlock-pdf
///
/// Expects `multipart/form-data` with the PDF in the `pdfFile` field and
/// answers with the unlocked document as a download.
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn handle_unlock_pdf(
    State(config): State<Arc<AppConfig>>,
    mut multipart: Multipart,
) -> Result<Response, ServerError> {
    let upload = receive_upload(&mut multipart, &config).await?;
    info!(
        "Unlock request: file={:?}, size={} bytes",
        upload.original_name(),
        upload.size()
    );

    let bytes = upload.read().await?;

    // Parsing and serialization are CPU bound
    let outcome = tokio::task::spawn_blocking(move || unlock_document(&bytes))
        .await
        .map_err(|e| ServerError::Internal(format!("Unlock task failed: {}", e)))??;

    let metrics = &outcome.metrics;
    info!(
        "Unlocked {} pages in {}ms: encryption={:?}, output={} bytes",
        metrics.page_count,
        metrics.processing_time_ms,
        metrics.encryption,
        metrics.output_size_bytes
    );

    Ok(pdf_download(outcome.bytes))
}

/// Build a download response for a PDF body
fn pdf_download(bytes: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME);
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}
