//! Extraction Service routes
//!
//! - `POST /api/v1/parse` – multipart upload with a `file` field (PDF or DOCX).
//!   Returns `{ "filename": string | null, "content": markdown }`.
//! - `GET /ping` – liveness probe, `{ "message": "pong" }`.
//!
//! The declared content type is checked before the upload body is read or the
//! engine is called; anything other than PDF/DOCX is answered with 415.

use crate::error::PipelineError;
use crate::input::file_detector::DocumentFormat;
use crate::input::manager::{Document, ExtractionEngine};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

const UPLOAD_FIELD: &str = "file";
const UNSUPPORTED_MESSAGE: &str = "Unsupported file type. Please upload a PDF or DOCX file.";

/// Build the Extraction Service router.
pub fn create_router(engine: Arc<ExtractionEngine>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/v1/parse", post(parse_resume))
        .route("/ping", get(ping))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(engine)
}

/// Success response for `POST /api/v1/parse`.
#[derive(Serialize)]
struct ParseResponse {
    filename: Option<String>,
    content: String,
}

async fn parse_resume(
    State(engine): State<Arc<ExtractionEngine>>,
    mut multipart: Multipart,
) -> Result<Json<ParseResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let format = DocumentFormat::from_content_type(&content_type).map_err(|e| {
            warn!("Rejected upload {:?}: {}", filename, e);
            ApiError::from(e)
        })?;

        let bytes = field.bytes().await?;
        let mut document = Document::new(bytes.to_vec(), format);
        if let Some(name) = filename.clone() {
            document = document.with_filename(name);
        }

        let content = engine.extract(&document).await.map_err(|e| {
            error!(
                "Error parsing resume file ({}, {} format, {} bytes): {}",
                e.kind(),
                format,
                document.bytes.len(),
                e
            );
            ApiError::from(e)
        })?;

        info!(
            "Parsed {:?} ({} format, {} bytes)",
            filename,
            format,
            document.bytes.len()
        );
        return Ok(Json(ParseResponse { filename, content }));
    }

    Err(ApiError::new(
        StatusCode::BAD_REQUEST,
        format!("Missing '{}' field in multipart upload.", UPLOAD_FIELD),
    ))
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "message": "pong" }))
}

/// Error response carrying a short, caller-safe `detail` message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let status = err.status_code();
        let detail = match &err {
            PipelineError::UnsupportedFormat(_) => UNSUPPORTED_MESSAGE.to_string(),
            PipelineError::Validation(message) => message.clone(),
            PipelineError::CorruptDocument(_) => {
                "An unexpected error occurred: the document could not be parsed.".to_string()
            }
            PipelineError::Io(_) => {
                "An unexpected error occurred: temporary storage failure.".to_string()
            }
            _ => "An unexpected error occurred.".to_string(),
        };
        Self { status, detail }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        warn!("Malformed multipart upload: {}", err);
        Self::new(err.status(), err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
