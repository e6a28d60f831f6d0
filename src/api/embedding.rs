//! Embedding Service routes
//!
//! - `POST /api/ai/embed` – body `{ "text": "..." }`, returns `{ "embedding": [f32, ...] }`.
//! - `GET /health` – liveness probe, plain `OK`.
//!
//! The model handle is created once at startup and injected as router state.

use crate::error::PipelineError;
use crate::processing::embeddings::ModelHandle;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

const MISSING_TEXT_MESSAGE: &str = "Text field is required.";
const ENCODING_FAILED_MESSAGE: &str = "Failed to generate embedding.";

/// Build the Embedding Service router around an already-loaded model.
pub fn create_router(model: Arc<ModelHandle>) -> Router {
    Router::new()
        .route("/api/ai/embed", post(embed))
        .route("/health", get(health))
        // Any text length is accepted; the model applies its own truncation.
        .layer(DefaultBodyLimit::disable())
        .with_state(model)
}

#[derive(Deserialize)]
struct EmbedRequest {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// The body is parsed by hand so that malformed JSON, a missing field and an
/// empty string all produce the same client error.
async fn embed(
    State(model): State<Arc<ModelHandle>>,
    body: Bytes,
) -> Result<Json<EmbedResponse>, EmbedError> {
    let text = serde_json::from_slice::<EmbedRequest>(&body)
        .ok()
        .and_then(|request| request.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| {
            warn!("Rejected embed request ({} byte body)", body.len());
            EmbedError::from(PipelineError::Validation(MISSING_TEXT_MESSAGE.to_string()))
        })?;

    let text_length = text.len();
    let embedding = model.embed(text).await.map_err(|e| {
        error!("Error encoding text ({} bytes): {}", text_length, e);
        EmbedError::from(e)
    })?;

    Ok(Json(EmbedResponse { embedding }))
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Debug)]
pub struct EmbedError(PipelineError);

impl From<PipelineError> for EmbedError {
    fn from(inner: PipelineError) -> Self {
        Self(inner)
    }
}

impl IntoResponse for EmbedError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            PipelineError::Validation(_) => (StatusCode::BAD_REQUEST, MISSING_TEXT_MESSAGE),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, ENCODING_FAILED_MESSAGE),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
