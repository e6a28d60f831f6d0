//! Error handling for the resume pipeline

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Corrupt document: {0}")]
    CorruptDocument(String),

    #[error("Embedding generation error: {0}")]
    EncodingFailure(String),

    #[error("Model loading error: {0}")]
    ModelLoading(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PipelineError {
    /// HTTP status a service boundary should answer with for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
            PipelineError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Io(_) => "io_failure",
            PipelineError::Validation(_) => "validation",
            PipelineError::UnsupportedFormat(_) => "unsupported_format",
            PipelineError::CorruptDocument(_) => "corrupt_document",
            PipelineError::EncodingFailure(_) => "encoding_failure",
            PipelineError::ModelLoading(_) => "model_loading",
            PipelineError::Configuration(_) => "configuration",
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
