//! Text extraction from the supported document formats
//!
//! Extractors read from a filesystem path and are blocking; callers run them
//! on a blocking thread.

use crate::error::{PipelineError, Result};
use crate::input::docx;
use crate::input::file_detector::DocumentFormat;
use std::path::Path;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> Result<String>;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        pdf_extract::extract_text(path).map_err(|e| {
            PipelineError::CorruptDocument(format!("Failed to extract text from PDF: {}", e))
        })
    }
}

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let paragraphs = docx::read_paragraphs(path)?;
        Ok(paragraphs.join("\n"))
    }
}

/// Pick the extractor for a format.
pub fn extractor_for(format: DocumentFormat) -> &'static dyn TextExtractor {
    match format {
        DocumentFormat::Pdf => &PdfExtractor,
        DocumentFormat::Docx => &DocxExtractor,
    }
}
