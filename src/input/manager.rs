//! Extraction engine: bytes in, canonical markdown out

use crate::config::ExtractionConfig;
use crate::error::{PipelineError, Result};
use crate::input::file_detector::DocumentFormat;
use crate::input::text_extractor::{extractor_for, TextExtractor};
use crate::processing::markdown::MarkdownNormalizer;
use log::{debug, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tempfile::NamedTempFile;

/// An uploaded document. Never mutated; consumed by one extraction call.
#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub format: DocumentFormat,
    pub filename: Option<String>,
}

impl Document {
    pub fn new(bytes: Vec<u8>, format: DocumentFormat) -> Self {
        Self {
            bytes,
            format,
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Build a document from a declared MIME type, rejecting anything outside
    /// the supported set.
    pub fn from_upload(
        bytes: Vec<u8>,
        content_type: &str,
        filename: Option<String>,
    ) -> Result<Self> {
        let format = DocumentFormat::from_content_type(content_type)?;
        Ok(Self {
            bytes,
            format,
            filename,
        })
    }
}

pub struct ExtractionEngine {
    temp_dir: Option<PathBuf>,
    normalizer: MarkdownNormalizer,
    select_extractor: fn(DocumentFormat) -> &'static dyn TextExtractor,
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionEngine {
    pub fn new() -> Self {
        Self {
            temp_dir: None,
            normalizer: MarkdownNormalizer::new(),
            select_extractor: extractor_for,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new().with_temp_dir(config.temp_dir.clone())
    }

    /// Directory for temporary copies; the system temp dir when `None`.
    pub fn with_temp_dir(mut self, temp_dir: Option<PathBuf>) -> Self {
        self.temp_dir = temp_dir;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_extractor_selector(
        mut self,
        select_extractor: fn(DocumentFormat) -> &'static dyn TextExtractor,
    ) -> Self {
        self.select_extractor = select_extractor;
        self
    }

    /// Extract a document's text and normalize it to markdown.
    ///
    /// The payload is written to a temporary file with the format's extension
    /// and that file is removed before this returns, whatever the outcome.
    pub async fn extract(&self, document: &Document) -> Result<String> {
        if document.bytes.is_empty() {
            return Err(PipelineError::Validation(
                "Uploaded document is empty".to_string(),
            ));
        }

        let start_time = Instant::now();
        let format = document.format;
        let temp_file = self.write_temp_file(document)?;
        let path = temp_file.path().to_path_buf();
        debug!("Wrote {} bytes to {}", document.bytes.len(), path.display());

        let select_extractor = self.select_extractor;
        let joined =
            tokio::task::spawn_blocking(move || select_extractor(format).extract(&path)).await;

        // Remove the temporary copy before looking at the outcome.
        let cleanup = temp_file.close();

        let raw_text = match joined {
            Ok(outcome) => outcome?,
            Err(join_error) if join_error.is_panic() => {
                return Err(PipelineError::CorruptDocument(format!(
                    "{} parser aborted on malformed input",
                    format
                )));
            }
            Err(join_error) => {
                return Err(PipelineError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    join_error.to_string(),
                )));
            }
        };
        cleanup?;

        if raw_text.trim().is_empty() {
            warn!(
                "No extractable text in {} document ({} bytes)",
                format,
                document.bytes.len()
            );
        }

        let markdown = self.normalizer.normalize(&raw_text);
        info!(
            "Extracted {} characters from {} document in {:.2?}",
            markdown.chars().count(),
            format,
            start_time.elapsed()
        );
        Ok(markdown)
    }

    fn write_temp_file(&self, document: &Document) -> Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("resume-").suffix(document.format.extension());

        let mut temp_file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        temp_file.write_all(&document.bytes)?;
        temp_file.flush()?;
        Ok(temp_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir_entries(dir: &tempfile::TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    struct PanickingExtractor;

    impl TextExtractor for PanickingExtractor {
        fn extract(&self, path: &std::path::Path) -> Result<String> {
            assert!(path.exists(), "temp file must exist while parsing");
            panic!("parser hit an unreachable branch");
        }
    }

    fn panicking_extractor(_format: DocumentFormat) -> &'static dyn TextExtractor {
        &PanickingExtractor
    }

    #[tokio::test]
    async fn test_parser_panic_is_corrupt_document_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ExtractionEngine::new()
            .with_temp_dir(Some(dir.path().to_path_buf()))
            .with_extractor_selector(panicking_extractor);

        for format in [DocumentFormat::Pdf, DocumentFormat::Docx] {
            let document = Document::new(b"looks fine, parses badly".to_vec(), format);
            let result = engine.extract(&document).await;
            assert!(
                matches!(result, Err(PipelineError::CorruptDocument(_))),
                "expected CorruptDocument, got {:?}",
                result
            );
            assert_eq!(temp_dir_entries(&dir), 0);
        }
    }

    #[tokio::test]
    async fn test_empty_payload_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ExtractionEngine::new().with_temp_dir(Some(dir.path().to_path_buf()));
        let document = Document::new(Vec::new(), DocumentFormat::Pdf);

        let result = engine.extract(&document).await;
        assert!(matches!(result, Err(PipelineError::Validation(_))));
        assert_eq!(temp_dir_entries(&dir), 0);
    }

    #[tokio::test]
    async fn test_corrupt_docx_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ExtractionEngine::new().with_temp_dir(Some(dir.path().to_path_buf()));
        let document = Document::new(b"not a zip archive".to_vec(), DocumentFormat::Docx);

        let result = engine.extract(&document).await;
        assert!(matches!(result, Err(PipelineError::CorruptDocument(_))));
        assert_eq!(temp_dir_entries(&dir), 0);
    }

    #[tokio::test]
    async fn test_missing_temp_dir_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let engine = ExtractionEngine::new().with_temp_dir(Some(missing));
        let document = Document::new(b"%PDF-1.4".to_vec(), DocumentFormat::Pdf);

        let result = engine.extract(&document).await;
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }

    #[test]
    fn test_from_upload_rejects_unknown_content_type() {
        let result = Document::from_upload(b"hello".to_vec(), "text/plain", None);
        assert!(matches!(result, Err(PipelineError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_from_upload_keeps_filename() {
        let document = Document::from_upload(
            b"%PDF".to_vec(),
            "application/pdf",
            Some("cv.pdf".to_string()),
        )
        .unwrap();
        assert_eq!(document.format, DocumentFormat::Pdf);
        assert_eq!(document.filename.as_deref(), Some("cv.pdf"));
    }
}
