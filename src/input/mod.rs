//! Input processing module
//! Handles format detection, temporary-file staging, and text extraction

pub mod docx;
pub mod file_detector;
pub mod manager;
pub mod text_extractor;

pub use file_detector::DocumentFormat;
pub use manager::{Document, ExtractionEngine};
