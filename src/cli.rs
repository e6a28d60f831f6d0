//! CLI interface for the resume pipeline

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-pipeline")]
#[command(about = "Resume document extraction and text embedding services")]
#[command(long_about = "Run the extraction service (PDF/DOCX to markdown) or the embedding service (text to vector), or extract a local file once")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the extraction service
    Extraction {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Load the embedding model and run the embedding service
    Embedding {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// HuggingFace repo id or local model folder
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Extract a local PDF or DOCX file to markdown on stdout
    Extract {
        /// Path to the document
        file: PathBuf,

        /// Declared MIME type; inferred from the extension when omitted
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,
}

impl Commands {
    /// `config path` and `config reset` must work even when the file on disk
    /// is unreadable.
    pub fn reads_config(&self) -> bool {
        !matches!(
            self,
            Commands::Config {
                action: Some(ConfigAction::Path | ConfigAction::Reset)
            }
        )
    }
}

/// Infer a MIME type from the file extension.
pub fn content_type_for_path(path: &Path) -> Result<&'static str, String> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| "File has no extension".to_string())?;

    crate::input::DocumentFormat::from_extension(ext)
        .map(|format| format.content_type())
        .ok_or_else(|| format!("Unsupported file extension: .{}. Allowed: pdf, docx", ext))
}
