//! Configuration management for the resume pipeline services

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Where temporary copies of uploads are written; system temp dir if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub host: String,
    pub port: u16,
    /// HuggingFace repo id, or a folder name under `models_dir`.
    pub model: String,
    pub models_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalize: Option<bool>,
    /// Upper bound on simultaneous encode calls; unbounded if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_encodes: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-pipeline")
            .join("models");

        Self {
            extraction: ExtractionConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                max_upload_bytes: 10 * 1024 * 1024,
                temp_dir: None,
            },
            embedding: EmbeddingConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                model: "minishlab/potion-base-8M".to_string(),
                models_dir,
                normalize: None,
                max_concurrent_encodes: None,
            },
        }
    }
}

impl Config {
    /// Load the config file at `config_path`, writing defaults on first run.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| PipelineError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-pipeline")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.extraction.max_upload_bytes == 0 {
            return Err(PipelineError::Configuration(
                "extraction.max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        if self.embedding.model.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "embedding.model must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
