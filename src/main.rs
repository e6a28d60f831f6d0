//! Resume pipeline: document extraction and embedding services

use clap::Parser;
use log::{error, info};
use resume_pipeline::api;
use resume_pipeline::cli::{self, Cli, Commands, ConfigAction};
use resume_pipeline::input::{Document, ExtractionEngine};
use resume_pipeline::processing::embeddings::{EmbeddingEngine, ModelHandle};
use resume_pipeline::{Config, PipelineError, Result};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = if cli.command.reads_config() {
        match Config::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load configuration: {}", e);
                process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    if let Err(e) = run_command(cli.command, config, config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: PathBuf) -> Result<()> {
    match command {
        Commands::Extraction { host, port } => {
            if let Some(host) = host {
                config.extraction.host = host;
            }
            if let Some(port) = port {
                config.extraction.port = port;
            }

            let settings = &config.extraction;
            let engine = Arc::new(ExtractionEngine::from_config(settings));
            let app = api::extraction::create_router(engine, settings.max_upload_bytes);
            api::serve(app, &settings.host, settings.port, "Extraction service").await
        }

        Commands::Embedding { host, port, model } => {
            if let Some(host) = host {
                config.embedding.host = host;
            }
            if let Some(port) = port {
                config.embedding.port = port;
            }
            if let Some(model) = model {
                config.embedding.model = model;
            }

            let settings = config.embedding.clone();
            // Load before binding so no request ever sees a cold model.
            let engine = tokio::task::spawn_blocking({
                let settings = settings.clone();
                move || EmbeddingEngine::from_config(&settings)
            })
            .await
            .map_err(|e| PipelineError::ModelLoading(format!("Model loading task failed: {}", e)))??;

            info!("Serving embeddings from {}", engine.model_name());
            let handle = ModelHandle::new(Arc::new(engine))
                .with_max_concurrent(settings.max_concurrent_encodes);
            let app = api::embedding::create_router(Arc::new(handle));
            api::serve(app, &settings.host, settings.port, "Embedding service").await
        }

        Commands::Extract { file, content_type } => {
            let content_type = match content_type {
                Some(content_type) => content_type,
                None => cli::content_type_for_path(&file)
                    .map_err(PipelineError::Validation)?
                    .to_string(),
            };

            let bytes = tokio::fs::read(&file).await?;
            let filename = file
                .file_name()
                .map(|name| name.to_string_lossy().to_string());
            let document = Document::from_upload(bytes, &content_type, filename)?;

            let engine = ExtractionEngine::from_config(&config.extraction);
            let markdown = engine.extract(&document).await?;
            println!("{}", markdown);
            Ok(())
        }

        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => {
                let content = toml::to_string_pretty(&config).map_err(|e| {
                    PipelineError::Configuration(format!("Failed to serialize config: {}", e))
                })?;
                println!("{}", content);
                Ok(())
            }
            ConfigAction::Path => {
                println!("{}", config_path.display());
                Ok(())
            }
            ConfigAction::Reset => {
                Config::default().save_to(&config_path)?;
                println!("Configuration reset: {}", config_path.display());
                Ok(())
            }
        },
    }
}
