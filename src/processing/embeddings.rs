//! Embeddings generation using Model2Vec
//!
//! The model is loaded once at service startup and shared by every request
//! through a [`ModelHandle`]. Encoding runs on tokio's blocking pool so a slow
//! or panicking call never stalls the async workers or takes the service down.

use crate::config::EmbeddingConfig;
use crate::error::{PipelineError, Result};
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

/// A text embedding model. Implementations must tolerate concurrent `encode`
/// calls through a shared reference.
pub trait Embedder: Send + Sync {
    /// Fixed output dimensionality.
    fn dimension(&self) -> usize;

    fn encode(&self, text: &str) -> Result<Vec<f32>>;
}

/// Model2Vec static embedding model.
pub struct EmbeddingEngine {
    model: StaticModel,
    model_name: String,
    dimension: usize,
}

impl EmbeddingEngine {
    /// Load the model named in the config. Blocking; call before serving.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let source = Self::get_model_path(config);
        let start_time = Instant::now();

        info!("Loading Model2Vec embedding model from: {}", source.display());

        let model = StaticModel::from_pretrained(
            &source,
            None, // token
            config.normalize,
            None, // subfolder
        )
        .map_err(|e| PipelineError::ModelLoading(format!("Failed to load model: {}", e)))?;

        // Probe the output width once so every response can be checked against it.
        let dimension = model.encode_single("dimension probe").len();
        if dimension == 0 {
            return Err(PipelineError::ModelLoading(
                "Model produced an empty embedding".to_string(),
            ));
        }

        info!(
            "Model {} loaded in {:.2?} ({} dimensions)",
            config.model,
            start_time.elapsed(),
            dimension
        );

        Ok(Self {
            model,
            model_name: config.model.clone(),
            dimension,
        })
    }

    /// A folder under `models_dir` wins over a HuggingFace repo id of the same name.
    fn get_model_path(config: &EmbeddingConfig) -> PathBuf {
        let local_path = config.models_dir.join(&config.model);
        if local_path.exists() {
            return local_path;
        }
        PathBuf::from(&config.model)
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl Embedder for EmbeddingEngine {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.model.encode_single(text);
        if embedding.len() != self.dimension {
            return Err(PipelineError::EncodingFailure(format!(
                "Expected {} dimensions, model returned {}",
                self.dimension,
                embedding.len()
            )));
        }
        Ok(embedding)
    }
}

/// The process-wide model instance handed to request handlers.
///
/// With `max_concurrent` set, at most that many encode calls are in flight at
/// once; `Some(1)` serializes all access to the model.
pub struct ModelHandle {
    embedder: Arc<dyn Embedder>,
    gate: Option<Arc<Semaphore>>,
}

impl ModelHandle {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            gate: None,
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: Option<usize>) -> Self {
        self.gate = max_concurrent
            .filter(|n| *n > 0)
            .map(|n| Arc::new(Semaphore::new(n)));
        self
    }

    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// Embed one text. Panics inside the model surface as `EncodingFailure`.
    ///
    /// The gate permit is held until the blocking encode returns, even if this
    /// future is dropped first.
    pub async fn embed(&self, text: String) -> Result<Vec<f32>> {
        let permit = match &self.gate {
            Some(gate) => Some(Arc::clone(gate).acquire_owned().await.map_err(|e| {
                PipelineError::EncodingFailure(format!("Model gate closed: {}", e))
            })?),
            None => None,
        };

        let start_time = Instant::now();
        let text_length = text.len();
        let embedder = Arc::clone(&self.embedder);

        let embedding = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            embedder.encode(&text)
        })
        .await
        .map_err(|e| PipelineError::EncodingFailure(format!("Encoding task failed: {}", e)))??;

        debug!(
            "Encoded {} bytes of text in {:.2?}",
            text_length,
            start_time.elapsed()
        );
        Ok(embedding)
    }
}
