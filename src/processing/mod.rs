//! Text normalization and embedding module

pub mod embeddings;
pub mod markdown;
