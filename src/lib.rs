//! Resume pipeline library: document extraction and text embedding services

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod processing;

pub use config::Config;
pub use error::{PipelineError, Result};
