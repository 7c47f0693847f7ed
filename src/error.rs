//! Error types shared by the dataset pipeline, recommenders and evaluator.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MindError>;

#[derive(Debug, Error)]
pub enum MindError {
    /// Split name not present in the configured split mapping
    #[error("Unknown split '{split}'. Expected one of {valid:?}")]
    UnknownSplit { split: String, valid: Vec<String> },
    /// Recommender name not present in the model registry
    #[error("Unknown model '{name}'. Expected one of {valid:?}")]
    UnknownModel { name: String, valid: Vec<String> },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Raw split file or cache table missing on disk
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },
    /// A recommender was asked to score before `fit`
    #[error("Model '{0}' must be fit() before calling score()")]
    NotFitted(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Cache content that cannot be turned back into canonical records
    #[error("Failed to decode {} row {row}: {message}", path.display())]
    Decode {
        path: PathBuf,
        row: usize,
        message: String,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MindError {
    /// Maps an I/O failure on `path` to `NotFound` when the file is missing.
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            MindError::NotFound { path: path.into() }
        } else {
            MindError::Io(err)
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MindError::UnknownSplit { .. } | MindError::UnknownModel { .. } | MindError::InvalidConfig(_)
        )
    }
}
