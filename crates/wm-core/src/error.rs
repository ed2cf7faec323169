use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectorError {
    #[error("Evals file not found: {}", path.display())]
    DataNotFound { path: PathBuf },
    #[error("Artifact not found: {}", path.display())]
    ArtifactNotFound { path: PathBuf },
    #[error("Need at least {required} examples for optimization, found {found}")]
    InsufficientData { found: usize, required: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SelectorError {
    /// True for the "file is missing" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DataNotFound { .. } | Self::ArtifactNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, SelectorError>;
