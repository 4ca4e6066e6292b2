use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CiStepsError {
    #[error("API request failed with status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("API request failed with status {status} after {retries} retry")]
    ApiErrorAfterRetries { status: u16, retries: u32 },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Missing GitHub token: set GH_TOKEN or pass --token")]
    MissingToken,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {} as JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Expected a JSON array in {}", path.display())]
    NotAnArray { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, CiStepsError>;
