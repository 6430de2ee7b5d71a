use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("API key is required")]
    MissingApiKey,

    #[error("not a valid directory: {}", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("no items left to translate (excluded files: {excluded_files}, excluded folders: {excluded_folders})")]
    NothingToTranslate {
        excluded_files: usize,
        excluded_folders: usize,
    },

    #[error("every file name translation failed")]
    NothingTranslated,

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response from translation service: {0}")]
    InvalidResponse(String),

    #[error("worker failed: {0}")]
    Worker(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
