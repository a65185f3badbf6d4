use thiserror::Error;

use crate::config::ConfigError;
use crate::export::ExportError;
use crate::extraction::ExtractionError;
use crate::import::ImportError;
use crate::models::InvalidEnum;
use crate::search::SearchError;
use crate::store::StoreError;

/// Every failure a front end can receive from this crate.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    InvalidArgument(#[from] InvalidEnum),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON output error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}
