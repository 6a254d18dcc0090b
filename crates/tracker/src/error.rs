use storage::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Ingestion failed: {0}")]
    Ingestion(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<StorageError> for TrackerError {
    fn from(error: StorageError) -> Self {
        if error.is_connection_error() {
            TrackerError::StoreUnavailable(error.to_string())
        } else {
            TrackerError::Storage(error)
        }
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(error: reqwest::Error) -> Self {
        TrackerError::Extraction(format!("model request failed: {}", error))
    }
}
