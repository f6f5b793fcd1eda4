//! Error types for configuration transfers

use std::path::PathBuf;

use kbc_client::ApiError;

use crate::settings::SettingsError;

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("The input table {} is missing", .0.display())]
    MissingInputTable(PathBuf),

    #[error("Invalid bucket id '{0}', expected '<stage>.c-<name>'")]
    InvalidBucketId(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransferError>;
