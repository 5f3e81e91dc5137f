//! Application errors.

use hoops_ui_core::ServiceError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Service {0} does not take a configuration")]
    NotResettable(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub type AppResult<T> = Result<T, AppError>;
