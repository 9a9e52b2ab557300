use skyinv_cloud::CloudError;
use skyinv_config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidArguments(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Database have bad endpoint: {0}")]
    BadEndpoint(String),

    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cloud(#[from] CloudError),
}

impl WorkspaceError {
    pub fn store(operation: &str, err: impl std::fmt::Display) -> Self {
        Self::Store(format!("{} failed: {}", operation, err))
    }
}

pub type Result<T> = std::result::Result<T, WorkspaceError>;
