use skyinv_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Nat IP not found")]
    NatNotFound,

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InventoryError>;
