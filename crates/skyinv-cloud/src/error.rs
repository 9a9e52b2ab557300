//! Cloud provider error types

use thiserror::Error;

/// Cloud provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    /// Required environment variables or provider settings are absent
    #[error("You must set this ENVs: {}", .0.join(", "))]
    MissingEnv(Vec<String>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A listing call against the provider failed
    #[error("{operation} failed: {message}")]
    Api { operation: String, message: String },

    /// The provider or capability is not supported
    #[error("Not implemented yet: {0}")]
    NotImplemented(String),
}

impl CloudError {
    pub fn api(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::Api {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error reports missing feature support rather than a live failure
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented(_))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
