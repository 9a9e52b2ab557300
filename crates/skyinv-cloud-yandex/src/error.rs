//! Yandex Cloud provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum YandexError {
    #[error("IAM token exchange failed: {0}")]
    AuthenticationFailed(String),

    #[error("{operation} returned HTTP {status}: {message}")]
    Api {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] skyinv_config::ConfigError),
}

impl From<YandexError> for skyinv_cloud::CloudError {
    fn from(err: YandexError) -> Self {
        match err {
            YandexError::Config(skyinv_config::ConfigError::MissingEnv(missing)) => {
                skyinv_cloud::CloudError::MissingEnv(missing)
            }
            YandexError::Config(other) => skyinv_cloud::CloudError::InvalidConfig(other.to_string()),
            YandexError::Api { operation, status, message } => skyinv_cloud::CloudError::Api {
                operation,
                message: format!("HTTP {}: {}", status, message),
            },
            other => skyinv_cloud::CloudError::api("Yandex Cloud API", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, YandexError>;
