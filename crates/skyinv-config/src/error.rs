use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Every variable that was unset or empty, in the order requested
    #[error("You must set this ENVs: {}", .0.join(", "))]
    MissingEnv(Vec<String>),

    #[error("Not have implemented yet: cloud type {0:?}")]
    UnsupportedProvider(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
