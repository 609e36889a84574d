// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("authentication failed (session cookies invalid or expired)")]
    AuthInvalid,
    #[error("no credentials found (expected cookies.json or .env in the project root)")]
    AuthMissing,
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("network middleware error: {0}")]
    NetworkMiddleware(#[from] reqwest_middleware::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("temp file persist failed: {0}")]
    TempFilePersist(#[from] tempfile::PersistError),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("could not parse API response from '{url}': {source}")]
    ApiParseFailed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("interrupted by user")]
    UserInterrupt,
    #[error("{0}")] // printed as-is, no prefix
    UserInputError(String),
    #[error("unknown error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;
