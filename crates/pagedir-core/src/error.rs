use thiserror::Error;

/// Everything that can go wrong outside the UI loop
///
/// Favicon failures and preference store faults never show up here: the
/// first are absorbed by the fallback chain, the second by defaults.
#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Export failed: {0}")]
    ExportError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<pagedir_api::GitHubError> for Error {
    fn from(err: pagedir_api::GitHubError) -> Self {
        Error::ApiError(err.to_string())
    }
}
