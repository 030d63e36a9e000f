//! Error types for PDF signing operations.
//! Error handling types and result definitions shared by every layer.

use thiserror::Error;

/// Result type for signing operations
pub type SigningResult<T> = Result<T, SigningError>;

/// Comprehensive error types for signing operations
#[derive(Error, Debug, miette::Diagnostic)]
pub enum SigningError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Document engine could not be loaded: {0}")]
    EngineLoadError(String),

    #[error("Document engine call failed: {0}")]
    EngineError(String),

    #[error("Malformed document engine response: {0}")]
    EngineResponseError(String),

    #[error("Signing callback failed: {0}")]
    SignerError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Revocation data error: {0}")]
    RevocationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<reqwest::Error> for SigningError {
    fn from(error: reqwest::Error) -> Self {
        SigningError::NetworkError(error.to_string())
    }
}

impl From<std::io::Error> for SigningError {
    fn from(error: std::io::Error) -> Self {
        SigningError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for SigningError {
    fn from(error: serde_json::Error) -> Self {
        SigningError::EngineResponseError(error.to_string())
    }
}

impl From<base64::DecodeError> for SigningError {
    fn from(error: base64::DecodeError) -> Self {
        SigningError::RevocationError(format!("base64 decode failed: {error}"))
    }
}

#[cfg(feature = "native-engine")]
impl From<libloading::Error> for SigningError {
    fn from(error: libloading::Error) -> Self {
        SigningError::EngineLoadError(error.to_string())
    }
}
