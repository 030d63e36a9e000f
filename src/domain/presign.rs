//! Pre-signature package returned by the document engine's digest step.

use crate::domain::response::ResponseCode;
use crate::infra::error::{SigningError, SigningResult};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    response_code: Option<i64>,
    #[serde(default)]
    response_status: Option<String>,
    #[serde(default)]
    data: Option<PreSignData>,
}

/// `data` object of the package. Only `digest` is read; everything else is
/// document state the embed step needs and is kept untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct PreSignData {
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(flatten)]
    pub opaque: Map<String, Value>,
}

/// Decoded engine answer plus the exact text it was decoded from.
#[derive(Debug, Clone)]
pub struct PreSignPackage {
    response_code: Option<i64>,
    response_status: Option<String>,
    data: Option<PreSignData>,
    raw: String,
}

impl PreSignPackage {
    /// Decode the engine's JSON. Blank input is a decoding failure.
    pub fn parse(raw: impl Into<String>) -> SigningResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SigningError::EngineResponseError(
                "empty pre-sign package".to_string(),
            ));
        }
        let envelope: Envelope = serde_json::from_str(&raw)?;
        Ok(Self {
            response_code: envelope.response_code,
            response_status: envelope.response_status,
            data: envelope.data,
            raw,
        })
    }

    /// Engine outcome; a missing code counts as unrecognized.
    #[must_use]
    pub fn code(&self) -> ResponseCode {
        self.response_code
            .map_or(ResponseCode::ProcessingFailed, ResponseCode::from_engine)
    }

    #[must_use]
    pub fn raw_code(&self) -> Option<i64> {
        self.response_code
    }

    #[must_use]
    pub fn engine_status(&self) -> Option<&str> {
        self.response_status.as_deref()
    }

    /// Digest to sign. A successful package without one breaks the engine contract.
    pub fn digest(&self) -> SigningResult<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.digest.as_deref())
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                SigningError::EngineResponseError("pre-sign package has no digest".to_string())
            })
    }

    #[must_use]
    pub fn data(&self) -> Option<&PreSignData> {
        self.data.as_ref()
    }

    /// The package exactly as the engine produced it, for the embed step.
    #[must_use]
    pub fn as_raw_json(&self) -> &str {
        &self.raw
    }
}
