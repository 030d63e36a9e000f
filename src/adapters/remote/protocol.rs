//! Protocol definitions for remote digest signing.
//!
//! Defines the JSON message format exchanged with a remote signing service.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request to sign a document digest.
///
/// Caller options (e.g. `email`, `passcode`) are sent as top-level fields
/// next to the digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestSignRequest {
    /// Digest exactly as produced by the document engine.
    pub digest: String,
    #[serde(flatten)]
    pub options: BTreeMap<String, String>,
}

impl DigestSignRequest {
    #[must_use]
    pub fn new(digest: impl Into<String>, options: &BTreeMap<String, String>) -> Self {
        Self {
            digest: digest.into(),
            options: options.clone(),
        }
    }
}

/// Response carrying the signature container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestSignResponse {
    /// Base64 CMS container.
    #[serde(default)]
    pub cms: Option<String>,
}

/// Error body returned by the service on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, alias = "error")]
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}
