//! Revocation descriptors, per-descriptor fetch outcomes and the evidence bundle.

use crate::infra::error::SigningResult;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// PEM label found in armored CRL downloads.
pub const CRL_PEM_MARKER: &str = "BEGIN X509 CRL";
/// Prefix shared by PEM `BEGIN`/`END` delimiter lines.
pub const PEM_DELIMITER: &str = "-----";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevocationKind {
    Ocsp,
    Crl,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for RevocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RevocationKind::Ocsp => "ocsp",
            RevocationKind::Crl => "crl",
            RevocationKind::Unknown => "unknown",
        })
    }
}

/// One revocation source derived by the engine from the signer's chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationDescriptor {
    #[serde(rename = "type")]
    pub kind: RevocationKind,
    pub url: String,
    /// Base64 DER OCSP request; only meaningful for OCSP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
}

impl RevocationDescriptor {
    #[must_use]
    pub fn ocsp(url: impl Into<String>, request_b64: impl Into<String>) -> Self {
        Self {
            kind: RevocationKind::Ocsp,
            url: url.into(),
            request: Some(request_b64.into()),
        }
    }

    #[must_use]
    pub fn crl(url: impl Into<String>) -> Self {
        Self {
            kind: RevocationKind::Crl,
            url: url.into(),
            request: None,
        }
    }
}

/// Decode the engine's `get_revocation_parameters` answer.
///
/// Blank text means the chain has no revocation sources.
pub fn parse_descriptors(json: &str) -> SigningResult<Vec<RevocationDescriptor>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(json)?)
}

/// Result of fetching a single descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Evidence retrieved; `body_b64` is the base64 of the binary payload.
    Fetched {
        kind: RevocationKind,
        body_b64: String,
    },
    Skipped {
        kind: RevocationKind,
        url: String,
        reason: String,
    },
}

impl FetchOutcome {
    #[must_use]
    pub fn fetched(kind: RevocationKind, body: &[u8]) -> Self {
        FetchOutcome::Fetched {
            kind,
            body_b64: STANDARD.encode(body),
        }
    }

    #[must_use]
    pub fn skipped(descriptor: &RevocationDescriptor, reason: impl Into<String>) -> Self {
        FetchOutcome::Skipped {
            kind: descriptor.kind,
            url: descriptor.url.clone(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched { .. })
    }
}

/// Signature container plus collected OCSP/CRL evidence, handed to the embed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationBundle {
    cms: String,
    ocsp: Vec<String>,
    crl: Vec<String>,
}

impl RevocationBundle {
    /// Bundle without any revocation evidence.
    #[must_use]
    pub fn without_evidence(cms: impl Into<String>) -> Self {
        Self {
            cms: cms.into(),
            ocsp: Vec::new(),
            crl: Vec::new(),
        }
    }

    /// Assemble from outcomes in descriptor order. Skipped entries are dropped.
    #[must_use]
    pub fn from_outcomes(cms: impl Into<String>, outcomes: Vec<FetchOutcome>) -> Self {
        let mut bundle = Self::without_evidence(cms);
        for outcome in outcomes {
            if let FetchOutcome::Fetched { kind, body_b64 } = outcome {
                match kind {
                    RevocationKind::Ocsp => bundle.ocsp.push(body_b64),
                    RevocationKind::Crl => bundle.crl.push(body_b64),
                    RevocationKind::Unknown => {}
                }
            }
        }
        bundle
    }

    #[must_use]
    pub fn cms(&self) -> &str {
        &self.cms
    }

    #[must_use]
    pub fn ocsp(&self) -> &[String] {
        &self.ocsp
    }

    #[must_use]
    pub fn crl(&self) -> &[String] {
        &self.crl
    }

    /// JSON form consumed by the engine's embed call.
    pub fn to_json(&self) -> SigningResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Recover the binary CRL from a download that may be PEM-armored.
///
/// Armored bodies lose every delimiter line, the rest is trimmed, joined and
/// base64-decoded. Bodies that are not armored, or whose armor does not
/// decode, are returned unchanged.
#[must_use]
pub fn normalize_crl(body: &[u8]) -> Vec<u8> {
    let text = String::from_utf8_lossy(body);
    if !text.contains(CRL_PEM_MARKER) {
        return body.to_vec();
    }

    let joined: String = text
        .lines()
        .filter(|line| !line.trim_start().starts_with(PEM_DELIMITER))
        .map(str::trim)
        .collect();

    match STANDARD.decode(joined.trim()) {
        Ok(der) => der,
        Err(e) => {
            log::debug!("CRL PEM body did not decode, keeping raw bytes: {e}");
            body.to_vec()
        }
    }
}
