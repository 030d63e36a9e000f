//! Signing callback boundary.
//!
//! The workflow never holds private keys. It hands the engine's digest to a
//! [`DigestSigner`] and receives an opaque base64 CMS container back.

use crate::infra::error::SigningResult;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Caller-provided options forwarded to the signer (credentials, policy ids).
pub type SignerOptions = BTreeMap<String, String>;

/// Produces a signature container for a document digest.
///
/// Implementations may block on network I/O; the sign workflow bounds each
/// call with its own timeout and performs no retries.
#[async_trait]
pub trait DigestSigner: Send + Sync {
    /// Sign `digest` and return the CMS container. An empty string counts as failure.
    async fn sign_digest(&self, digest: &str, options: &SignerOptions) -> SigningResult<String>;
}

/// Plain synchronous closures work as signers.
#[async_trait]
impl<F> DigestSigner for F
where
    F: Fn(&str, &SignerOptions) -> SigningResult<String> + Send + Sync,
{
    async fn sign_digest(&self, digest: &str, options: &SignerOptions) -> SigningResult<String> {
        self(digest, options)
    }
}
