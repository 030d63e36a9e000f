//! Document engine boundary.
//!
//! The engine performs every byte-level PDF operation: digest calculation
//! over the signature byte range, derivation of revocation sources from the
//! signer chain, CMS embedding and verification. This module defines the
//! interface the workflows depend on:
//! - `NativeEngine` loads the engine from a shared library (feature `native-engine`)
//! - tests supply in-memory fakes

#[cfg(feature = "native-engine")]
pub mod native;

use crate::domain::request::ResolvedSignOptions;
use crate::infra::error::SigningResult;

#[cfg(feature = "native-engine")]
pub use native::{library_path, NativeEngine};

/// Operations offered by the document engine.
///
/// All calls are synchronous and may be CPU-bound; async callers should
/// run them on a blocking thread. Whether concurrent calls are safe is the
/// engine's own contract: implementations that are not reentrant must
/// serialize internally.
pub trait DocumentEngine: Send + Sync {
    /// Compute the pre-signature package for a document.
    ///
    /// # Arguments
    ///
    /// * `input_path` - PDF to sign
    /// * `options` - Fully resolved signing parameters
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot be called. `Ok(None)` means the
    /// engine answered with a null result.
    fn calculate_digest(
        &self,
        input_path: &str,
        options: &ResolvedSignOptions,
    ) -> SigningResult<Option<String>>;

    /// List revocation sources (JSON array) for the chain inside `cms`.
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot be called.
    fn revocation_parameters(&self, cms: &str) -> SigningResult<Option<String>>;

    /// Embed the container and revocation evidence, writing `output_path`.
    ///
    /// # Arguments
    ///
    /// * `pre_sign_json` - Package from [`DocumentEngine::calculate_digest`], verbatim
    /// * `revocation_json` - Serialized revocation bundle
    /// * `output_path` - Destination PDF
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot be called. The returned integer is
    /// the engine status, `0` meaning success.
    fn embed_cms(
        &self,
        pre_sign_json: &str,
        revocation_json: &str,
        output_path: &str,
    ) -> SigningResult<i32>;

    /// Verify the signatures of a PDF and return the engine's verdict text.
    ///
    /// # Errors
    ///
    /// Returns error if the engine does not support verification or cannot be called.
    fn verify(&self, input_path: &str) -> SigningResult<Option<String>>;
}
