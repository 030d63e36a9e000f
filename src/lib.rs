//! PDF Remote Signer Library
//!
//! Orchestrates PDF signing where the private key lives elsewhere:
//! a document engine computes the digest over the signature byte range,
//! a caller-supplied [`DigestSigner`] (typically a remote HTTPS service)
//! returns a CMS container, OCSP responses and CRLs are optionally fetched
//! for long-term validation, and the engine embeds everything into the
//! output PDF.
//!
//! # Example
//!
//! ```no_run
//! use pdf_remote_signer::{
//!     NativeEngine, RemoteDigestSigner, RemoteSignerConfig, RevocationHttpConfig, SignRequest,
//!     SignWorkflow,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> pdf_remote_signer::SigningResult<()> {
//! let engine = NativeEngine::load_from_dir("lib", "signpdfkit")?;
//! let signer = RemoteDigestSigner::new(RemoteSignerConfig::new("https://sign.example.test/sign"))?;
//! let workflow =
//!     SignWorkflow::with_http_config(Arc::new(engine), Arc::new(signer), &RevocationHttpConfig::default())?;
//!
//! let request = SignRequest::new("contract.pdf", "contract-signed.pdf").with_revocation_embedding(true);
//! let result = workflow.sign(&request).await;
//! println!("{}", result.to_json()?);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod domain;
pub mod infra;
pub mod pipelines;
pub mod services;

pub use infra::{config, error};

pub use adapters::engine::DocumentEngine;
#[cfg(feature = "native-engine")]
pub use adapters::engine::NativeEngine;
pub use adapters::remote::{RemoteDigestSigner, RemoteSignerConfig};
pub use adapters::revocation_http_client::{RevocationHttpClient, RevocationHttpConfig};
pub use adapters::signer::{DigestSigner, SignerOptions};
pub use domain::{
    FieldFormat, Rect, ResponseCode, RevocationBundle, RevocationDescriptor, RevocationKind,
    SignRequest, SignResult, SignatureKind, Visibility,
};
pub use infra::config::{ConfigManager, SignerConfiguration};
pub use infra::error::{SigningError, SigningResult};
pub use pipelines::{SignWorkflow, VerifyWorkflow};
pub use services::{RevocationBundleBuilder, RevocationFetcher};
