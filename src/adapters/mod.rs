//! Adapter layer modules for external system integration.
//!
//! Provides adapters for:
//! - The document engine (shared library loaded at runtime)
//! - Caller-supplied digest signers and the remote signing service client
//! - HTTP retrieval of OCSP responses and CRLs

pub mod engine;
pub mod remote;
pub mod revocation_http_client;
pub mod signer;
