//! Remote signing service adapter.
//!
//! Sends document digests to an HTTPS signing service that holds the
//! signer's key and returns a CMS container.

pub mod client;
pub mod protocol;

pub use client::{RemoteDigestSigner, RemoteSignerConfig};
