//! Service layer module root.
//! Contains the revocation evidence services used by the sign workflow.

pub mod bundle_builder;
pub mod revocation_fetcher;

pub use bundle_builder::RevocationBundleBuilder;
pub use revocation_fetcher::RevocationFetcher;
