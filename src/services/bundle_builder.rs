//! Revocation bundle builder.
//!
//! Turns a signature container and the engine's revocation sources into the
//! evidence bundle the embed step consumes. With DSS disabled the bundle
//! carries no evidence and no network I/O happens.

use crate::domain::revocation::{RevocationBundle, RevocationDescriptor};
use crate::services::revocation_fetcher::RevocationFetcher;

#[derive(Debug, Clone)]
pub struct RevocationBundleBuilder {
    fetcher: RevocationFetcher,
}

impl RevocationBundleBuilder {
    #[must_use]
    pub fn new(fetcher: RevocationFetcher) -> Self {
        Self { fetcher }
    }

    /// Build the bundle for one sign operation. Never fails.
    pub async fn build(
        &self,
        cms: &str,
        items: &[RevocationDescriptor],
        dss_enabled: bool,
    ) -> RevocationBundle {
        if !dss_enabled {
            return RevocationBundle::without_evidence(cms);
        }

        let outcomes = self.fetcher.fetch_all(items).await;
        let fetched = outcomes.iter().filter(|o| o.is_fetched()).count();
        let bundle = RevocationBundle::from_outcomes(cms, outcomes);
        log::info!(
            "Revocation evidence: {} of {} sources fetched ({} OCSP, {} CRL)",
            fetched,
            items.len(),
            bundle.ocsp().len(),
            bundle.crl().len()
        );
        bundle
    }
}
