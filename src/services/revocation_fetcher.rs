//! Revocation evidence fetcher.
//!
//! Resolves each [`RevocationDescriptor`] to a [`FetchOutcome`]. Failures are
//! local to their descriptor: they become `Skipped` outcomes and never abort
//! the batch. Fetches run concurrently up to the client's limit, and results
//! are returned in descriptor order regardless of completion order.

use crate::adapters::revocation_http_client::RevocationHttpClient;
use crate::domain::revocation::{normalize_crl, FetchOutcome, RevocationDescriptor, RevocationKind};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Fetches OCSP responses and CRLs over a shared HTTP client.
#[derive(Debug, Clone)]
pub struct RevocationFetcher {
    http: RevocationHttpClient,
}

impl RevocationFetcher {
    #[must_use]
    pub fn new(http: RevocationHttpClient) -> Self {
        Self { http }
    }

    /// Fetch a single descriptor.
    pub async fn fetch_one(&self, descriptor: &RevocationDescriptor) -> FetchOutcome {
        let outcome = match descriptor.kind {
            RevocationKind::Ocsp => self.fetch_ocsp(descriptor).await,
            RevocationKind::Crl => self.fetch_crl(descriptor).await,
            RevocationKind::Unknown => {
                FetchOutcome::skipped(descriptor, "unsupported revocation source type")
            }
        };
        match &outcome {
            FetchOutcome::Fetched { .. } => {
                log::debug!("{} evidence fetched from {}", descriptor.kind, descriptor.url);
            }
            FetchOutcome::Skipped { reason, .. } => {
                log::warn!(
                    "Skipping {} source {}: {}",
                    descriptor.kind,
                    descriptor.url,
                    reason
                );
            }
        }
        outcome
    }

    async fn fetch_ocsp(&self, descriptor: &RevocationDescriptor) -> FetchOutcome {
        let Some(request_b64) = descriptor.request.as_deref() else {
            return FetchOutcome::skipped(descriptor, "OCSP source has no request body");
        };
        let request_der = match STANDARD.decode(request_b64.trim()) {
            Ok(der) => der,
            Err(e) => {
                return FetchOutcome::skipped(descriptor, format!("OCSP request is not base64: {e}"))
            }
        };
        match self.http.post_ocsp(&descriptor.url, request_der).await {
            Ok(body) => FetchOutcome::fetched(RevocationKind::Ocsp, &body),
            Err(e) => FetchOutcome::skipped(descriptor, e.to_string()),
        }
    }

    async fn fetch_crl(&self, descriptor: &RevocationDescriptor) -> FetchOutcome {
        match self.http.get_crl(&descriptor.url).await {
            Ok(body) => FetchOutcome::fetched(RevocationKind::Crl, &normalize_crl(&body)),
            Err(e) => FetchOutcome::skipped(descriptor, e.to_string()),
        }
    }

    /// Fetch every descriptor; `result[i]` belongs to `descriptors[i]`.
    pub async fn fetch_all(&self, descriptors: &[RevocationDescriptor]) -> Vec<FetchOutcome> {
        let limit = Arc::new(Semaphore::new(self.http.max_concurrent_fetches()));
        let mut tasks = JoinSet::new();

        for (index, descriptor) in descriptors.iter().cloned().enumerate() {
            let fetcher = self.clone();
            let limit = Arc::clone(&limit);
            tasks.spawn(async move {
                // Never closed.
                let _permit = limit.acquire_owned().await.ok();
                (index, fetcher.fetch_one(&descriptor).await)
            });
        }

        let mut slots: Vec<Option<FetchOutcome>> = vec![None; descriptors.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => log::error!("Revocation fetch task failed: {e}"),
            }
        }

        slots
            .into_iter()
            .zip(descriptors)
            .map(|(slot, descriptor)| {
                slot.unwrap_or_else(|| FetchOutcome::skipped(descriptor, "fetch task did not complete"))
            })
            .collect()
    }
}
