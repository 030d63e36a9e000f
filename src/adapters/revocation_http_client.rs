//! Revocation HTTP client adapter.
//! HTTP client adapter for OCSP (POST) and CRL (GET) retrieval.
//! One pooled client is built per configuration and reused for every fetch.

use crate::infra::error::{SigningError, SigningResult};
use std::time::Duration;

pub const OCSP_REQUEST_CONTENT_TYPE: &str = "application/ocsp-request";
pub const OCSP_RESPONSE_CONTENT_TYPE: &str = "application/ocsp-response";

/// Upper bound for `max_concurrent_fetches`.
pub const MAX_CONCURRENT_FETCHES: usize = 64;

/// Configuration for revocation HTTP operations.
#[derive(Debug, Clone)]
pub struct RevocationHttpConfig {
    /// Whole-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// How long idle pooled connections are kept for reuse.
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    /// Upper bound on fetches in flight for one bundle.
    pub max_concurrent_fetches: usize,
    /// Skip TLS certificate validation. Opt-in only.
    pub accept_invalid_certs: bool,
    pub user_agent: String,
}

impl Default for RevocationHttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 10,
            max_concurrent_fetches: 4,
            accept_invalid_certs: false,
            user_agent: concat!("pdf-remote-signer/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP adapter performing OCSP and CRL exchanges.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RevocationHttpClient {
    http: reqwest::Client,
    max_concurrent_fetches: usize,
}

impl RevocationHttpClient {
    /// Create a new client from config.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built (e.g. TLS backend init failure).
    pub fn new(cfg: &RevocationHttpConfig) -> SigningResult<Self> {
        if cfg.accept_invalid_certs {
            log::warn!("TLS certificate validation is disabled for revocation fetches");
        }
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .connect_timeout(cfg.connect_timeout)
            .pool_idle_timeout(cfg.pool_idle_timeout)
            .pool_max_idle_per_host(cfg.pool_max_idle_per_host)
            .danger_accept_invalid_certs(cfg.accept_invalid_certs)
            .user_agent(cfg.user_agent.as_str())
            .build()
            .map_err(|e| {
                SigningError::NetworkError(format!("Failed to create HTTP client: {e}"))
            })?;
        Ok(Self {
            http,
            max_concurrent_fetches: cfg.max_concurrent_fetches.clamp(1, MAX_CONCURRENT_FETCHES),
        })
    }

    #[must_use]
    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_concurrent_fetches
    }

    /// POST a DER OCSP request and return the raw response body.
    pub async fn post_ocsp(&self, url: &str, request_der: Vec<u8>) -> SigningResult<Vec<u8>> {
        let resp = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, OCSP_REQUEST_CONTENT_TYPE)
            .header(reqwest::header::ACCEPT, OCSP_RESPONSE_CONTENT_TYPE)
            .body(request_der)
            .send()
            .await
            .map_err(|e| SigningError::NetworkError(format!("OCSP request to {url} failed: {e}")))?;
        Self::read_success_body(url, resp).await
    }

    /// GET a CRL and return the raw response body (DER or PEM text).
    pub async fn get_crl(&self, url: &str) -> SigningResult<Vec<u8>> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SigningError::NetworkError(format!("CRL download from {url} failed: {e}")))?;
        Self::read_success_body(url, resp).await
    }

    async fn read_success_body(url: &str, resp: reqwest::Response) -> SigningResult<Vec<u8>> {
        if !resp.status().is_success() {
            return Err(SigningError::NetworkError(format!(
                "HTTP {} from {url}",
                resp.status()
            )));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SigningError::NetworkError(format!("Read body from {url} failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}
