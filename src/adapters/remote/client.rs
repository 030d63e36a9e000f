//! Remote digest signing client.
//!
//! Provides a [`DigestSigner`] that sends the document digest to a remote
//! signing service over HTTPS and returns the CMS container it produces.

use super::protocol::{DigestSignRequest, DigestSignResponse, ErrorResponse};
use crate::adapters::signer::{DigestSigner, SignerOptions};
use crate::infra::error::{SigningError, SigningResult};
use async_trait::async_trait;

/// Configuration for connecting to a remote signing service.
#[derive(Debug, Clone)]
pub struct RemoteSignerConfig {
    /// Full URL of the sign endpoint (e.g., `https://sign.example.com/api/sign`).
    pub url: String,
    /// Optional bearer token for authentication.
    pub auth_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Whether to verify TLS certificates (should be true in production).
    pub verify_tls: bool,
    /// Extra headers sent with every request.
    pub headers: Vec<(String, String)>,
}

impl RemoteSignerConfig {
    /// Create a new remote signer configuration.
    ///
    /// # Arguments
    /// * `url` - Sign endpoint URL
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: None,
            timeout_secs: 30,
            verify_tls: true,
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Add a custom header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Disable TLS verification (for testing only!).
    #[must_use]
    pub fn with_insecure_tls(mut self) -> Self {
        self.verify_tls = false;
        self
    }
}

/// Remote signing service client.
pub struct RemoteDigestSigner {
    config: RemoteSignerConfig,
    client: reqwest::Client,
}

impl RemoteDigestSigner {
    /// Create a new remote signer client.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(config: RemoteSignerConfig) -> SigningResult<Self> {
        if !config.verify_tls {
            log::warn!("TLS certificate validation is disabled for {}", config.url);
        }
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| {
                SigningError::NetworkError(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { config, client })
    }

    #[must_use]
    pub fn config(&self) -> &RemoteSignerConfig {
        &self.config
    }

    async fn request_cms(&self, digest: &str, options: &SignerOptions) -> SigningResult<String> {
        let body = DigestSignRequest::new(digest, options);
        log::debug!(
            "Requesting remote signature from {} (option keys: {:?})",
            self.config.url,
            options.keys().collect::<Vec<_>>()
        );

        let mut request = self.client.post(&self.config.url).json(&body);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }
        for (name, value) in &self.config.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            SigningError::NetworkError(format!("Failed to reach signing service: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.message)
                .unwrap_or(error_text);
            return Err(SigningError::SignerError(format!(
                "Signing service returned {status}: {message}"
            )));
        }

        let parsed: DigestSignResponse = response.json().await.map_err(|e| {
            SigningError::SignerError(format!("Failed to parse signing response: {e}"))
        })?;

        match parsed.cms {
            Some(cms) if !cms.is_empty() => Ok(cms),
            _ => Err(SigningError::SignerError(
                "Signing service response has no cms".to_string(),
            )),
        }
    }
}

#[async_trait]
impl DigestSigner for RemoteDigestSigner {
    async fn sign_digest(&self, digest: &str, options: &SignerOptions) -> SigningResult<String> {
        self.request_cms(digest, options).await
    }
}
