//! `SignWorkflow` orchestrates one PDF signing operation.
//!
//! Stages, in order:
//! 1. Validate input/output paths (no engine call on failure)
//! 2. Resolve optional request fields over the documented defaults
//! 3. Ask the document engine for the pre-signature package
//! 4. Dispatch on the engine response code
//! 5. Have the digest signed by the caller's [`DigestSigner`]
//! 6. Collect revocation evidence (best effort, never fails)
//! 7. Embed container and evidence through the engine
//!
//! Every failure is reported as a [`SignResult`]; nothing is retried.
//!
//! Cancellation: dropping the future returned by [`SignWorkflow::sign`]
//! (e.g. through `tokio::time::timeout`) aborts in-flight HTTP requests. An
//! engine call that has already started runs to completion on its blocking
//! thread, but its result is discarded.

use crate::adapters::engine::DocumentEngine;
use crate::adapters::revocation_http_client::{RevocationHttpClient, RevocationHttpConfig};
use crate::adapters::signer::{DigestSigner, SignerOptions};
use crate::domain::presign::PreSignPackage;
use crate::domain::request::{ResolvedSignOptions, SignRequest};
use crate::domain::response::{ResponseCode, SignResult};
use crate::domain::revocation::{parse_descriptors, RevocationBundle};
use crate::services::{RevocationBundleBuilder, RevocationFetcher};
use crate::SigningResult;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default upper bound for one signing callback invocation.
pub const DEFAULT_SIGNING_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignStage {
    Validating,
    DigestCalculating,
    Signing,
    RevocationCollecting,
    Embedding,
}

impl fmt::Display for SignStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignStage::Validating => "validating",
            SignStage::DigestCalculating => "digest calculation",
            SignStage::Signing => "signing",
            SignStage::RevocationCollecting => "revocation collection",
            SignStage::Embedding => "embedding",
        })
    }
}

/// Terminal failure of a sign call: where it stopped and what to report.
#[derive(Debug)]
struct StageFailure {
    stage: SignStage,
    code: ResponseCode,
    detail: String,
}

impl StageFailure {
    fn new(stage: SignStage, code: ResponseCode, detail: impl Into<String>) -> Self {
        Self {
            stage,
            code,
            detail: detail.into(),
        }
    }

    fn processing(stage: SignStage, detail: impl Into<String>) -> Self {
        Self::new(stage, ResponseCode::ProcessingFailed, detail)
    }
}

pub struct SignWorkflow {
    engine: Arc<dyn DocumentEngine>,
    signer: Arc<dyn DigestSigner>,
    signer_options: SignerOptions,
    bundle_builder: RevocationBundleBuilder,
    signing_timeout: Duration,
}

impl SignWorkflow {
    #[must_use]
    pub fn new(
        engine: Arc<dyn DocumentEngine>,
        signer: Arc<dyn DigestSigner>,
        bundle_builder: RevocationBundleBuilder,
    ) -> Self {
        Self {
            engine,
            signer,
            signer_options: SignerOptions::new(),
            bundle_builder,
            signing_timeout: DEFAULT_SIGNING_TIMEOUT,
        }
    }

    /// Build a workflow with its own pooled revocation HTTP client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn with_http_config(
        engine: Arc<dyn DocumentEngine>,
        signer: Arc<dyn DigestSigner>,
        http_config: &RevocationHttpConfig,
    ) -> SigningResult<Self> {
        let http = RevocationHttpClient::new(http_config)?;
        let builder = RevocationBundleBuilder::new(RevocationFetcher::new(http));
        Ok(Self::new(engine, signer, builder))
    }

    /// Options passed to the signer on every call (credentials, policy ids).
    #[must_use]
    pub fn with_signer_options(mut self, options: SignerOptions) -> Self {
        self.signer_options = options;
        self
    }

    #[must_use]
    pub fn with_signing_timeout(mut self, timeout: Duration) -> Self {
        self.signing_timeout = timeout;
        self
    }

    #[must_use]
    pub fn signing_timeout(&self) -> Duration {
        self.signing_timeout
    }

    /// Sign a PDF. Always yields a result; failures are encoded in it.
    pub async fn sign(&self, request: &SignRequest) -> SignResult {
        match self.run(request).await {
            Ok(()) => {
                log::info!("Signed {} -> {}", request.input_path, request.output_path);
                SignResult::success()
            }
            Err(failure) => {
                if failure.code == ResponseCode::InvalidInput {
                    log::warn!("Rejected sign request: {}", failure.detail);
                } else {
                    log::error!(
                        "Signing {} failed during {}: {} [{}]",
                        request.input_path,
                        failure.stage,
                        failure.detail,
                        failure.code
                    );
                }
                SignResult::from_code(failure.code)
            }
        }
    }

    async fn run(&self, request: &SignRequest) -> Result<(), StageFailure> {
        request.validate_paths().map_err(|e| {
            StageFailure::new(SignStage::Validating, ResponseCode::InvalidInput, e.to_string())
        })?;
        let options = request.resolve();
        log::debug!(
            "Resolved options: visibility={}, format={}, kind={}, page={}, dss={}",
            options.visibility,
            options.field_format,
            options.signature_kind,
            options.page,
            options.embed_revocation
        );

        let package = self.calculate_digest(&request.input_path, &options).await?;
        let code = package.code();
        if code != ResponseCode::Success {
            return Err(StageFailure::new(
                SignStage::DigestCalculating,
                code,
                format!(
                    "engine reported {:?} ({})",
                    package.raw_code(),
                    package.engine_status().unwrap_or("no status")
                ),
            ));
        }
        let digest = package
            .digest()
            .map_err(|e| StageFailure::processing(SignStage::DigestCalculating, e.to_string()))?;

        let cms = self.sign_digest(digest).await?;
        let bundle = self.collect_revocation(&cms, options.embed_revocation).await;
        self.embed(&package, &bundle, &request.output_path).await
    }

    /// Run an engine call on the blocking pool. Call failures map to code 4.
    async fn run_engine<T, F>(&self, stage: SignStage, call: F) -> Result<T, StageFailure>
    where
        T: Send + 'static,
        F: FnOnce(&dyn DocumentEngine) -> SigningResult<T> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || call(engine.as_ref()))
            .await
            .map_err(|e| StageFailure::processing(stage, format!("engine task failed: {e}")))?
            .map_err(|e| StageFailure::processing(stage, e.to_string()))
    }

    async fn calculate_digest(
        &self,
        input_path: &str,
        options: &ResolvedSignOptions,
    ) -> Result<PreSignPackage, StageFailure> {
        let stage = SignStage::DigestCalculating;
        let input = input_path.to_string();
        let opts = options.clone();
        let raw = self
            .run_engine(stage, move |engine| engine.calculate_digest(&input, &opts))
            .await?
            .ok_or_else(|| StageFailure::processing(stage, "engine returned no pre-sign package"))?;
        PreSignPackage::parse(raw).map_err(|e| StageFailure::processing(stage, e.to_string()))
    }

    async fn sign_digest(&self, digest: &str) -> Result<String, StageFailure> {
        let stage = SignStage::Signing;
        let call = self.signer.sign_digest(digest, &self.signer_options);
        let cms = tokio::time::timeout(self.signing_timeout, call)
            .await
            .map_err(|_| {
                StageFailure::processing(
                    stage,
                    format!("signer did not answer within {:?}", self.signing_timeout),
                )
            })?
            .map_err(|e| StageFailure::processing(stage, e.to_string()))?;
        if cms.trim().is_empty() {
            return Err(StageFailure::processing(stage, "signer returned an empty container"));
        }
        Ok(cms)
    }

    /// Best effort: any problem degrades to a bundle without evidence.
    async fn collect_revocation(&self, cms: &str, dss_enabled: bool) -> RevocationBundle {
        if !dss_enabled {
            return self.bundle_builder.build(cms, &[], false).await;
        }

        let owned_cms = cms.to_string();
        let items = match self
            .run_engine(SignStage::RevocationCollecting, move |engine| {
                engine.revocation_parameters(&owned_cms)
            })
            .await
        {
            Ok(Some(json)) => parse_descriptors(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable revocation parameters: {e}");
                Vec::new()
            }),
            Ok(None) => {
                log::warn!("Engine returned no revocation parameters");
                Vec::new()
            }
            Err(failure) => {
                log::warn!("Revocation parameters unavailable: {}", failure.detail);
                Vec::new()
            }
        };

        self.bundle_builder.build(cms, &items, true).await
    }

    async fn embed(
        &self,
        package: &PreSignPackage,
        bundle: &RevocationBundle,
        output_path: &str,
    ) -> Result<(), StageFailure> {
        let stage = SignStage::Embedding;
        let revocation_json = bundle
            .to_json()
            .map_err(|e| StageFailure::processing(stage, e.to_string()))?;
        let pre_sign_json = package.as_raw_json().to_string();
        let output = output_path.to_string();
        let status = self
            .run_engine(stage, move |engine| {
                engine.embed_cms(&pre_sign_json, &revocation_json, &output)
            })
            .await?;
        if status == 0 {
            Ok(())
        } else {
            Err(StageFailure::processing(
                stage,
                format!("engine embed returned {status}"),
            ))
        }
    }
}
