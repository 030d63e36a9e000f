//! In-memory document engine that records every call.

use pdf_remote_signer::domain::ResolvedSignOptions;
use pdf_remote_signer::{DocumentEngine, SigningError, SigningResult};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    CalculateDigest {
        input: String,
        options: ResolvedSignOptions,
    },
    RevocationParameters {
        cms: String,
    },
    Embed {
        pre_sign: String,
        revocation: String,
        output: String,
    },
    Verify {
        input: String,
    },
}

/// Canned answers plus a call log.
pub struct RecordingEngine {
    pub pre_sign: Option<String>,
    pub revocation_parameters: Option<String>,
    pub revocation_parameters_fail: bool,
    pub embed_status: i32,
    pub verdict: Option<String>,
    calls: Mutex<Vec<EngineCall>>,
}

impl RecordingEngine {
    pub fn new(pre_sign: Option<String>) -> Self {
        Self {
            pre_sign,
            revocation_parameters: None,
            revocation_parameters_fail: false,
            embed_status: 0,
            verdict: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Engine whose digest step succeeds with `digest`.
    pub fn succeeding(digest: &str) -> Self {
        Self::new(Some(pre_sign_json(0, Some(digest))))
    }

    pub fn with_revocation_parameters(mut self, json: impl Into<String>) -> Self {
        self.revocation_parameters = Some(json.into());
        self
    }

    /// Make the revocation parameters call return an engine error.
    pub fn with_failing_revocation_parameters(mut self) -> Self {
        self.revocation_parameters_fail = true;
        self
    }

    pub fn with_embed_status(mut self, status: i32) -> Self {
        self.embed_status = status;
        self
    }

    pub fn with_verdict(mut self, verdict: impl Into<String>) -> Self {
        self.verdict = Some(verdict.into());
        self
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn embed_calls(&self) -> Vec<(String, String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                EngineCall::Embed {
                    pre_sign,
                    revocation,
                    output,
                } => Some((pre_sign, revocation, output)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl DocumentEngine for RecordingEngine {
    fn calculate_digest(
        &self,
        input_path: &str,
        options: &ResolvedSignOptions,
    ) -> SigningResult<Option<String>> {
        self.record(EngineCall::CalculateDigest {
            input: input_path.to_string(),
            options: options.clone(),
        });
        Ok(self.pre_sign.clone())
    }

    fn revocation_parameters(&self, cms: &str) -> SigningResult<Option<String>> {
        self.record(EngineCall::RevocationParameters {
            cms: cms.to_string(),
        });
        if self.revocation_parameters_fail {
            return Err(SigningError::EngineError(
                "revocation parameters unavailable".into(),
            ));
        }
        Ok(self.revocation_parameters.clone())
    }

    fn embed_cms(
        &self,
        pre_sign_json: &str,
        revocation_json: &str,
        output_path: &str,
    ) -> SigningResult<i32> {
        self.record(EngineCall::Embed {
            pre_sign: pre_sign_json.to_string(),
            revocation: revocation_json.to_string(),
            output: output_path.to_string(),
        });
        Ok(self.embed_status)
    }

    fn verify(&self, input_path: &str) -> SigningResult<Option<String>> {
        self.record(EngineCall::Verify {
            input: input_path.to_string(),
        });
        match &self.verdict {
            Some(v) => Ok(Some(v.clone())),
            None => Err(SigningError::EngineError("verify not available".into())),
        }
    }
}

/// Pre-sign package as the engine would produce it.
pub fn pre_sign_json(code: i64, digest: Option<&str>) -> String {
    let data = match digest {
        Some(d) => serde_json::json!({ "digest": d, "byte_range": [0, 840, 960, 120], "field": "SignPDFKit" }),
        None => serde_json::json!({ "byte_range": [0, 840, 960, 120] }),
    };
    serde_json::json!({
        "response_code": code,
        "response_status": "engine status text",
        "data": data,
    })
    .to_string()
}
