//! Digest signers with scripted behavior.

use async_trait::async_trait;
use pdf_remote_signer::{DigestSigner, SignerOptions, SigningError, SigningResult};
use std::sync::Mutex;
use std::time::Duration;

pub enum Answer {
    Cms(String),
    Fail(String),
    /// Answers with `cms` after sleeping.
    Slow(Duration, String),
}

/// Returns a fixed answer and remembers what it was asked to sign.
pub struct ScriptedSigner {
    answer: Answer,
    seen: Mutex<Vec<(String, SignerOptions)>>,
}

impl ScriptedSigner {
    pub fn new(answer: Answer) -> Self {
        Self {
            answer,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn cms(cms: &str) -> Self {
        Self::new(Answer::Cms(cms.to_string()))
    }

    pub fn seen(&self) -> Vec<(String, SignerOptions)> {
        self.seen.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl DigestSigner for ScriptedSigner {
    async fn sign_digest(&self, digest: &str, options: &SignerOptions) -> SigningResult<String> {
        self.seen
            .lock()
            .unwrap()
            .push((digest.to_string(), options.clone()));
        match &self.answer {
            Answer::Cms(cms) => Ok(cms.clone()),
            Answer::Fail(msg) => Err(SigningError::SignerError(msg.clone())),
            Answer::Slow(delay, cms) => {
                tokio::time::sleep(*delay).await;
                Ok(cms.clone())
            }
        }
    }
}
