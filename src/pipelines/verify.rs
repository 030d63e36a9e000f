//! `VerifyWorkflow`: high-level facade for verifying signed PDFs.
//!
//! Delegates to the document engine and returns its verdict untouched.

use crate::adapters::engine::DocumentEngine;
use crate::SigningResult;
use std::sync::Arc;

/// Passes verification requests through to the document engine.
pub struct VerifyWorkflow {
    engine: Arc<dyn DocumentEngine>,
}

impl VerifyWorkflow {
    #[must_use]
    pub fn new(engine: Arc<dyn DocumentEngine>) -> Self {
        Self { engine }
    }

    /// Return the engine's raw verdict for `path`; a null answer is an empty string.
    pub fn run(&self, path: &str) -> SigningResult<String> {
        log::debug!("Verifying {path}");
        Ok(self.engine.verify(path)?.unwrap_or_default())
    }
}
