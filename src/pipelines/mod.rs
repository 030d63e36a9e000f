//! Workflow pipelines orchestrating engine, signer and revocation services.

pub mod sign;
pub mod verify;

pub use sign::{SignStage, SignWorkflow, DEFAULT_SIGNING_TIMEOUT};
pub use verify::VerifyWorkflow;
