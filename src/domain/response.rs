//! Response codes and the externally visible sign result.

use crate::infra::error::SigningResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome codes shared by the document engine and the sign workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    Success,
    DocumentUnreadable,
    InvalidInput,
    ProcessingFailed,
    PdfNotFound,
    ImageNotFound,
}

impl ResponseCode {
    /// Map a raw engine code. Unknown codes collapse into `ProcessingFailed`.
    ///
    /// `InvalidInput` is only produced by the workflow's own pre-check, so an
    /// engine reporting 3 is treated like any other unrecognized code.
    #[must_use]
    pub fn from_engine(code: i64) -> Self {
        match code {
            0 => ResponseCode::Success,
            1 => ResponseCode::DocumentUnreadable,
            5 => ResponseCode::PdfNotFound,
            6 => ResponseCode::ImageNotFound,
            _ => ResponseCode::ProcessingFailed,
        }
    }

    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            ResponseCode::Success => 0,
            ResponseCode::DocumentUnreadable => 1,
            ResponseCode::InvalidInput => 3,
            ResponseCode::ProcessingFailed => 4,
            ResponseCode::PdfNotFound => 5,
            ResponseCode::ImageNotFound => 6,
        }
    }

    /// Human-readable status string reported alongside the code.
    #[must_use]
    pub fn status(self) -> &'static str {
        match self {
            ResponseCode::Success => "success",
            ResponseCode::DocumentUnreadable => "Failed to open/read document",
            ResponseCode::InvalidInput => "Input parameters are incorrect",
            ResponseCode::ProcessingFailed => "Failed when processing PDF",
            ResponseCode::PdfNotFound => "PDF File not found",
            ResponseCode::ImageNotFound => "Visualization Image not found",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_i32(), self.status())
    }
}

/// Result of one sign operation, serialized as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignResult {
    pub response_code: i32,
    pub response_status: String,
}

impl SignResult {
    #[must_use]
    pub fn success() -> Self {
        Self::from_code(ResponseCode::Success)
    }

    #[must_use]
    pub fn from_code(code: ResponseCode) -> Self {
        Self {
            response_code: code.as_i32(),
            response_status: code.status().to_string(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.response_code == 0
    }

    /// Flat JSON rendering (`{"response_code":0,"response_status":"success"}`).
    pub fn to_json(&self) -> SigningResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<ResponseCode> for SignResult {
    fn from(code: ResponseCode) -> Self {
        Self::from_code(code)
    }
}
