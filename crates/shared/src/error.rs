//! Faults the portal front end reports to the user or to a JSON consumer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Nothing usable was given, e.g. no image among the selected files.
    Validation,
    /// A selected file does not exist.
    NotFound,
    /// The analysis run failed.
    Unavailable,
    Internal,
}

/// Wire form of a fault, printed as one JSON line by `portal analyze --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalError {
    pub code: ErrorCode,
    pub message: String,
}

impl PortalError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{code:?}: {message}")]
pub struct PortalException {
    pub code: ErrorCode,
    pub message: String,
}

impl PortalException {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<PortalException> for PortalError {
    fn from(fault: PortalException) -> Self {
        Self::new(fault.code, fault.message)
    }
}
