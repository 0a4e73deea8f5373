//! Ledger errors

use thiserror::Error;

/// Errors returned by a [`Ledger`](crate::Ledger) implementation.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The configured base URL cannot have path segments appended.
    #[error("invalid ledger base url: {0}")]
    InvalidBaseUrl(String),

    /// Transport failure, including a body that could not be read.
    #[error("ledger request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The ledger answered with a success status but a malformed body.
    #[error("malformed ledger response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The ledger answered with a non-success status.
    #[error("{status} {reason}")]
    Status { status: u16, reason: String },
}

impl LedgerError {
    /// Builds a [`LedgerError::Status`] with the canonical reason phrase for `status`.
    pub fn status(status: u16) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("")
            .to_string();
        LedgerError::Status { status, reason }
    }

    /// Status code of a rejected request, if the ledger answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            LedgerError::Status { status, .. } => Some(*status),
            LedgerError::Http(e) => e.status().map(|s| s.as_u16()),
            LedgerError::InvalidBaseUrl(_) | LedgerError::Decode(_) => None,
        }
    }
}
