//! Wire Types
//!
//! JSON bodies exchanged with the ledger. Field names follow the ledger's
//! camelCase convention.

use serde::{Deserialize, Serialize};

/// Balance snapshot for one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    /// Points the account holds itself
    pub own: i64,
    /// Points other accounts have assigned to it
    pub assigned: i64,
    /// Points available to spend
    pub total: i64,
}

impl Tally {
    pub fn new(own: i64, assigned: i64, total: i64) -> Self {
        Self { own, assigned, total }
    }
}

/// Response to a successful registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupReceipt {
    #[serde(default)]
    pub epoch_sign_up: Option<serde_json::Number>,
}

/// Stored profile of a registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Whether assigned points are credited automatically. Accounts that
    /// opted out must claim them.
    #[serde(default = "default_opts_in")]
    pub opts_in: bool,
}

fn default_opts_in() -> bool {
    true
}

/// Optional registration body sent by opt-out-aware deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub opts_in: bool,
}

/// Body of a claim request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// Tier index to claim
    pub index: usize,
}
