//! Agent Records
//!
//! The immutable description of one simulated agent: who it may pay, how
//! often it acts, and how it sizes transfers. Only the ledger balance changes
//! over a run, and that lives in the ledger, not here.

use serde::{Deserialize, Serialize};

/// One simulated agent, as exposed on the roster endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    /// Ledger account id
    pub id: String,
    /// Distinct peer ids, never including `id`
    pub friends: Vec<String>,
    /// Delay between ticks
    pub action_interval_ms: u64,
    pub transfer_policy: TransferPolicy,
    /// Opted-out agents claim assigned points every tick
    #[serde(default)]
    pub opted_out: bool,
}

impl Agent {
    pub fn friend_count(&self) -> usize {
        self.friends.len()
    }

    pub fn is_friend(&self, id: &str) -> bool {
        self.friends.iter().any(|f| f == id)
    }
}

/// Transfer sizing profile, fixed when the agent is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TransferPolicy {
    /// Transfer a share of the balance drawn from `[min_pct, max_pct]` each tick.
    #[serde(rename_all = "camelCase")]
    Percentage {
        min_pct: f64,
        max_pct: f64,
        /// Lower bound on the drawn share
        pct_floor: f64,
        /// Transfers are never sized below this
        min_points: u64,
    },
    /// Transfer one of a fixed set of amounts, chosen with per-style weights.
    #[serde(rename_all = "camelCase")]
    Tiered {
        style: String,
        /// Ascending point amounts
        tiers: Vec<u64>,
        /// Selection weight for each tier
        tier_weights: Vec<f64>,
    },
}

impl TransferPolicy {
    /// Short label used in logs and summaries.
    pub fn label(&self) -> &str {
        match self {
            TransferPolicy::Percentage { .. } => "percentage",
            TransferPolicy::Tiered { style, .. } => style,
        }
    }
}
