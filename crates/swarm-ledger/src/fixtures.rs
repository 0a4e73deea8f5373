//! In-memory ledger for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // swarm-ledger = { path = "../swarm-ledger", features = ["test-fixtures"] }
//!
//! use swarm_ledger::fixtures::{LedgerCall, RecordingLedger};
//!
//! let ledger = RecordingLedger::new().with_tally("abc", 5).failing_transfers(500);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::{Ledger, LedgerError, SignupReceipt, Tally, UserProfile, RESERVED_LEDGER_ID};

/// One recorded ledger interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCall {
    Register { id: String, opts_in: Option<bool> },
    ListUsers,
    Profile { id: String },
    Tally { id: String },
    Transfer { from: String, to: String, amount: u64 },
    Claim { id: String, index: usize },
}

#[derive(Debug, Default)]
struct LedgerState {
    users: Vec<String>,
    opts_in: HashMap<String, bool>,
    tallies: HashMap<String, Tally>,
    calls: Vec<LedgerCall>,
    rejected_registrations: HashSet<String>,
    list_failure: Option<u16>,
    profile_failure: Option<u16>,
    tally_failure: Option<u16>,
    transfer_failure: Option<u16>,
    claim_failure: Option<u16>,
}

/// Ledger that keeps accounts in memory and records every call.
///
/// Starts with the reserved system account registered. Accounts without an
/// explicit tally report zero points.
#[derive(Debug)]
pub struct RecordingLedger {
    state: Mutex<LedgerState>,
}

impl Default for RecordingLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingLedger {
    pub fn new() -> Self {
        let state = LedgerState {
            users: vec![RESERVED_LEDGER_ID.to_string()],
            ..LedgerState::default()
        };
        Self { state: Mutex::new(state) }
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds an account registered outside the simulation.
    pub fn with_user(self, id: &str, opts_in: bool) -> Self {
        {
            let mut state = self.state();
            state.users.push(id.to_string());
            state.opts_in.insert(id.to_string(), opts_in);
        }
        self
    }

    /// Sets the available balance of an account.
    pub fn with_tally(self, id: &str, total: i64) -> Self {
        self.state().tallies.insert(id.to_string(), Tally::new(total, 0, total));
        self
    }

    /// Makes registration of `id` fail with 500.
    pub fn rejecting_registration(self, id: &str) -> Self {
        self.state().rejected_registrations.insert(id.to_string());
        self
    }

    pub fn failing_list(self, status: u16) -> Self {
        self.state().list_failure = Some(status);
        self
    }

    pub fn failing_profiles(self, status: u16) -> Self {
        self.state().profile_failure = Some(status);
        self
    }

    pub fn failing_tallies(self, status: u16) -> Self {
        self.state().tally_failure = Some(status);
        self
    }

    pub fn failing_transfers(self, status: u16) -> Self {
        self.state().transfer_failure = Some(status);
        self
    }

    pub fn failing_claims(self, status: u16) -> Self {
        self.state().claim_failure = Some(status);
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.state().calls.clone()
    }

    /// Current balance of an account as the ledger sees it.
    pub fn balance(&self, id: &str) -> Tally {
        self.state().tallies.get(id).copied().unwrap_or_default()
    }

    /// Registered account ids, including the reserved system account.
    pub fn users(&self) -> Vec<String> {
        self.state().users.clone()
    }
}

#[async_trait]
impl Ledger for RecordingLedger {
    async fn register(&self, id: &str, opts_in: Option<bool>) -> Result<SignupReceipt, LedgerError> {
        let mut state = self.state();
        state.calls.push(LedgerCall::Register { id: id.to_string(), opts_in });
        if state.rejected_registrations.contains(id) {
            return Err(LedgerError::status(500));
        }

        state.users.push(id.to_string());
        state.opts_in.insert(id.to_string(), opts_in.unwrap_or(true));
        Ok(SignupReceipt {
            epoch_sign_up: Some(serde_json::Number::from(state.users.len() as u64)),
        })
    }

    async fn list_users(&self) -> Result<Vec<String>, LedgerError> {
        let mut state = self.state();
        state.calls.push(LedgerCall::ListUsers);
        match state.list_failure {
            Some(status) => Err(LedgerError::status(status)),
            None => Ok(state.users.clone()),
        }
    }

    async fn profile(&self, id: &str) -> Result<UserProfile, LedgerError> {
        let mut state = self.state();
        state.calls.push(LedgerCall::Profile { id: id.to_string() });
        if let Some(status) = state.profile_failure {
            return Err(LedgerError::status(status));
        }
        match state.opts_in.get(id) {
            Some(&opts_in) => Ok(UserProfile { opts_in }),
            None => Err(LedgerError::status(404)),
        }
    }

    async fn tally(&self, id: &str) -> Result<Tally, LedgerError> {
        let mut state = self.state();
        state.calls.push(LedgerCall::Tally { id: id.to_string() });
        match state.tally_failure {
            Some(status) => Err(LedgerError::status(status)),
            None => Ok(state.tallies.get(id).copied().unwrap_or_default()),
        }
    }

    async fn transfer(&self, from: &str, to: &str, amount: u64) -> Result<(), LedgerError> {
        let mut state = self.state();
        state.calls.push(LedgerCall::Transfer {
            from: from.to_string(),
            to: to.to_string(),
            amount,
        });
        if let Some(status) = state.transfer_failure {
            return Err(LedgerError::status(status));
        }

        let amount = amount as i64;
        let sender = state.tallies.entry(from.to_string()).or_default();
        sender.own -= amount;
        sender.total -= amount;
        let receiver = state.tallies.entry(to.to_string()).or_default();
        receiver.assigned += amount;
        receiver.total += amount;
        Ok(())
    }

    async fn claim(&self, id: &str, index: usize) -> Result<(), LedgerError> {
        let mut state = self.state();
        state.calls.push(LedgerCall::Claim { id: id.to_string(), index });
        match state.claim_failure {
            Some(status) => Err(LedgerError::status(status)),
            None => Ok(()),
        }
    }
}
