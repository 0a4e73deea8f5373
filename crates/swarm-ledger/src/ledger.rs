//! Ledger trait

use async_trait::async_trait;

use crate::{LedgerError, SignupReceipt, Tally, UserProfile};

/// Operations the simulation needs from the ledger service.
///
/// Implementations must be shareable across agent tasks. No method retries;
/// callers decide what a failure means.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Registers a new account. `opts_in` is sent only by opt-out-aware
    /// deployments; `None` registers with the ledger's default.
    async fn register(&self, id: &str, opts_in: Option<bool>) -> Result<SignupReceipt, LedgerError>;

    /// Lists every registered account id, including the reserved system account.
    async fn list_users(&self) -> Result<Vec<String>, LedgerError>;

    /// Fetches an account's stored profile.
    async fn profile(&self, id: &str) -> Result<UserProfile, LedgerError>;

    /// Fetches an account's current balance breakdown.
    async fn tally(&self, id: &str) -> Result<Tally, LedgerError>;

    /// Moves `amount` points from `from` to `to`.
    async fn transfer(&self, from: &str, to: &str, amount: u64) -> Result<(), LedgerError>;

    /// Claims points previously assigned to `id` at the given tier index.
    async fn claim(&self, id: &str, index: usize) -> Result<(), LedgerError>;
}
