//! Contract with the external points ledger.
//!
//! Wire types, the async [`Ledger`] trait the simulation engine talks to, and
//! [`HttpLedger`], the `reqwest` implementation used in production. The engine
//! never sees HTTP directly; every ledger interaction goes through the trait.

pub mod error;
pub mod http;
pub mod ledger;
pub mod types;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

pub use error::LedgerError;
pub use http::HttpLedger;
pub use ledger::Ledger;
pub use types::{ClaimRequest, RegisterRequest, SignupReceipt, Tally, UserProfile};

/// Id of the ledger's own system account. It is listed alongside registered
/// users but never simulated.
pub const RESERVED_LEDGER_ID: &str = "morat";
