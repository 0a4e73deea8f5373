//! Population Setup
//!
//! Id generation, friend graph construction, policy assignment, and the
//! bootstrap pipeline that ties them to the ledger.

pub mod friends;
pub mod identity;
pub mod policy;
pub mod population;

pub use friends::*;
pub use identity::*;
pub use policy::*;
pub use population::*;
