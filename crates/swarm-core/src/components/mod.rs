//! Agent data
//!
//! Records built once at bootstrap and shared read-only afterwards.

pub mod agent;

pub use agent::*;
