//! Agent swarm simulation engine.
//!
//! Bootstraps a population of agents against a points ledger, gives each a
//! friend set and a transfer policy, and runs every agent's transfer loop
//! concurrently.
//!
//! # Modules
//!
//! - [`config`]: TOML tunables
//! - [`components`]: the agent record
//! - [`setup`]: ids, friend graph, policies, and the bootstrap pipeline
//! - [`systems`]: weighted choice, transfer decisions, and the agent runtime
//! - [`server`]: read-only roster endpoint

pub mod components;
pub mod config;
pub mod server;
pub mod setup;
pub mod systems;

pub use components::{Agent, TransferPolicy};
pub use config::{Config, ConfigError, DEFAULT_CONFIG_PATH};
pub use server::{Roster, ServerError};
pub use setup::{bootstrap, PopulationContext, PopulationSummary};
pub use systems::{launch_agents, run_tick, TickOutcome};
