//! Agent behavior
//!
//! Weighted selection, transfer decisions, and the per-agent runtime loop.

pub mod decide;
pub mod runtime;
pub mod select;

pub use decide::{decide_transfer, pick_affordable_tier, SkipReason, TransferDecision};
pub use runtime::{agent_loop, launch_agents, run_tick, TickOutcome, CLAIM_TIER_INDEX};
pub use select::WeightedChoice;
