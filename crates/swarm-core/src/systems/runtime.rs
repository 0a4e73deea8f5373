//! Agent Runtime
//!
//! Each agent runs its own endless cycle: sleep, pick a friend, claim if
//! opted out, read the tally, decide, transfer. Failures are logged and the
//! cycle moves on to the next tick; nothing here retries or stops the loop.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use swarm_ledger::Ledger;
use tokio::task::JoinSet;

use crate::components::Agent;
use crate::systems::decide::{decide_transfer, SkipReason, TransferDecision};

/// Tier index opted-out agents claim every tick
pub const CLAIM_TIER_INDEX: usize = 0;

/// Result of one tick, for logging and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Transferred { to: String, amount: u64 },
    Skipped(SkipReason),
    TransferFailed { to: String, amount: u64, error: String },
    TallyFailed(String),
    /// The agent has nobody to pay
    NoFriends,
}

/// Runs a single tick for `agent` without the leading sleep.
pub async fn run_tick<L, R>(agent: &Agent, ledger: &L, rng: &mut R) -> TickOutcome
where
    L: Ledger + ?Sized,
    R: Rng + Send + ?Sized,
{
    let friend = agent.friends.choose(rng).cloned();

    if agent.opted_out {
        if let Err(e) = ledger.claim(&agent.id, CLAIM_TIER_INDEX).await {
            tracing::error!("Failed to claim points for {}", agent.id);
            tracing::error!(" . {}", e);
        }
    }

    let Some(friend) = friend else {
        tracing::warn!(" . Agent {} has no friends to transfer to - skipping", agent.id);
        return TickOutcome::NoFriends;
    };

    let tally = match ledger.tally(&agent.id).await {
        Ok(tally) => tally,
        Err(e) => {
            tracing::error!("Failed to read tally for {}: {}", agent.id, e);
            return TickOutcome::TallyFailed(e.to_string());
        }
    };
    tracing::info!(
        "Agent {} has {}/{}/{} points",
        agent.id,
        tally.own,
        tally.assigned,
        tally.total
    );

    let amount = match decide_transfer(&agent.transfer_policy, &tally, rng) {
        TransferDecision::Transfer(amount) => amount,
        TransferDecision::Skip(reason) => {
            tracing::warn!(" . Agent {} {}", agent.id, reason);
            return TickOutcome::Skipped(reason);
        }
    };

    tracing::info!(" . Agent {} will assign {} points to {}", agent.id, amount, friend);
    match ledger.transfer(&agent.id, &friend, amount).await {
        Ok(()) => TickOutcome::Transferred { to: friend, amount },
        Err(e) => {
            tracing::error!("Failed to transfer points from {} to {}", agent.id, friend);
            tracing::error!(" . {}", e);
            TickOutcome::TransferFailed {
                to: friend,
                amount,
                error: e.to_string(),
            }
        }
    }
}

/// Runs `agent` forever at its own cadence.
pub async fn agent_loop<L>(agent: Agent, ledger: Arc<L>, mut rng: SmallRng)
where
    L: Ledger + ?Sized,
{
    let interval = Duration::from_millis(agent.action_interval_ms);
    loop {
        tokio::time::sleep(interval).await;
        let outcome = run_tick(&agent, &*ledger, &mut rng).await;
        tracing::debug!("Agent {} tick: {:?}", agent.id, outcome);
    }
}

/// Spawns one independent task per agent. Each task gets its own RNG seeded
/// from `rng`, so a seeded run stays reproducible per agent.
pub fn launch_agents<L>(agents: &[Agent], ledger: Arc<L>, rng: &mut SmallRng) -> JoinSet<()>
where
    L: Ledger + ?Sized + 'static,
{
    let mut tasks = JoinSet::new();
    for agent in agents {
        let agent_rng = SmallRng::seed_from_u64(rng.gen());
        tasks.spawn(agent_loop(agent.clone(), Arc::clone(&ledger), agent_rng));
    }
    tasks
}
