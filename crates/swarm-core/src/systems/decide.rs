//! Transfer Decision
//!
//! Turns an agent's policy and its current tally into either a transfer
//! amount or a reason to sit this tick out. Pure apart from the RNG, so the
//! affordability guarantees can be checked without a ledger.

use rand::Rng;
use swarm_ledger::Tally;

use crate::components::TransferPolicy;
use crate::systems::select::WeightedChoice;

/// What an agent does with its balance this tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferDecision {
    Transfer(u64),
    Skip(SkipReason),
}

/// Why no transfer was issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Balance is zero or negative
    NoPoints { available: i64 },
    /// Balance is below the computed amount
    NotEnough { available: i64, amount: u64 },
    /// Tiered policy found no tier it can afford
    NothingAffordable { available: i64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoPoints { .. } => write!(f, "has no points to transfer - skipping"),
            SkipReason::NotEnough { available, .. } => {
                write!(f, "only has {} points, not enough to transfer", available)
            }
            SkipReason::NothingAffordable { available } => {
                write!(f, "cannot afford any tier with {} points - skipping", available)
            }
        }
    }
}

impl TransferPolicy {
    /// Candidate amount for this tick before the balance guard. Only the
    /// tiered policy yields zero, when no tier fits within `available`; the
    /// percentage policy always asks for at least one point.
    pub fn candidate_amount<R: Rng + ?Sized>(&self, available: i64, rng: &mut R) -> u64 {
        match self {
            TransferPolicy::Percentage {
                min_pct,
                max_pct,
                pct_floor,
                min_points,
            } => {
                let pct = rng.gen_range(*min_pct..=*max_pct).max(*pct_floor);
                let share = (pct * available as f64).round();
                let share = if share > 0.0 { share as u64 } else { 0 };
                share.max(*min_points).max(1)
            }
            TransferPolicy::Tiered {
                tiers,
                tier_weights,
                ..
            } => pick_affordable_tier(tiers, tier_weights, available, rng).unwrap_or(0),
        }
    }
}

/// Weighted choice restricted to tiers not exceeding `available`. The
/// weights of affordable tiers keep their relative proportions.
pub fn pick_affordable_tier<R: Rng + ?Sized>(
    tiers: &[u64],
    weights: &[f64],
    available: i64,
    rng: &mut R,
) -> Option<u64> {
    if available <= 0 {
        return None;
    }
    let affordable = tiers
        .iter()
        .zip(weights)
        .filter(|(&tier, _)| tier <= available as u64)
        .map(|(&tier, &weight)| (tier, weight));

    WeightedChoice::new(affordable).map(|choice| *choice.sample(rng))
}

/// Decides this tick's transfer from the agent's policy and balance.
pub fn decide_transfer<R: Rng + ?Sized>(
    policy: &TransferPolicy,
    tally: &Tally,
    rng: &mut R,
) -> TransferDecision {
    let available = tally.total;
    let amount = policy.candidate_amount(available, rng);

    if available <= 0 {
        return TransferDecision::Skip(SkipReason::NoPoints { available });
    }
    if amount == 0 && matches!(policy, TransferPolicy::Tiered { .. }) {
        return TransferDecision::Skip(SkipReason::NothingAffordable { available });
    }
    if available < amount as i64 {
        return TransferDecision::Skip(SkipReason::NotEnough { available, amount });
    }
    TransferDecision::Transfer(amount)
}
