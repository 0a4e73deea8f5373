//! Population Bootstrap
//!
//! The strictly ordered startup pipeline: issue ids, register them, reconcile
//! against the ledger's own user list, recover opt-out flags, and build the
//! agent roster. State flows through an explicit [`PopulationContext`]
//! rather than anything process-wide, so every step can run on its own.

use rand::rngs::SmallRng;
use std::collections::{BTreeMap, HashSet};
use swarm_ledger::{Ledger, RESERVED_LEDGER_ID};

use crate::components::Agent;
use crate::config::{Config, ConfigError};
use crate::setup::friends::{pick_friends, FriendBounds};
use crate::setup::identity::generate_unique_id;
use crate::setup::policy::{draw_opt_out, PolicyGenerator};

/// Ids known during bootstrap, with their opt-out flags
#[derive(Debug, Clone, Default)]
pub struct PopulationContext {
    ids: Vec<String>,
    members: HashSet<String>,
    opted_out: HashSet<String>,
}

impl PopulationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids in insertion order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Adds `id` unless already present. The reserved ledger account is never added.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if id == RESERVED_LEDGER_ID || self.members.contains(&id) {
            return false;
        }
        self.members.insert(id.clone());
        self.ids.push(id);
        true
    }

    /// Issues a fresh id unique within this context.
    pub fn issue_id(&mut self, rng: &mut SmallRng) -> String {
        let id = generate_unique_id(&self.members, rng);
        self.insert(id.clone());
        id
    }

    /// Replaces the population with `ids`, dropping the reserved account and
    /// duplicates. Opt-out flags survive for ids still present.
    pub fn replace_ids(&mut self, ids: impl IntoIterator<Item = String>) {
        let opted_out = std::mem::take(&mut self.opted_out);
        self.ids.clear();
        self.members.clear();
        for id in ids {
            self.insert(id);
        }
        self.opted_out = opted_out
            .into_iter()
            .filter(|id| self.members.contains(id))
            .collect();
    }

    pub fn is_opted_out(&self, id: &str) -> bool {
        self.opted_out.contains(id)
    }

    pub fn set_opted_out(&mut self, id: &str, opted_out: bool) {
        if opted_out {
            self.opted_out.insert(id.to_string());
        } else {
            self.opted_out.remove(id);
        }
    }

    pub fn opted_out_count(&self) -> usize {
        self.opted_out.len()
    }
}

/// Step 1: issue `count` unique ids.
pub fn generate_ids(ctx: &mut PopulationContext, count: usize, rng: &mut SmallRng) {
    for _ in 0..count {
        ctx.issue_id(rng);
    }
}

/// Decides opt-out for every id. Does nothing when `probability` is `None`.
pub fn assign_opt_out(ctx: &mut PopulationContext, probability: Option<f64>, rng: &mut SmallRng) {
    let ids = ctx.ids().to_vec();
    for id in ids {
        if let Some(opted_out) = draw_opt_out(probability, rng) {
            ctx.set_opted_out(&id, opted_out);
        }
    }
}

/// Outcome counts of the registration step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Step 2: register every id. Failures are logged and the id stays in the
/// population. With `opt_out_aware`, each registration carries its flag.
pub async fn register_all<L: Ledger + ?Sized>(
    ctx: &PopulationContext,
    ledger: &L,
    opt_out_aware: bool,
) -> RegistrationReport {
    let mut report = RegistrationReport::default();
    for id in ctx.ids() {
        let opts_in = opt_out_aware.then(|| !ctx.is_opted_out(id));
        match ledger.register(id, opts_in).await {
            Ok(receipt) => {
                report.succeeded += 1;
                match receipt.epoch_sign_up {
                    Some(epoch) => tracing::info!(" . Created user {} epoch {}", id, epoch),
                    None => tracing::info!(" . Created user {}", id),
                }
            }
            Err(e) => {
                report.failed += 1;
                tracing::error!("Failed to create user {}: {}", id, e);
            }
        }
    }
    report
}

/// Step 3: replace local ids with the ledger's user list. If the list
/// cannot be fetched, the local ids are kept. Returns the population size.
pub async fn reconcile<L: Ledger + ?Sized>(ctx: &mut PopulationContext, ledger: &L) -> usize {
    match ledger.list_users().await {
        Ok(users) => ctx.replace_ids(users),
        Err(e) => tracing::warn!(
            "Could not list users ({}), keeping {} locally generated ids",
            e,
            ctx.len()
        ),
    }
    tracing::info!("Reconciled population of {} agents", ctx.len());
    ctx.len()
}

/// Step 4: read each id's stored opt-in flag back from the ledger. On a
/// failed lookup the locally decided flag stands.
pub async fn recover_opt_out<L: Ledger + ?Sized>(ctx: &mut PopulationContext, ledger: &L) {
    let ids = ctx.ids().to_vec();
    for id in ids {
        match ledger.profile(&id).await {
            Ok(profile) => ctx.set_opted_out(&id, !profile.opts_in),
            Err(e) => tracing::warn!("Could not read profile for {}: {}", id, e),
        }
    }
}

/// Step 5: build one agent per id, using the whole population as the
/// friend pool.
pub fn build_agents(
    ctx: &PopulationContext,
    config: &Config,
    generator: &PolicyGenerator,
    rng: &mut SmallRng,
) -> Vec<Agent> {
    let population = &config.population;
    let bounds =
        FriendBounds::for_population(ctx.len(), population.min_friends, population.max_friends_fraction);

    ctx.ids()
        .iter()
        .map(|id| {
            let friends = pick_friends(id, ctx.ids(), bounds, rng);
            let profile = generator.generate(rng);
            Agent {
                id: id.clone(),
                friends,
                action_interval_ms: profile.action_interval_ms,
                transfer_policy: profile.transfer_policy,
                opted_out: ctx.is_opted_out(id),
            }
        })
        .collect()
}

/// Validates `config`, runs steps 1 to 5 against `ledger`, and returns the roster.
pub async fn bootstrap<L: Ledger + ?Sized>(
    config: &Config,
    ledger: &L,
    rng: &mut SmallRng,
) -> Result<Vec<Agent>, ConfigError> {
    config.validate()?;
    let generator = PolicyGenerator::new(&config.cadence, &config.transfer)?;
    let opt_out_aware = config.population.opt_out_aware();
    let mut ctx = PopulationContext::new();

    tracing::info!("Registering agents...");
    generate_ids(&mut ctx, config.population.size, rng);
    assign_opt_out(&mut ctx, config.population.opt_out_probability, rng);
    let report = register_all(&ctx, ledger, opt_out_aware).await;
    tracing::info!(
        "Registered {} agents ({} failed)",
        report.succeeded,
        report.failed
    );

    tracing::info!("Getting all existing users...");
    reconcile(&mut ctx, ledger).await;
    if opt_out_aware {
        recover_opt_out(&mut ctx, ledger).await;
    }

    let agents = build_agents(&ctx, config, &generator, rng);

    tracing::info!("Roll call...");
    for agent in &agents {
        tracing::info!(" . Agent {} has {} friends", agent.id, agent.friend_count());
    }
    Ok(agents)
}

/// Summary of the built roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationSummary {
    pub total_agents: usize,
    pub opted_out: usize,
    pub min_friends: usize,
    pub max_friends: usize,
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    pub by_policy: BTreeMap<String, usize>,
}

impl PopulationSummary {
    pub fn from_agents(agents: &[Agent]) -> Self {
        let mut by_policy = BTreeMap::new();
        for agent in agents {
            *by_policy.entry(agent.transfer_policy.label().to_string()).or_insert(0) += 1;
        }

        Self {
            total_agents: agents.len(),
            opted_out: agents.iter().filter(|a| a.opted_out).count(),
            min_friends: agents.iter().map(Agent::friend_count).min().unwrap_or(0),
            max_friends: agents.iter().map(Agent::friend_count).max().unwrap_or(0),
            min_interval_ms: agents.iter().map(|a| a.action_interval_ms).min().unwrap_or(0),
            max_interval_ms: agents.iter().map(|a| a.action_interval_ms).max().unwrap_or(0),
            by_policy,
        }
    }
}

impl std::fmt::Display for PopulationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total agents: {} ({} opted out)", self.total_agents, self.opted_out)?;
        writeln!(f, "Friends per agent: {}-{}", self.min_friends, self.max_friends)?;
        writeln!(f, "Action interval: {}-{} ms", self.min_interval_ms, self.max_interval_ms)?;
        writeln!(f, "By policy:")?;
        for (policy, count) in &self.by_policy {
            writeln!(f, "  {}: {}", policy, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use swarm_ledger::fixtures::{LedgerCall, RecordingLedger};

    #[test]
    fn test_context_rejects_reserved_and_duplicates() {
        let mut ctx = PopulationContext::new();
        assert!(ctx.insert("abc"));
        assert!(!ctx.insert("abc"));
        assert!(!ctx.insert(RESERVED_LEDGER_ID));
        assert_eq!(ctx.ids(), ["abc".to_string()]);
    }

    #[test]
    fn test_replace_ids_keeps_surviving_opt_outs() {
        let mut ctx = PopulationContext::new();
        ctx.insert("abc");
        ctx.insert("def");
        ctx.set_opted_out("abc", true);
        ctx.set_opted_out("def", true);

        ctx.replace_ids(vec!["morat".to_string(), "abc".to_string(), "xyz".to_string()]);

        assert_eq!(ctx.ids(), ["abc".to_string(), "xyz".to_string()]);
        assert!(ctx.is_opted_out("abc"));
        assert!(!ctx.is_opted_out("def"));
        assert_eq!(ctx.opted_out_count(), 1);
    }

    #[test]
    fn test_generate_ids_are_unique() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut ctx = PopulationContext::new();
        generate_ids(&mut ctx, 200, &mut rng);

        let unique: HashSet<&String> = ctx.ids().iter().collect();
        assert_eq!(ctx.len(), 200);
        assert_eq!(unique.len(), 200);
    }

    #[test]
    fn test_assign_opt_out_disabled() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut ctx = PopulationContext::new();
        generate_ids(&mut ctx, 20, &mut rng);
        assign_opt_out(&mut ctx, None, &mut rng);
        assert_eq!(ctx.opted_out_count(), 0);

        assign_opt_out(&mut ctx, Some(1.0), &mut rng);
        assert_eq!(ctx.opted_out_count(), 20);
    }

    #[tokio::test]
    async fn test_register_all_continues_after_failure() {
        let mut ctx = PopulationContext::new();
        ctx.insert("abc");
        ctx.insert("bad");
        ctx.insert("def");
        let ledger = RecordingLedger::new().rejecting_registration("bad");

        let report = register_all(&ctx, &ledger, false).await;

        assert_eq!(report, RegistrationReport { succeeded: 2, failed: 1 });
        assert_eq!(ledger.calls().len(), 3);
        assert!(ctx.contains("bad"));
    }

    #[tokio::test]
    async fn test_register_all_sends_opt_in_flags() {
        let mut ctx = PopulationContext::new();
        ctx.insert("abc");
        ctx.insert("def");
        ctx.set_opted_out("def", true);
        let ledger = RecordingLedger::new();

        register_all(&ctx, &ledger, true).await;

        assert_eq!(
            ledger.calls(),
            vec![
                LedgerCall::Register { id: "abc".to_string(), opts_in: Some(true) },
                LedgerCall::Register { id: "def".to_string(), opts_in: Some(false) },
            ]
        );
    }

    #[tokio::test]
    async fn test_reconcile_keeps_local_ids_when_listing_fails() {
        let mut ctx = PopulationContext::new();
        ctx.insert("abc");
        let ledger = RecordingLedger::new().with_user("zzz", true).failing_list(502);

        assert_eq!(reconcile(&mut ctx, &ledger).await, 1);
        assert_eq!(ctx.ids(), ["abc".to_string()]);
    }

    #[tokio::test]
    async fn test_recover_opt_out_from_profiles() {
        let mut ctx = PopulationContext::new();
        ctx.insert("shy");
        ctx.insert("open");
        let ledger = RecordingLedger::new()
            .with_user("shy", false)
            .with_user("open", true);

        recover_opt_out(&mut ctx, &ledger).await;

        assert!(ctx.is_opted_out("shy"));
        assert!(!ctx.is_opted_out("open"));
    }

    #[tokio::test]
    async fn test_recover_opt_out_keeps_local_flag_on_failure() {
        let mut ctx = PopulationContext::new();
        ctx.insert("abc");
        ctx.set_opted_out("abc", true);
        let ledger = RecordingLedger::new().failing_profiles(500);

        recover_opt_out(&mut ctx, &ledger).await;

        assert!(ctx.is_opted_out("abc"));
    }

    #[test]
    fn test_summary() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut ctx = PopulationContext::new();
        generate_ids(&mut ctx, 10, &mut rng);
        let first = ctx.ids()[0].clone();
        ctx.set_opted_out(&first, true);

        let config = Config::default();
        let generator = PolicyGenerator::new(&config.cadence, &config.transfer).unwrap();
        let agents = build_agents(&ctx, &config, &generator, &mut rng);
        let summary = PopulationSummary::from_agents(&agents);

        assert_eq!(summary.total_agents, 10);
        assert_eq!(summary.opted_out, 1);
        assert!(summary.min_friends >= 1 && summary.max_friends <= 8);
        assert!(summary.min_interval_ms >= 500 && summary.max_interval_ms <= 5000);
        assert_eq!(summary.by_policy.get("percentage"), Some(&10));
        assert!(summary.to_string().contains("Total agents: 10 (1 opted out)"));
    }
}
