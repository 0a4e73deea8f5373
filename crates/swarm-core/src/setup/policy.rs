//! Policy Generation
//!
//! Draws each agent's cadence and transfer policy once, at construction.

use rand::Rng;

use crate::components::TransferPolicy;
use crate::config::{CadenceConfig, ConfigError, StyleConfig, TransferConfig};
use crate::systems::select::WeightedChoice;

/// Convert a cadence drawn in seconds into whole milliseconds.
pub fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds * 1000.0).round() as u64
}

/// Draw an action interval uniformly from the configured range.
pub fn draw_action_interval_ms<R: Rng + ?Sized>(cadence: &CadenceConfig, rng: &mut R) -> u64 {
    seconds_to_ms(rng.gen_range(cadence.min_seconds..=cadence.max_seconds))
}

/// Decide opt-out for one agent. `None` when the deployment is not
/// opt-out-aware.
pub fn draw_opt_out<R: Rng + ?Sized>(probability: Option<f64>, rng: &mut R) -> Option<bool> {
    probability.map(|p| rng.gen_bool(p.clamp(0.0, 1.0)))
}

/// Cadence and transfer policy for one agent
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub action_interval_ms: u64,
    pub transfer_policy: TransferPolicy,
}

#[derive(Debug, Clone)]
enum PolicySource {
    Percentage {
        min_pct: f64,
        max_pct: f64,
        pct_floor: f64,
        min_points: u64,
    },
    Tiered {
        tiers: Vec<u64>,
        styles: WeightedChoice<StyleConfig>,
    },
}

/// Produces agent profiles from a validated config.
#[derive(Debug, Clone)]
pub struct PolicyGenerator {
    cadence: CadenceConfig,
    source: PolicySource,
}

impl PolicyGenerator {
    pub fn new(cadence: &CadenceConfig, transfer: &TransferConfig) -> Result<Self, ConfigError> {
        let source = match transfer {
            TransferConfig::Percentage(pct) => PolicySource::Percentage {
                min_pct: pct.min_pct,
                max_pct: pct.max_pct,
                pct_floor: pct.pct_floor,
                min_points: pct.min_points,
            },
            TransferConfig::Tiered(tiered) => {
                let styles = WeightedChoice::new(
                    tiered.styles.iter().map(|style| (style.clone(), style.weight)),
                )
                .ok_or_else(|| ConfigError::Invalid("no selectable transfer style".to_string()))?;
                PolicySource::Tiered {
                    tiers: tiered.tiers.clone(),
                    styles,
                }
            }
        };
        Ok(Self {
            cadence: cadence.clone(),
            source,
        })
    }

    pub fn transfer_policy<R: Rng + ?Sized>(&self, rng: &mut R) -> TransferPolicy {
        match &self.source {
            PolicySource::Percentage {
                min_pct,
                max_pct,
                pct_floor,
                min_points,
            } => TransferPolicy::Percentage {
                min_pct: *min_pct,
                max_pct: *max_pct,
                pct_floor: *pct_floor,
                min_points: *min_points,
            },
            PolicySource::Tiered { tiers, styles } => {
                let style = styles.sample(rng);
                TransferPolicy::Tiered {
                    style: style.name.clone(),
                    tiers: tiers.clone(),
                    tier_weights: style.tier_weights.clone(),
                }
            }
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> AgentProfile {
        AgentProfile {
            action_interval_ms: draw_action_interval_ms(&self.cadence, rng),
            transfer_policy: self.transfer_policy(rng),
        }
    }
}
