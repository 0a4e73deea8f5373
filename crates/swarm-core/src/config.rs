//! Configuration System
//!
//! Loads tuning parameters from `swarm.toml`. Every section is optional and
//! falls back to the defaults below, so a partial file only overrides what it
//! names.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "swarm.toml";

/// Tolerance used when checking that probability weights sum to one
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Top-level configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub cadence: CadenceConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
}

/// Where the ledger service lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub base_url: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Status endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3030)),
        }
    }
}

/// Population size and social graph density
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of agents to register
    pub size: usize,
    /// Lower bound on each agent's friend count
    pub min_friends: usize,
    /// Upper bound on friend count as a fraction of the population
    pub max_friends_fraction: f64,
    /// Chance that an agent opts out of automatic crediting. Leaving this
    /// unset disables opt-out handling entirely.
    pub opt_out_probability: Option<f64>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 10,
            min_friends: 1,
            max_friends_fraction: 0.8,
            opt_out_probability: None,
        }
    }
}

impl PopulationConfig {
    /// Whether registration, bootstrap and agents deal with opt-out at all.
    pub fn opt_out_aware(&self) -> bool {
        self.opt_out_probability.is_some()
    }
}

/// Bounds on how often an agent acts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    pub min_seconds: f64,
    pub max_seconds: f64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            min_seconds: 0.5,
            max_seconds: 5.0,
        }
    }
}

/// How agents size their transfers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferConfig {
    /// A random share of the current balance every tick
    Percentage(PercentageConfig),
    /// Discrete amounts picked by a per-agent style
    Tiered(TieredConfig),
}

impl Default for TransferConfig {
    fn default() -> Self {
        TransferConfig::Percentage(PercentageConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PercentageConfig {
    /// Smallest transfer ever attempted
    pub min_points: u64,
    pub min_pct: f64,
    pub max_pct: f64,
    /// Floor on the drawn fraction so a transfer is never sized at zero
    pub pct_floor: f64,
}

impl Default for PercentageConfig {
    fn default() -> Self {
        Self {
            min_points: 10,
            min_pct: 0.0,
            max_pct: 0.1,
            pct_floor: 0.0001,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TieredConfig {
    /// Point amounts, strictly ascending
    pub tiers: Vec<u64>,
    /// Styles an agent can be given; weights sum to one
    pub styles: Vec<StyleConfig>,
}

impl Default for TieredConfig {
    fn default() -> Self {
        Self {
            tiers: vec![10, 50, 100],
            styles: vec![
                StyleConfig::new("frugal", 0.5, vec![0.7, 0.2, 0.1]),
                StyleConfig::new("steady", 0.3, vec![0.3, 0.5, 0.2]),
                StyleConfig::new("generous", 0.2, vec![0.1, 0.3, 0.6]),
            ],
        }
    }
}

/// A transfer style: how likely it is to be assigned, and how it spreads
/// over the tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub name: String,
    pub weight: f64,
    /// One weight per tier, same order as `tiers`; sums to one
    pub tier_weights: Vec<f64>,
}

impl StyleConfig {
    pub fn new(name: impl Into<String>, weight: f64, tier_weights: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            weight,
            tier_weights,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Load configuration from `path`, or use defaults if the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks the semantic constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let population = &self.population;
        if population.size == 0 {
            return Err(ConfigError::invalid("population.size must be at least 1"));
        }
        if !(population.max_friends_fraction > 0.0 && population.max_friends_fraction <= 1.0) {
            return Err(ConfigError::invalid(
                "population.max_friends_fraction must be in (0, 1]",
            ));
        }
        if let Some(p) = population.opt_out_probability {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::invalid(
                    "population.opt_out_probability must be in [0, 1]",
                ));
            }
        }

        let cadence = &self.cadence;
        if !(cadence.min_seconds >= 0.0 && cadence.min_seconds <= cadence.max_seconds)
            || !cadence.max_seconds.is_finite()
        {
            return Err(ConfigError::invalid(
                "cadence needs 0 <= min_seconds <= max_seconds",
            ));
        }

        match &self.transfer {
            TransferConfig::Percentage(pct) => pct.validate(),
            TransferConfig::Tiered(tiered) => tiered.validate(),
        }
    }
}

impl PercentageConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !(in_unit(self.min_pct) && in_unit(self.max_pct) && self.min_pct <= self.max_pct) {
            return Err(ConfigError::invalid(
                "transfer needs 0 <= min_pct <= max_pct <= 1",
            ));
        }
        if !in_unit(self.pct_floor) {
            return Err(ConfigError::invalid("transfer.pct_floor must be in [0, 1]"));
        }
        if self.min_points == 0 {
            return Err(ConfigError::invalid("transfer.min_points must be at least 1"));
        }
        Ok(())
    }
}

impl TieredConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.tiers.is_empty() {
            return Err(ConfigError::invalid("transfer.tiers must not be empty"));
        }
        if self.tiers[0] == 0 || self.tiers.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::invalid(
                "transfer.tiers must be positive and strictly ascending",
            ));
        }
        if self.styles.is_empty() {
            return Err(ConfigError::invalid("transfer.styles must not be empty"));
        }
        check_weights("style weights", self.styles.iter().map(|s| s.weight))?;
        for style in &self.styles {
            if style.tier_weights.len() != self.tiers.len() {
                return Err(ConfigError::Invalid(format!(
                    "style '{}' has {} tier weights for {} tiers",
                    style.name,
                    style.tier_weights.len(),
                    self.tiers.len()
                )));
            }
            check_weights(&format!("style '{}' tier weights", style.name), style.tier_weights.iter().copied())?;
        }
        Ok(())
    }
}

fn check_weights(what: &str, weights: impl Iterator<Item = f64>) -> Result<(), ConfigError> {
    let mut sum = 0.0;
    for w in weights {
        if !(w >= 0.0 && w.is_finite()) {
            return Err(ConfigError::Invalid(format!("{what} must be non-negative")));
        }
        sum += w;
    }
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ConfigError::Invalid(format!("{what} sum to {sum}, expected 1")));
    }
    Ok(())
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Agent swarm configuration

[ledger]
base_url = "http://localhost:3000"

[server]
bind_addr = "0.0.0.0:3030"

[population]
size = 10
min_friends = 1
max_friends_fraction = 0.8
# Uncomment to have agents opt out of automatic crediting and claim instead.
# opt_out_probability = 0.25

[cadence]
min_seconds = 0.5
max_seconds = 5.0

[transfer]
kind = "percentage"
min_points = 10
min_pct = 0.0
max_pct = 0.1
pct_floor = 0.0001
"#
    .to_string()
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn invalid(message: &str) -> Self {
        ConfigError::Invalid(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.population.size, 10);
        assert_eq!(config.population.min_friends, 1);
        assert_eq!(config.cadence.min_seconds, 0.5);
        assert!(!config.population.opt_out_aware());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_toml_parses() {
        let config = Config::from_str(&default_config_toml()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_str(
            r#"
            [population]
            size = 25
            opt_out_probability = 0.3
            "#,
        )
        .unwrap();

        assert_eq!(config.population.size, 25);
        assert_eq!(config.population.opt_out_probability, Some(0.3));
        assert_eq!(config.population.min_friends, 1);
        assert_eq!(config.cadence, CadenceConfig::default());
        assert_eq!(config.transfer, TransferConfig::default());
    }

    #[test]
    fn test_tiered_config_from_toml() {
        let config = Config::from_str(
            r#"
            [transfer]
            kind = "tiered"
            tiers = [5, 20]

            [[transfer.styles]]
            name = "cautious"
            weight = 1.0
            tier_weights = [0.9, 0.1]
            "#,
        )
        .unwrap();

        match &config.transfer {
            TransferConfig::Tiered(tiered) => {
                assert_eq!(tiered.tiers, vec![5, 20]);
                assert_eq!(tiered.styles.len(), 1);
                assert_eq!(tiered.styles[0].name, "cautious");
            }
            other => panic!("expected tiered config, got {other:?}"),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tiered_kind_alone_uses_default_tiers() {
        let config = Config::from_str("[transfer]\nkind = \"tiered\"\n").unwrap();
        assert_eq!(config.transfer, TransferConfig::Tiered(TieredConfig::default()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_cadence() {
        let mut config = Config::default();
        config.cadence = CadenceConfig { min_seconds: 3.0, max_seconds: 1.0 };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_probabilities() {
        let mut config = Config::default();
        config.population.opt_out_probability = Some(1.5);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.population.max_friends_fraction = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.population.size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_tiers() {
        let mut tiered = TieredConfig::default();
        tiered.tiers = vec![50, 10, 100];
        assert!(tiered.validate().is_err());

        let mut tiered = TieredConfig::default();
        tiered.styles[0].weight = 0.9;
        assert!(tiered.validate().is_err());

        let mut tiered = TieredConfig::default();
        tiered.styles[1].tier_weights = vec![0.5, 0.5];
        assert!(tiered.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_percentages() {
        let pct = PercentageConfig { min_pct: 0.2, max_pct: 0.1, ..PercentageConfig::default() };
        assert!(pct.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_min_points() {
        let pct = PercentageConfig { min_points: 0, pct_floor: 0.0, ..PercentageConfig::default() };
        assert!(matches!(pct.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cadence]\nmin_seconds = 1.0\nmax_seconds = 2.0").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.cadence.min_seconds, 1.0);
        assert_eq!(config.cadence.max_seconds, 2.0);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[population]\nsize = \"many\"").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_to_toml_sections() {
        let toml = Config::default().to_toml().unwrap();
        assert!(toml.contains("[population]"));
        assert!(toml.contains("[transfer]"));
        assert!(toml.contains("kind = \"percentage\""));
    }
}
