//! Configuration for a simulation run.
//!
//! Supports YAML configuration files with defaults matching the
//! predator/prey scenario. A `Config` is immutable for the lifetime of an
//! engine; changing parameters means building a new engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::species::{ForagePolicy, PerSpecies, Species};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub resources: ResourceConfig,
    #[serde(default)]
    pub metabolism: MetabolismConfig,
    #[serde(default = "default_species")]
    pub species: PerSpecies<SpeciesConfig>,
    #[serde(default)]
    pub predation: PredationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Run bounds and reproducibility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Maximum number of ticks to simulate
    pub ticks: u64,
    /// Species count above which the run is declared exploded
    pub explosion_bound: usize,
    /// Seed for the random source; drawn fresh when absent
    pub seed: Option<u64>,
}

/// Shared resource pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Units added per tick, each worth this same amount
    pub generation_rate: u32,
    /// Units older than this are discarded
    pub expiration_age: u32,
}

/// Costs and inheritance shared by both species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetabolismConfig {
    /// Resources paid every tick to stay alive
    pub survival_cost: f64,
    /// Half-width of the uniform efficiency perturbation at reproduction
    pub mutation_rate: f64,
    /// Balance given to seed beings and to every offspring
    pub starting_balance: f64,
    pub forage_policy: ForagePolicy,
    /// Seed efficiency is drawn uniformly from this range before scaling
    pub initial_efficiency_min: f64,
    pub initial_efficiency_max: f64,
}

/// Per-species parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesConfig {
    pub initial_count: usize,
    pub reproduction_cost: f64,
    /// Consecutive ticks with enough resources before reproducing
    pub reproduction_threshold: u32,
    /// Multiplier on seed efficiency (predator specialization)
    pub efficiency_scale: f64,
    /// Beings older than this die; `None` disables aging
    #[serde(default)]
    pub max_age: Option<u32>,
}

/// Predation and defense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredationConfig {
    /// Ticks without reproducing after which a predator hunts
    pub stress_threshold: u32,
    /// Informational; a successful hunt transfers the victim's whole balance
    pub gain: f64,
    pub escape_chance: f64,
    /// Counterattack chance is `efficiency * counterattack_factor`
    pub counterattack_factor: f64,
}

/// Progress reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Ticks between progress lines
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),
            resources: ResourceConfig::default(),
            metabolism: MetabolismConfig::default(),
            species: default_species(),
            predation: PredationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 100,
            explosion_bound: 10_000,
            seed: None,
        }
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            generation_rate: 20,
            expiration_age: 3,
        }
    }
}

impl Default for MetabolismConfig {
    fn default() -> Self {
        Self {
            survival_cost: 10.0,
            mutation_rate: 0.1,
            starting_balance: 160.0,
            forage_policy: ForagePolicy::Proportional,
            initial_efficiency_min: 0.1,
            initial_efficiency_max: 1.0,
        }
    }
}

impl Default for PredationConfig {
    fn default() -> Self {
        Self {
            stress_threshold: 4,
            gain: 40.0,
            escape_chance: 0.3,
            counterattack_factor: 0.1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 10,
            log_level: "info".to_string(),
        }
    }
}

fn default_species() -> PerSpecies<SpeciesConfig> {
    PerSpecies::new(
        SpeciesConfig {
            initial_count: 100,
            reproduction_cost: 21.0,
            reproduction_threshold: 3,
            efficiency_scale: 1.0,
            max_age: Some(8),
        },
        SpeciesConfig {
            initial_count: 90,
            reproduction_cost: 60.0,
            reproduction_threshold: 7,
            efficiency_scale: 0.5,
            max_age: Some(8),
        },
    )
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("metabolism.survival_cost", self.metabolism.survival_cost)?;
        non_negative("metabolism.mutation_rate", self.metabolism.mutation_rate)?;
        if !(2.0 * self.metabolism.mutation_rate).is_finite() {
            return Err(ConfigError::invalid(
                "metabolism.mutation_rate",
                format!("{} is too large to sample", self.metabolism.mutation_rate),
            ));
        }
        non_negative("metabolism.starting_balance", self.metabolism.starting_balance)?;
        non_negative("predation.gain", self.predation.gain)?;
        non_negative(
            "predation.counterattack_factor",
            self.predation.counterattack_factor,
        )?;
        probability("predation.escape_chance", self.predation.escape_chance)?;

        let (min, max) = (
            self.metabolism.initial_efficiency_min,
            self.metabolism.initial_efficiency_max,
        );
        if !min.is_finite() || !max.is_finite() || min < crate::genetics::MIN_EFFICIENCY {
            return Err(ConfigError::invalid(
                "metabolism.initial_efficiency_min",
                format!("must be finite and at least {}", crate::genetics::MIN_EFFICIENCY),
            ));
        }
        if min > max {
            return Err(ConfigError::invalid(
                "metabolism.initial_efficiency_max",
                format!("{max} is below initial_efficiency_min {min}"),
            ));
        }

        if self.run.explosion_bound == 0 {
            return Err(ConfigError::invalid("run.explosion_bound", "must be > 0"));
        }

        for species in Species::ALL {
            let sc = &self.species[species];
            let field = match species {
                Species::A => ["species.a.reproduction_cost", "species.a.efficiency_scale"],
                Species::B => ["species.b.reproduction_cost", "species.b.efficiency_scale"],
            };
            non_negative(field[0], sc.reproduction_cost)?;
            if !sc.efficiency_scale.is_finite() || sc.efficiency_scale <= 0.0 {
                return Err(ConfigError::invalid(field[1], "must be finite and > 0"));
            }
            if sc.reproduction_threshold == 0 {
                return Err(ConfigError::invalid(
                    "species.reproduction_threshold",
                    format!("species {species} threshold must be > 0"),
                ));
            }
            if sc.initial_count > self.run.explosion_bound {
                return Err(ConfigError::invalid(
                    "species.initial_count",
                    format!(
                        "species {species} starts with {} beings, above explosion_bound {}",
                        sc.initial_count, self.run.explosion_bound
                    ),
                ));
            }
        }

        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::invalid(
            field,
            format!("{value} must be finite and >= 0"),
        ));
    }
    Ok(())
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(
            field,
            format!("{value} is not a probability in [0, 1]"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "run:\n  ticks: 250\nmetabolism:\n  forage_policy: capped\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.run.ticks, 250);
        assert_eq!(config.metabolism.forage_policy, ForagePolicy::Capped);
        assert_eq!(config.resources, ResourceConfig::default());
        assert_eq!(config.species.b.reproduction_threshold, 7);
    }

    #[test]
    fn test_non_numeric_input_rejected() {
        let yaml = "metabolism:\n  survival_cost: lots\n";
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_negative_count_rejected_by_parser() {
        let yaml = "species:\n  a:\n    initial_count: -4\n    reproduction_cost: 20\n    reproduction_threshold: 3\n    efficiency_scale: 1.0\n  b:\n    initial_count: 10\n    reproduction_cost: 50\n    reproduction_threshold: 7\n    efficiency_scale: 0.5\n";
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_escape_chance_out_of_range() {
        let mut config = Config::default();
        config.predation.escape_chance = 1.5;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "predation.escape_chance", .. }
        ));
    }

    #[test]
    fn test_negative_cost_rejected() {
        let mut config = Config::default();
        config.species.b.reproduction_cost = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.metabolism.survival_cost = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_mutation_rate_rejected() {
        let mut config = Config::default();
        config.metabolism.mutation_rate = 1e308;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "metabolism.mutation_rate", .. })
        ));

        config.metabolism.mutation_rate = 2.5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_efficiency_range_checked() {
        let mut config = Config::default();
        config.metabolism.initial_efficiency_min = 0.05;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.metabolism.initial_efficiency_min = 0.9;
        config.metabolism.initial_efficiency_max = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_seed_count_above_bound_rejected() {
        let mut config = Config::default();
        config.run.explosion_bound = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rivalry.yaml");
        let mut config = Config::default();
        config.run.seed = Some(7);
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.run.seed, Some(7));
    }
}
