//! Species tags and the per-species behaviour table.
//!
//! Both species share one `Being` record; every behavioural difference is
//! looked up here by tag instead of being encoded in separate types.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    /// Baseline forager, defends itself when hunted.
    A,
    /// Predator, hunts A when stressed.
    B,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::A, Species::B];

    pub fn label(self) -> &'static str {
        match self {
            Species::A => "A",
            Species::B => "B",
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per species.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerSpecies<T> {
    pub a: T,
    pub b: T,
}

impl<T> PerSpecies<T> {
    pub fn new(a: T, b: T) -> Self {
        PerSpecies { a, b }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Species, &T) -> U) -> PerSpecies<U> {
        PerSpecies {
            a: f(Species::A, &self.a),
            b: f(Species::B, &self.b),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Species, &T)> {
        [(Species::A, &self.a), (Species::B, &self.b)].into_iter()
    }
}

impl<T> Index<Species> for PerSpecies<T> {
    type Output = T;

    fn index(&self, species: Species) -> &T {
        match species {
            Species::A => &self.a,
            Species::B => &self.b,
        }
    }
}

impl<T> IndexMut<Species> for PerSpecies<T> {
    fn index_mut(&mut self, species: Species) -> &mut T {
        match species {
            Species::A => &mut self.a,
            Species::B => &mut self.b,
        }
    }
}

/// How much a being takes from the shared pool on its foraging turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForagePolicy {
    /// `min(max(minimum_cost, efficiency), available)`
    Capped,
    /// `efficiency * available`, may exceed what is left.
    Proportional,
}

impl ForagePolicy {
    pub fn gain(self, efficiency: f64, available: f64, minimum_cost: f64) -> f64 {
        match self {
            ForagePolicy::Capped => minimum_cost.max(efficiency).min(available),
            ForagePolicy::Proportional => efficiency * available,
        }
    }
}

/// Escape/counterattack parameters of a species that can be hunted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Defense {
    pub escape_chance: f64,
    pub counterattack_factor: f64,
}

/// Predation trigger of a hunting species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hunting {
    pub prey: Species,
    /// Ticks without reproducing after which a hunter counts as stressed.
    pub stress_threshold: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesPolicy {
    pub forage: ForagePolicy,
    pub reproduction_cost: f64,
    /// Consecutive qualifying ticks required before reproducing.
    pub reproduction_threshold: u32,
    /// Applied once to a seed being's drawn efficiency.
    pub efficiency_scale: f64,
    pub max_age: Option<u32>,
    pub defense: Option<Defense>,
    pub hunting: Option<Hunting>,
}

/// Lookup table consulted by the engine for every species-specific decision.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyTable {
    pub survival_cost: f64,
    policies: PerSpecies<SpeciesPolicy>,
}

impl PolicyTable {
    pub fn from_config(config: &Config) -> Self {
        let forage = config.metabolism.forage_policy;
        let policy = |species: Species| {
            let sc = &config.species[species];
            SpeciesPolicy {
                forage,
                reproduction_cost: sc.reproduction_cost,
                reproduction_threshold: sc.reproduction_threshold,
                efficiency_scale: sc.efficiency_scale,
                max_age: sc.max_age,
                defense: (species == Species::A).then_some(Defense {
                    escape_chance: config.predation.escape_chance,
                    counterattack_factor: config.predation.counterattack_factor,
                }),
                hunting: (species == Species::B).then_some(Hunting {
                    prey: Species::A,
                    stress_threshold: config.predation.stress_threshold,
                }),
            }
        };

        PolicyTable {
            survival_cost: config.metabolism.survival_cost,
            policies: PerSpecies::new(policy(Species::A), policy(Species::B)),
        }
    }

    pub fn get(&self, species: Species) -> &SpeciesPolicy {
        &self.policies[species]
    }
}
