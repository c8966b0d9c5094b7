//! The tick loop. Phase order is fixed: resources, foraging, predation,
//! survival, reproduction, statistics, termination check.

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::being::Being;
use crate::config::Config;
use crate::error::ConfigError;
use crate::food::FoodPool;
use crate::genetics::Genetics;
use crate::predation::PredationResolver;
use crate::simulation_stats::{SimulationStats, TickEvents, TickRecord};
use crate::species::{PerSpecies, PolicyTable, Species};

/// Whether the run may continue. Terminal variants name the tick on which
/// the condition was observed and the affected species, A before B.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    Ongoing,
    Extinct { tick: u64, species: Vec<Species> },
    Exploded { tick: u64, species: Vec<Species> },
}

impl Termination {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Termination::Ongoing)
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |species: &[Species]| {
            species
                .iter()
                .map(|s| s.label())
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            Termination::Ongoing => write!(f, "ongoing"),
            Termination::Extinct { tick, species } => {
                write!(f, "species {} extinct at tick {}", names(species), tick)
            }
            Termination::Exploded { tick, species } => {
                write!(f, "species {} exploded at tick {}", names(species), tick)
            }
        }
    }
}

pub struct Simulation<R: Rng = ChaCha8Rng> {
    config: Config,
    policies: PolicyTable,
    pool: FoodPool,
    population: Vec<Being>,
    stats: SimulationStats,
    rng: R,
    tick: u64,
    next_id: u64,
    /// Species that started with members; only these can go extinct.
    seeded: PerSpecies<bool>,
    termination: Termination,
}

impl Simulation<ChaCha8Rng> {
    pub fn with_seed(config: Config, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulation<R> {
    /// Validates `config`, then seeds the population and the resource pool
    /// from `rng`. Every later random draw also comes from `rng`.
    pub fn new(config: Config, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let policies = PolicyTable::from_config(&config);

        let mut pool = FoodPool::new(config.resources.expiration_age);
        pool.generate(config.resources.generation_rate);

        let metabolism = &config.metabolism;
        let mut population = Vec::with_capacity(
            config.species.a.initial_count + config.species.b.initial_count,
        );
        let mut next_id = 0;
        for species in Species::ALL {
            let policy = policies.get(species);
            for _ in 0..config.species[species].initial_count {
                let genetics = Genetics::new_random(
                    &mut rng,
                    metabolism.initial_efficiency_min,
                    metabolism.initial_efficiency_max,
                    policy.efficiency_scale,
                );
                population.push(Being::new(
                    next_id,
                    species,
                    genetics,
                    policy,
                    metabolism.starting_balance,
                ));
                next_id += 1;
            }
        }

        let seeded = config.species.map(|_, sc| sc.initial_count > 0);
        info!(
            "Simulation created: A={} B={} food={:.1} policy={:?}",
            config.species.a.initial_count,
            config.species.b.initial_count,
            pool.total_available(),
            metabolism.forage_policy
        );

        Ok(Simulation {
            config,
            policies,
            pool,
            population,
            stats: SimulationStats::new(),
            rng,
            tick: 0,
            next_id,
            seeded,
            termination: Termination::Ongoing,
        })
    }

    /// Runs one full tick and reports whether a terminal condition holds
    /// afterwards. Stepping past a terminal condition is allowed.
    pub fn step(&mut self) -> Termination {
        let mut events = TickEvents::default();

        self.pool.generate(self.config.resources.generation_rate);
        self.pool.age_and_expire();

        self.forage_phase(&mut events);

        events.predation =
            PredationResolver::new(&self.policies).resolve(&mut self.population, &mut self.rng);

        self.survival_phase(&mut events);
        self.reproduction_phase(&mut events);

        let tick = self.tick;
        self.tick += 1;
        let record = self.stats.record(tick, &self.population, events);
        debug!(
            "tick {}: A={} B={} births={} deaths={} hunts={}",
            tick, record.count.a, record.count.b, events.births, events.deaths, events.predation.hunts
        );

        let termination = self.check_termination(tick);
        if termination.is_terminal() {
            info!("Simulation stopped: {termination}");
        }
        self.termination = termination.clone();
        termination
    }

    /// Steps until a terminal condition or the configured tick bound.
    pub fn run(&mut self) -> Termination {
        self.run_while(|_| true)
    }

    /// Like `run`, but also stops between ticks once `keep_going` returns
    /// false for the record just produced.
    pub fn run_while(&mut self, mut keep_going: impl FnMut(&TickRecord) -> bool) -> Termination {
        while self.tick < self.config.run.ticks {
            let termination = self.step();
            if termination.is_terminal() {
                return termination;
            }
            if let Some(record) = self.stats.last() {
                if !keep_going(record) {
                    break;
                }
            }
        }
        Termination::Ongoing
    }

    fn forage_phase(&mut self, events: &mut TickEvents) {
        let survival_cost = self.policies.survival_cost;
        let mut remaining = self.pool.total_available();
        events.food_available = remaining;

        self.population.shuffle(&mut self.rng);
        for being in &mut self.population {
            being.age_one_tick();
            if remaining <= 0.0 {
                break;
            }
            let policy = self.policies.get(being.species).forage;
            let gained = being.forage(remaining, policy, survival_cost);
            remaining -= gained;
            events.food_eaten += gained;
        }
    }

    fn survival_phase(&mut self, events: &mut TickEvents) {
        let survival_cost = self.policies.survival_cost;
        for being in &mut self.population {
            being.survive(survival_cost);
        }

        let before = self.population.len();
        let policies = &self.policies;
        self.population
            .retain(|b| !b.is_dead() && !b.is_expired(policies.get(b.species).max_age));
        events.deaths = before - self.population.len();
    }

    fn reproduction_phase(&mut self, events: &mut TickEvents) {
        let mutation_rate = self.config.metabolism.mutation_rate;
        let starting_balance = self.config.metabolism.starting_balance;

        let mut offspring = Vec::new();
        for being in &mut self.population {
            being.ready_for_reproduction();
            let threshold = self.policies.get(being.species).reproduction_threshold;
            if being.can_reproduce(threshold) {
                offspring.push(being.reproduce(
                    self.next_id,
                    &mut self.rng,
                    mutation_rate,
                    starting_balance,
                ));
                self.next_id += 1;
            }
        }

        events.births = offspring.len();
        self.population.extend(offspring);
    }

    fn check_termination(&self, tick: u64) -> Termination {
        let counts = Species::ALL.map(|s| (s, self.count(s)));

        let extinct: Vec<Species> = counts
            .iter()
            .filter(|(s, n)| self.seeded[*s] && *n == 0)
            .map(|(s, _)| *s)
            .collect();
        if !extinct.is_empty() {
            return Termination::Extinct {
                tick,
                species: extinct,
            };
        }

        let bound = self.config.run.explosion_bound;
        let exploded: Vec<Species> = counts
            .iter()
            .filter(|(_, n)| *n > bound)
            .map(|(s, _)| *s)
            .collect();
        if !exploded.is_empty() {
            return Termination::Exploded {
                tick,
                species: exploded,
            };
        }

        Termination::Ongoing
    }

    pub fn count(&self, species: Species) -> usize {
        self.population.iter().filter(|b| b.species == species).count()
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn population(&self) -> &[Being] {
        &self.population
    }

    pub fn pool(&self) -> &FoodPool {
        &self.pool
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Result of the most recent tick.
    pub fn termination(&self) -> &Termination {
        &self.termination
    }
}
