use rand::Rng;

use crate::genetics::Genetics;
use crate::species::{ForagePolicy, Species, SpeciesPolicy};

/// Consecutive insufficient-resource ticks that kill a being.
pub const STARVATION_TURNS: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Being {
    pub id: u64,
    pub species: Species,
    pub genetics: Genetics,
    pub resource_balance: f64,
    pub no_resource_turns: u32,
    pub reproduction_ready_turns: u32,
    pub time_since_last_reproduction: u32,
    /// Fixed at creation from the species policy.
    pub reproduction_cost: f64,
    pub age: u32,
}

impl Being {
    pub fn new(
        id: u64,
        species: Species,
        genetics: Genetics,
        policy: &SpeciesPolicy,
        starting_balance: f64,
    ) -> Self {
        Being {
            id,
            species,
            genetics,
            resource_balance: starting_balance,
            no_resource_turns: 0,
            reproduction_ready_turns: 0,
            time_since_last_reproduction: 0,
            reproduction_cost: policy.reproduction_cost,
            age: 0,
        }
    }

    pub fn efficiency(&self) -> f64 {
        self.genetics.efficiency
    }

    pub fn age_one_tick(&mut self) {
        self.age += 1;
    }

    /// Takes a share of `available` and returns it so the caller can shrink
    /// the tick's budget before the next being forages.
    pub fn forage(&mut self, available: f64, policy: ForagePolicy, minimum_cost: f64) -> f64 {
        let gained = policy.gain(self.efficiency(), available, minimum_cost);
        self.resource_balance += gained;
        gained
    }

    pub fn survive(&mut self, survival_cost: f64) {
        if self.resource_balance >= survival_cost {
            self.resource_balance -= survival_cost;
            self.no_resource_turns = 0;
        } else {
            self.no_resource_turns += 1;
        }
        self.time_since_last_reproduction += 1;
    }

    pub fn is_dead(&self) -> bool {
        self.no_resource_turns >= STARVATION_TURNS
    }

    pub fn is_expired(&self, max_age: Option<u32>) -> bool {
        max_age.is_some_and(|max| self.age > max)
    }

    /// Hungry, or overdue for reproduction.
    pub fn is_stressed(&self, survival_cost: f64, stress_threshold: u32) -> bool {
        self.resource_balance < survival_cost
            || self.time_since_last_reproduction > stress_threshold
    }

    pub fn ready_for_reproduction(&mut self) {
        if self.resource_balance >= self.reproduction_cost {
            self.reproduction_ready_turns += 1;
        } else {
            self.reproduction_ready_turns = 0;
        }
    }

    pub fn can_reproduce(&self, threshold: u32) -> bool {
        self.reproduction_ready_turns >= threshold
    }

    /// Pays the reproduction cost and returns a mutated offspring of the
    /// same species.
    pub fn reproduce(
        &mut self,
        child_id: u64,
        rng: &mut impl Rng,
        mutation_rate: f64,
        starting_balance: f64,
    ) -> Being {
        self.resource_balance -= self.reproduction_cost;
        self.reproduction_ready_turns = 0;
        self.time_since_last_reproduction = 0;

        Being {
            id: child_id,
            species: self.species,
            genetics: self.genetics.mutate(rng, mutation_rate),
            resource_balance: starting_balance,
            no_resource_turns: 0,
            reproduction_ready_turns: 0,
            time_since_last_reproduction: 0,
            reproduction_cost: self.reproduction_cost,
            age: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::genetics::MIN_EFFICIENCY;
    use crate::species::PolicyTable;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn being(species: Species, efficiency: f64, balance: f64) -> Being {
        let table = PolicyTable::from_config(&Config::default());
        Being::new(1, species, Genetics::new(efficiency), table.get(species), balance)
    }

    #[test]
    fn reproduction_cost_comes_from_species() {
        assert_eq!(being(Species::A, 0.5, 0.0).reproduction_cost, 21.0);
        assert_eq!(being(Species::B, 0.5, 0.0).reproduction_cost, 60.0);
    }

    #[test]
    fn forage_adds_gain_to_balance() {
        let mut b = being(Species::A, 0.5, 0.0);
        let gained = b.forage(100.0, ForagePolicy::Proportional, 10.0);
        assert_eq!(gained, 50.0);
        assert_eq!(b.resource_balance, 50.0);

        let gained = b.forage(4.0, ForagePolicy::Capped, 10.0);
        assert_eq!(gained, 4.0);
        assert_eq!(b.resource_balance, 54.0);
    }

    #[test]
    fn two_consecutive_hungry_ticks_kill() {
        let mut b = being(Species::A, 0.5, 5.0);
        b.survive(10.0);
        assert_eq!(b.no_resource_turns, 1);
        assert!(!b.is_dead());
        b.survive(10.0);
        assert!(b.is_dead());
    }

    #[test]
    fn a_fed_tick_resets_starvation() {
        let mut b = being(Species::A, 0.5, 5.0);
        b.survive(10.0);
        assert_eq!(b.no_resource_turns, 1);

        b.resource_balance = 12.0;
        b.survive(10.0);
        assert_eq!(b.no_resource_turns, 0);
        assert!(!b.is_dead());
        assert_eq!(b.resource_balance, 2.0);
        assert_eq!(b.time_since_last_reproduction, 2);
    }

    #[test]
    fn readiness_requires_consecutive_ticks() {
        let mut b = being(Species::A, 0.5, 30.0);
        b.ready_for_reproduction();
        b.ready_for_reproduction();
        assert!(!b.can_reproduce(3));

        b.resource_balance = 0.0;
        b.ready_for_reproduction();
        assert_eq!(b.reproduction_ready_turns, 0);

        b.resource_balance = 30.0;
        for _ in 0..3 {
            b.ready_for_reproduction();
        }
        assert!(b.can_reproduce(3));
    }

    #[test]
    fn reproduce_resets_parent_and_emits_sibling() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut parent = being(Species::B, 0.3, 100.0);
        parent.reproduction_ready_turns = 7;
        parent.time_since_last_reproduction = 9;
        parent.age = 4;

        let child = parent.reproduce(2, &mut rng, 0.1, 160.0);

        assert_eq!(parent.resource_balance, 40.0);
        assert_eq!(parent.reproduction_ready_turns, 0);
        assert_eq!(parent.time_since_last_reproduction, 0);
        assert_eq!(parent.age, 4);

        assert_eq!(child.id, 2);
        assert_eq!(child.species, Species::B);
        assert_eq!(child.age, 0);
        assert_eq!(child.resource_balance, 160.0);
        assert_eq!(child.reproduction_cost, 60.0);
        assert!(child.efficiency() >= MIN_EFFICIENCY);
        assert!((child.efficiency() - 0.3).abs() <= 0.1 + 1e-12);
    }

    #[test]
    fn stress_from_hunger_or_overdue_reproduction() {
        let mut b = being(Species::B, 0.3, 50.0);
        assert!(!b.is_stressed(10.0, 4));

        b.time_since_last_reproduction = 5;
        assert!(b.is_stressed(10.0, 4));

        b.time_since_last_reproduction = 0;
        b.resource_balance = 9.0;
        assert!(b.is_stressed(10.0, 4));
    }

    #[test]
    fn age_expiry_is_optional() {
        let mut b = being(Species::A, 0.5, 0.0);
        b.age = 9;
        assert!(b.is_expired(Some(8)));
        assert!(!b.is_expired(Some(9)));
        assert!(!b.is_expired(None));
    }
}
