//! Predation phase: stressed hunters each pick a random prey, and the
//! prey's defense decides who, if anyone, leaves the population.

use log::trace;
use rand::Rng;

use crate::being::Being;
use crate::species::{Defense, PerSpecies, PolicyTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredationOutcome {
    /// Victim survives with nothing; its balance went to the predator.
    Escaped,
    /// Victim fought back and the predator dies.
    PredatorKilled,
    /// Predator took the victim's balance and the victim dies.
    VictimKilled,
}

/// Tallies of one predation phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PredationReport {
    pub hunts: usize,
    pub escapes: usize,
    pub counterattacks: usize,
    pub kills: usize,
}

/// Resolves one encounter. A victim without a defense is always taken.
pub fn attempt_escape_or_counterattack(
    victim: &mut Being,
    predator: &mut Being,
    defense: Option<Defense>,
    rng: &mut impl Rng,
) -> PredationOutcome {
    if let Some(defense) = defense {
        if rng.random::<f64>() < defense.escape_chance {
            transfer_balance(victim, predator);
            return PredationOutcome::Escaped;
        }
        let counterattack_chance = victim.efficiency() * defense.counterattack_factor;
        if rng.random::<f64>() < counterattack_chance {
            return PredationOutcome::PredatorKilled;
        }
    }
    transfer_balance(victim, predator);
    PredationOutcome::VictimKilled
}

fn transfer_balance(victim: &mut Being, predator: &mut Being) {
    predator.resource_balance += victim.resource_balance;
    victim.resource_balance = 0.0;
}

pub struct PredationResolver<'a> {
    policies: &'a PolicyTable,
}

impl<'a> PredationResolver<'a> {
    pub fn new(policies: &'a PolicyTable) -> Self {
        PredationResolver { policies }
    }

    /// Beings that will hunt this phase, in population order.
    pub fn stressed_predators(&self, population: &[Being]) -> Vec<usize> {
        population
            .iter()
            .enumerate()
            .filter(|(_, b)| {
                let survival_cost = self.policies.survival_cost;
                self.policies
                    .get(b.species)
                    .hunting
                    .is_some_and(|h| b.is_stressed(survival_cost, h.stress_threshold))
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Runs the whole phase and removes the dead from `population`.
    ///
    /// Victims are resampled for every hunt, so one prey can be targeted by
    /// several predators in the same tick until it dies.
    pub fn resolve(&self, population: &mut Vec<Being>, rng: &mut impl Rng) -> PredationReport {
        let mut report = PredationReport::default();
        let predators = self.stressed_predators(population);
        if predators.is_empty() {
            return report;
        }

        let mut prey: PerSpecies<Vec<usize>> = PerSpecies::default();
        for (idx, being) in population.iter().enumerate() {
            prey[being.species].push(idx);
        }
        let mut removed = vec![false; population.len()];

        for predator_idx in predators {
            if removed[predator_idx] {
                continue;
            }
            let predator_species = population[predator_idx].species;
            let Some(hunting) = self.policies.get(predator_species).hunting else {
                continue;
            };
            let candidates = &mut prey[hunting.prey];
            if candidates.is_empty() {
                break;
            }

            let slot = rng.random_range(0..candidates.len());
            let victim_idx = candidates[slot];
            debug_assert_ne!(victim_idx, predator_idx, "a species cannot prey on itself");

            let defense = self.policies.get(hunting.prey).defense;
            let (victim, predator) = pair_mut(population, victim_idx, predator_idx);
            let outcome = attempt_escape_or_counterattack(victim, predator, defense, rng);
            trace!(
                "predator {} ({}) vs victim {} ({}): {:?}",
                predator.id,
                predator_species,
                victim.id,
                hunting.prey,
                outcome
            );

            report.hunts += 1;
            match outcome {
                PredationOutcome::Escaped => report.escapes += 1,
                PredationOutcome::PredatorKilled => {
                    report.counterattacks += 1;
                    removed[predator_idx] = true;
                    let hunters_as_prey = &mut prey[predator_species];
                    if let Some(pos) = hunters_as_prey.iter().position(|&i| i == predator_idx) {
                        hunters_as_prey.swap_remove(pos);
                    }
                }
                PredationOutcome::VictimKilled => {
                    report.kills += 1;
                    removed[victim_idx] = true;
                    prey[hunting.prey].swap_remove(slot);
                }
            }
        }

        let mut idx = 0;
        population.retain(|_| {
            let keep = !removed[idx];
            idx += 1;
            keep
        });

        report
    }
}

fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    if i < j {
        let (lo, hi) = items.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}
