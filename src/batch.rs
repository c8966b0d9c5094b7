//! Ensemble runs: the same configuration under many seeds, in parallel.
//!
//! Each engine stays single-threaded; rayon only spreads whole runs over
//! the thread pool.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ConfigError;
use crate::simulation::{Simulation, Termination};
use crate::species::{PerSpecies, Species};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub ticks_completed: u64,
    pub termination: Termination,
    pub final_count: PerSpecies<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnsembleReport {
    pub runs: usize,
    /// Runs that hit the tick bound with both species alive and bounded.
    pub completed: usize,
    pub extinctions: PerSpecies<usize>,
    pub explosions: PerSpecies<usize>,
    pub mean_final_count: PerSpecies<f64>,
}

/// Runs one engine per seed. Fails up front if `config` is invalid.
pub fn run_ensemble(config: &Config, seeds: &[u64]) -> Result<Vec<RunSummary>, ConfigError> {
    config.validate()?;

    seeds
        .par_iter()
        .map(|&seed| -> Result<RunSummary, ConfigError> {
            let mut sim = Simulation::with_seed(config.clone(), seed)?;
            let termination = sim.run();
            Ok(RunSummary {
                seed,
                ticks_completed: sim.tick(),
                termination,
                final_count: PerSpecies::new(sim.count(Species::A), sim.count(Species::B)),
            })
        })
        .collect()
}

pub fn summarize(runs: &[RunSummary]) -> EnsembleReport {
    let mut report = EnsembleReport {
        runs: runs.len(),
        ..EnsembleReport::default()
    };

    for run in runs {
        match &run.termination {
            Termination::Ongoing => report.completed += 1,
            Termination::Extinct { species, .. } => {
                for &s in species {
                    report.extinctions[s] += 1;
                }
            }
            Termination::Exploded { species, .. } => {
                for &s in species {
                    report.explosions[s] += 1;
                }
            }
        }
        for (species, &n) in run.final_count.iter() {
            report.mean_final_count[species] += n as f64;
        }
    }

    if !runs.is_empty() {
        let n = runs.len() as f64;
        report.mean_final_count = report.mean_final_count.map(|_, total| total / n);
    }
    report
}
