//! Per-tick statistics, handed to whatever plots or reports them.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::being::Being;
use crate::error::ExportError;
use crate::predation::PredationReport;
use crate::species::{PerSpecies, Species};

/// Snapshot taken at the end of one completed tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick: u64,
    pub count: PerSpecies<usize>,
    /// 0 for a species with no living members.
    pub mean_efficiency: PerSpecies<f64>,
    pub births: usize,
    pub deaths: usize,
    pub escapes: usize,
    pub counterattacks: usize,
    pub kills: usize,
    /// Pool total at the start of foraging.
    pub food_available: f64,
}

/// What happened inside a tick besides the final population.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickEvents {
    pub births: usize,
    pub deaths: usize,
    pub predation: PredationReport,
    pub food_available: f64,
    pub food_eaten: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationStats {
    pub total_births: usize,
    pub total_deaths: usize,
    pub max_population: usize,
    pub food_eaten: f64,
    records: Vec<TickRecord>,
}

impl SimulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples the population after a tick and appends one record.
    pub fn record(&mut self, tick: u64, population: &[Being], events: TickEvents) -> &TickRecord {
        let mut count = PerSpecies::new(0usize, 0usize);
        let mut efficiency_sum = PerSpecies::new(0.0f64, 0.0f64);
        for being in population {
            count[being.species] += 1;
            efficiency_sum[being.species] += being.efficiency();
        }
        let mean_efficiency = count.map(|species, &n| {
            if n == 0 {
                0.0
            } else {
                efficiency_sum[species] / n as f64
            }
        });

        self.total_births += events.births;
        self.total_deaths += events.deaths;
        self.max_population = self.max_population.max(population.len());
        self.food_eaten += events.food_eaten;

        self.records.push(TickRecord {
            tick,
            count,
            mean_efficiency,
            births: events.births,
            deaths: events.deaths,
            escapes: events.predation.escapes,
            counterattacks: events.predation.counterattacks,
            kills: events.predation.kills,
            food_available: events.food_available,
        });
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[TickRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&TickRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Population history of one species, oldest first.
    pub fn history(&self, species: Species) -> Vec<usize> {
        self.records.iter().map(|r| r.count[species]).collect()
    }

    pub fn summary(&self) -> String {
        match self.last() {
            Some(r) => format!(
                "tick {:>5} | A: {:>5} (eff {:.3}) | B: {:>5} (eff {:.3}) | births {} deaths {} kills {}",
                r.tick,
                r.count.a,
                r.mean_efficiency.a,
                r.count.b,
                r.mean_efficiency.b,
                r.births,
                r.deaths,
                r.kills
            ),
            None => "no ticks recorded".to_string(),
        }
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let file = std::fs::File::create(path)?;
        let mut out = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, self)?;
        out.flush()?;
        Ok(())
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let file = std::fs::File::create(path)?;
        let mut out = std::io::BufWriter::new(file);
        writeln!(
            out,
            "tick,count_a,count_b,mean_efficiency_a,mean_efficiency_b,births,deaths,escapes,counterattacks,kills,food_available"
        )?;
        for r in &self.records {
            writeln!(
                out,
                "{},{},{},{:.6},{:.6},{},{},{},{},{},{:.3}",
                r.tick,
                r.count.a,
                r.count.b,
                r.mean_efficiency.a,
                r.mean_efficiency.b,
                r.births,
                r.deaths,
                r.escapes,
                r.counterattacks,
                r.kills,
                r.food_available
            )?;
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::genetics::Genetics;
    use crate::species::PolicyTable;

    fn population() -> Vec<Being> {
        let table = PolicyTable::from_config(&Config::default());
        vec![
            Being::new(1, Species::A, Genetics::new(0.2), table.get(Species::A), 0.0),
            Being::new(2, Species::A, Genetics::new(0.6), table.get(Species::A), 0.0),
        ]
    }

    #[test]
    fn empty_species_has_zero_mean() {
        let mut stats = SimulationStats::new();
        let record = stats.record(0, &population(), TickEvents::default()).clone();

        assert_eq!(record.count, PerSpecies::new(2, 0));
        assert!((record.mean_efficiency.a - 0.4).abs() < 1e-12);
        assert_eq!(record.mean_efficiency.b, 0.0);
    }

    #[test]
    fn totals_accumulate() {
        let mut stats = SimulationStats::new();
        let events = TickEvents {
            births: 3,
            deaths: 1,
            food_eaten: 12.5,
            ..TickEvents::default()
        };
        stats.record(0, &population(), events);
        stats.record(1, &[], events);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats.total_births, 6);
        assert_eq!(stats.total_deaths, 2);
        assert_eq!(stats.max_population, 2);
        assert_eq!(stats.food_eaten, 25.0);
        assert_eq!(stats.history(Species::A), vec![2, 0]);
    }

    #[test]
    fn exports_csv_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut stats = SimulationStats::new();
        stats.record(0, &population(), TickEvents::default());

        let csv = dir.path().join("stats.csv");
        stats.save_csv(&csv).unwrap();
        let text = std::fs::read_to_string(&csv).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).unwrap().starts_with("0,2,0,"));

        let json = dir.path().join("stats.json");
        stats.save_json(&json).unwrap();
        let loaded: SimulationStats =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.records()[0].count, stats.records()[0].count);
    }
}
