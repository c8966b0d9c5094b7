//! Two-species population dynamics: a forager and a predator competing for
//! a decaying, regenerating resource pool, with stochastic predation and
//! mutation-driven reproduction.

pub mod batch;
pub mod being;
pub mod config;
pub mod error;
pub mod food;
pub mod genetics;
pub mod predation;
pub mod simulation;
pub mod simulation_stats;
pub mod species;

pub use being::Being;
pub use config::Config;
pub use error::{ConfigError, ExportError};
pub use simulation::{Simulation, Termination};
pub use simulation_stats::{SimulationStats, TickRecord};
pub use species::{ForagePolicy, PerSpecies, Species};
