use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use log::{info, warn};
use rand::Rng;
use rivalry::batch::{run_ensemble, summarize};
use rivalry::{Config, Simulation, Species, Termination};

#[derive(Parser)]
#[command(name = "rivalry")]
#[command(version)]
#[command(about = "Predator/prey population dynamics over a shared, decaying resource pool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single simulation
    Run {
        /// Configuration file (YAML); defaults are used if it does not exist
        #[arg(short, long, default_value = "rivalry.yaml")]
        config: PathBuf,

        /// Override the tick bound
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory for statistics
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Quiet mode (no periodic progress)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run the same configuration under many seeds in parallel
    Batch {
        #[arg(short, long, default_value = "rivalry.yaml")]
        config: PathBuf,

        /// Number of runs
        #[arg(short, long, default_value = "16")]
        runs: u64,

        /// First seed; runs use consecutive seeds from here
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write the default configuration file
    Init {
        #[arg(short, long, default_value = "rivalry.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            ticks,
            seed,
            output,
            quiet,
        } => {
            let mut config = load_config(&config)?;
            init_logging(&config);
            if let Some(ticks) = ticks {
                config.run.ticks = ticks;
            }
            if seed.is_some() {
                config.run.seed = seed;
            }
            run_simulation(config, output, quiet)
        }

        Commands::Batch { config, runs, seed } => {
            let config = load_config(&config)?;
            init_logging(&config);
            run_batch(config, runs, seed)
        }

        Commands::Init { output } => {
            Config::default().save(&output)?;
            println!("Default configuration written to {:?}", output);
            Ok(())
        }
    }
}

fn init_logging(config: &Config) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.log_level.as_str()),
    )
    .init();
}

fn load_config(path: &Path) -> Result<Config, rivalry::ConfigError> {
    if path.exists() {
        println!("Loading config from: {:?}", path);
        Config::from_file(path)
    } else {
        println!("Using default configuration");
        Ok(Config::default())
    }
}

fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        let seed: u64 = rand::rng().random();
        info!("No seed configured, drew {seed}");
        seed
    })
}

fn run_simulation(
    config: Config,
    output: PathBuf,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&output)?;

    let seed = resolve_seed(config.run.seed);
    let stats_interval = config.logging.stats_interval.max(1);
    let ticks = config.run.ticks;
    let mut sim = Simulation::with_seed(config, seed)?;

    println!("Starting simulation");
    println!("  Seed: {}", seed);
    println!(
        "  Initial population: A={} B={}",
        sim.count(Species::A),
        sim.count(Species::B)
    );
    println!("  Ticks: {}", ticks);
    println!();

    let start = Instant::now();
    let termination = sim.run_while(|record| {
        if !quiet && record.tick % stats_interval == 0 {
            println!(
                "tick {:>5} | A: {:>5} (eff {:.3}) | B: {:>5} (eff {:.3})",
                record.tick,
                record.count.a,
                record.mean_efficiency.a,
                record.count.b,
                record.mean_efficiency.b
            );
        }
        true
    });
    let elapsed = start.elapsed();

    match &termination {
        Termination::Ongoing => println!("\nCompleted {} ticks", sim.tick()),
        terminal => warn!("{terminal}"),
    }

    let stats = sim.stats();
    println!();
    println!("=== Simulation Complete ===");
    println!("Outcome: {}", termination);
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Ticks: {}", sim.tick());
    println!("Final population: A={} B={}", sim.count(Species::A), sim.count(Species::B));
    println!("Max population: {}", stats.max_population);
    println!("Births: {}  Deaths: {}", stats.total_births, stats.total_deaths);
    println!("{}", stats.summary());

    let json_path = output.join("stats.json");
    stats.save_json(&json_path)?;
    let csv_path = output.join("stats.csv");
    stats.save_csv(&csv_path)?;
    println!("Stats history: {:?}, {:?}", json_path, csv_path);

    Ok(())
}

fn run_batch(config: Config, runs: u64, seed: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let first = resolve_seed(seed.or(config.run.seed));
    let seeds: Vec<u64> = (0..runs).map(|i| first.wrapping_add(i)).collect();

    println!(
        "Running {} simulations on {} threads (seeds {}..)",
        runs,
        rayon::current_num_threads(),
        first
    );

    let start = Instant::now();
    let results = run_ensemble(&config, &seeds)?;
    let report = summarize(&results);

    for run in &results {
        println!(
            "  seed {:>20} | ticks {:>5} | A {:>5} B {:>5} | {}",
            run.seed, run.ticks_completed, run.final_count.a, run.final_count.b, run.termination
        );
    }

    println!();
    println!("=== Ensemble Complete ({:.2}s) ===", start.elapsed().as_secs_f64());
    println!("Runs: {}  Completed: {}", report.runs, report.completed);
    println!(
        "Extinctions: A={} B={}  Explosions: A={} B={}",
        report.extinctions.a, report.extinctions.b, report.explosions.a, report.explosions.b
    );
    println!(
        "Mean final population: A={:.1} B={:.1}",
        report.mean_final_count.a, report.mean_final_count.b
    );

    Ok(())
}
