//! Brute search over built-in deterministic environments.
//!
//! Runs rounds of parallel rollouts until the timestep budget is spent,
//! recording each new best trajectory as MessagePack. Recordings can be
//! inspected afterwards.

use anyhow::{Context, Result};
use brute_core::{Environment, Frameskip, TimeLimit};
use brute_search::{
    config::{DEFAULT_MAX_EPISODE_STEPS, DEFAULT_OUTPUT, DEFAULT_TIMESTEP_LIMIT, EXPLORATION_PARAM},
    envs::{EarlyExit, Runner},
    Brute, BruteConfig, Driver, DriverConfig, Outcome, TrajectoryRecorder,
};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};
use std::path::PathBuf;
use std::time::Instant;

/// Brute: tree search that exploits environment determinism.
#[derive(Parser)]
#[command(name = "brute")]
#[command(about = "Search deterministic environments for high-reward action sequences")]
struct Cli {
    /// Log per-round statistics.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search an environment until the timestep budget is exhausted.
    Search {
        /// Environment to search.
        #[arg(short, long, value_enum, default_value_t = Game::Runner)]
        game: Game,

        /// Initial state: seeds the level layout.
        #[arg(long, default_value = "0")]
        state: u64,

        /// Level length in columns (runner only).
        #[arg(long, default_value = "256")]
        length: usize,

        /// Maximum steps per episode.
        #[arg(long, default_value_t = DEFAULT_MAX_EPISODE_STEPS)]
        max_episode_steps: usize,

        /// Total simulated-timestep budget.
        #[arg(long, default_value_t = DEFAULT_TIMESTEP_LIMIT)]
        timestep_limit: u64,

        /// Number of underlying steps per chosen action.
        #[arg(long, default_value = "4")]
        frameskip: usize,

        /// Parallel rollouts per round (default: available parallelism).
        #[arg(short, long)]
        workers: Option<usize>,

        /// Random seed for reproducibility.
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Exploration constant.
        #[arg(long, default_value_t = EXPLORATION_PARAM)]
        exploration: f64,

        /// Where to record each new best trajectory.
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },

    /// Print a recorded trajectory.
    Inspect {
        /// Recording to read.
        path: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Game {
    /// Side-scrolling runner over a seeded track.
    Runner,
    /// Two-action toy with an early exit worth more than steady play.
    EarlyExit,
}

impl Game {
    fn name(self) -> &'static str {
        match self {
            Game::Runner => "runner",
            Game::EarlyExit => "early-exit",
        }
    }
}

/// Initialize terminal logging.
fn logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .context("Failed to initialize logger")
}

/// Settings shared by every environment.
struct SearchArgs {
    game: Game,
    state: u64,
    max_episode_steps: usize,
    timestep_limit: u64,
    frameskip: usize,
    config: BruteConfig,
    output: PathBuf,
}

/// Wrap environments from `make` in the standard decorators and drive the search.
fn search<E, M>(make: M, args: SearchArgs) -> Result<Outcome>
where
    E: Environment,
    M: Fn() -> E + Sync,
{
    let frameskip = args.frameskip;
    let max_episode_steps = args.max_episode_steps;
    let factory = move || -> brute_core::Result<TimeLimit<Frameskip<E>>> {
        Ok(TimeLimit::new(Frameskip::new(make(), frameskip), max_episode_steps))
    };

    let brute = Brute::new(factory, args.config).context("Failed to create search")?;
    info!(
        "Searching {} (state {}) with {} workers over {} actions",
        args.game.name(),
        args.state,
        brute.workers(),
        brute.action_space().n()
    );

    let recorder = TrajectoryRecorder::new()
        .with_metadata("game", serde_json::json!(args.game.name()))
        .with_metadata("state", serde_json::json!(args.state))
        .with_metadata("frameskip", serde_json::json!(frameskip));
    let driver_config = DriverConfig {
        timestep_limit: args.timestep_limit,
        output: args.output,
    };

    let mut driver = Driver::new(brute, recorder, driver_config);
    driver.run().context("Search failed")
}

/// Run the search command.
#[allow(clippy::too_many_arguments)]
fn cmd_search(
    game: Game,
    state: u64,
    length: usize,
    max_episode_steps: usize,
    timestep_limit: u64,
    frameskip: usize,
    workers: Option<usize>,
    seed: u64,
    exploration: f64,
    output: PathBuf,
) -> Result<()> {
    let mut config = BruteConfig::with_episode_steps(max_episode_steps)
        .seed(seed)
        .exploration(exploration);
    config.workers = workers;

    let args = SearchArgs {
        game,
        state,
        max_episode_steps,
        timestep_limit,
        frameskip,
        config,
        output: output.clone(),
    };

    let start = Instant::now();
    let outcome = match game {
        Game::Runner => search(move || Runner::new(state, length), args)?,
        Game::EarlyExit => search(EarlyExit::new, args)?,
    };
    let elapsed = start.elapsed();

    info!("Completed in {:.2}s", elapsed.as_secs_f64());
    info!("Rounds: {}", outcome.rounds);
    info!("Timesteps: {}", outcome.timesteps);
    info!("Tree nodes: {}", outcome.nodes);
    info!(
        "Best reward: {} over {} actions",
        outcome.best_reward,
        outcome.best_actions.len()
    );
    if outcome.failed_recordings > 0 {
        info!("Recordings that failed: {}", outcome.failed_recordings);
    }
    info!("Best trajectory saved to: {:?}", output);

    Ok(())
}

/// Run the inspect command.
fn cmd_inspect(path: PathBuf) -> Result<()> {
    let record = TrajectoryRecorder::load(&path)
        .with_context(|| format!("Failed to read recording: {:?}", path))?;

    println!("Recording: {:?}", path);
    let mut keys: Vec<_> = record.metadata.keys().collect();
    keys.sort();
    for key in keys {
        println!("  {}: {}", key, record.metadata[key]);
    }
    println!("Steps:  {}", record.steps.len());
    println!("Reward: {}", record.reward);

    let actions: Vec<String> = record.steps.iter().map(|s| s.action.to_string()).collect();
    println!("Actions: {}", actions.join(" "));

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging(cli.verbose)?;

    match cli.command {
        Commands::Search {
            game,
            state,
            length,
            max_episode_steps,
            timestep_limit,
            frameskip,
            workers,
            seed,
            exploration,
            output,
        } => cmd_search(
            game,
            state,
            length,
            max_episode_steps,
            timestep_limit,
            frameskip,
            workers,
            seed,
            exploration,
            output,
        ),

        Commands::Inspect { path } => cmd_inspect(path),
    }
}
