//! Goal Planner
//!
//! Runs the goal controller against an in-memory sandbox world loaded from a
//! scenario file, printing one line per tick and writing a JSONL event log.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crafting_planner::config::{default_config_toml, DEFAULT_CONFIG_PATH};
use crafting_planner::{BlueprintLibrary, EventLogger, GoalController, PlannerConfig, TickOutcome};
use crafting_world::{SandboxWorld, Scenario, World};

const DEFAULT_LOG_FILTER: &str = "info";

/// Command line arguments for the planner
#[derive(Parser, Debug)]
#[command(name = "goal_planner")]
#[command(about = "Plans and executes item and construction goals in a sandbox world")]
struct Args {
    /// Scenario JSON describing game data, inventory and surroundings
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Directory of blueprint JSON files
    #[arg(long)]
    blueprints: Option<PathBuf>,

    /// Item or blueprint name to pursue
    #[arg(long)]
    goal: Option<String>,

    /// Quantity for item goals
    #[arg(long, default_value_t = 1)]
    quantity: u32,

    /// Maximum number of ticks to run
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Planner configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Output path for the JSONL event log
    #[arg(long, default_value = "output/events.jsonl")]
    events: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.print_config {
        println!("{}", default_config_toml());
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` when set and valid, otherwise [`DEFAULT_LOG_FILTER`].
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Runs the session. Returns whether the goal was completed.
fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = if args.config.exists() {
        PlannerConfig::from_file(&args.config)?
    } else {
        PlannerConfig::default()
    };
    if let Some(seed) = args.seed {
        config.session.seed = seed;
    }

    let scenario = match &args.scenario {
        Some(path) => Scenario::from_file(path)?,
        None => Scenario::default(),
    };
    let data = scenario.game_data.clone();
    let mut world = SandboxWorld::from_scenario(scenario);

    let library = match &args.blueprints {
        Some(dir) => BlueprintLibrary::load_dir(dir)?,
        None => BlueprintLibrary::new(),
    };

    println!("Goal Planner");
    println!("============");
    println!("Seed: {}", config.session.seed);
    println!("Blueprints: {}", library.len());

    let Some(goal) = args.goal else {
        println!("No goal given, nothing to do.");
        return Ok(true);
    };
    println!("Goal: {} x{}", goal, args.quantity);
    println!();

    if let Some(parent) = args.events.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut logger = EventLogger::new(&args.events)?;
    info!(session = %logger.session_id(), path = %args.events.display(), "event log opened");

    let mut controller = GoalController::new(&config, library);
    controller.set_goal(&goal, args.quantity);

    let mut completed = false;
    for _ in 0..args.ticks {
        let outcome = controller.tick(&mut world, &data);
        logger.record(controller.ticks(), controller.drain_events())?;

        match outcome? {
            TickOutcome::Completed { goal } => {
                println!("[{:>4}] completed {}", controller.ticks(), goal);
                completed = true;
                break;
            }
            TickOutcome::Stuck { goal, item } => {
                println!("[{:>4}] stuck on {}: cannot obtain {}", controller.ticks(), goal, item);
                break;
            }
            TickOutcome::Idle => break,
            outcome => println!("[{:>4}] {:?}", controller.ticks(), outcome),
        }
    }
    logger.flush()?;

    println!();
    println!("Ticks run: {}", controller.ticks());
    println!("Events logged: {}", logger.event_count());
    println!("Inventory:");
    for (item, count) in world.inventory() {
        println!("  {}: {}", item, count);
    }
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_is_info() {
        let filter = EnvFilter::new(DEFAULT_LOG_FILTER);
        assert_eq!(filter.max_level_hint(), Some(tracing::Level::INFO.into()));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["goal_planner", "--goal", "hut", "--seed", "9"]);
        assert_eq!(args.goal.as_deref(), Some("hut"));
        assert_eq!(args.seed, Some(9));
        assert_eq!(args.ticks, 200);
    }
}
