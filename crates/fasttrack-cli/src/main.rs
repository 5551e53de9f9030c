use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use fasttrack_core::Goal;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "fasttrack", version, about = "Fasting tracker CLI")]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a fast
    Start {
        /// Goal such as 16h, 90m, 16:30 or none (defaults to goal.default)
        #[arg(long)]
        goal: Option<Goal>,
        /// Use goal preset N (see `fasttrack presets`)
        #[arg(long, conflicts_with = "goal")]
        preset: Option<usize>,
        /// Start instant (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Stop the current fast
    Stop {
        /// End instant (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Show progress of the current fast
    Status {
        /// Evaluate at this instant (RFC 3339) instead of now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Live progress, refreshed every display.refresh_secs
    Watch {
        /// Exit once the goal is reached
        #[arg(long)]
        until_goal: bool,
    },
    /// Change the goal of the current fast
    Goal {
        /// New goal (16h, 90m, 16:30, none)
        #[arg(required_unless_present = "preset", conflicts_with = "preset")]
        goal: Option<Goal>,
        /// Use goal preset N (see `fasttrack presets`)
        #[arg(long)]
        preset: Option<usize>,
    },
    /// List the configured goal presets
    Presets,
    /// List past and current fasts
    History {
        /// Maximum number of fasts to show
        #[arg(long, short = 'n', value_parser = clap::value_parser!(u64).range(1..))]
        limit: Option<u64>,
    },
    /// Delete a fast by id or unique id prefix
    Delete {
        id: String,
    },
    /// Aggregate statistics
    Stats,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FASTTRACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.json;
    let result = match cli.command {
        Commands::Start { goal, preset, at } => commands::fast::start(goal, preset, at, json),
        Commands::Stop { at } => commands::fast::stop(at, json),
        Commands::Status { at } => commands::fast::status(at, json),
        Commands::Watch { until_goal } => commands::watch::run(until_goal, json),
        Commands::Goal { goal, preset } => commands::fast::set_goal(goal, preset, json),
        Commands::Presets => commands::fast::presets(json),
        Commands::History { limit } => {
            commands::history::list(limit.and_then(|n| usize::try_from(n).ok()), json)
        }
        Commands::Delete { id } => commands::history::delete(&id, json),
        Commands::Stats => commands::stats::run(json),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
