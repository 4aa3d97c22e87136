//! # Warren Main Entry Point
//!
//! Parses the command line, sets up logging and runs the main menu on
//! stdin/stdout until `exit`.

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use tokio::io::BufReader;
use warren::config::DEFAULT_AUTOSAVE_PATH;
use warren::{InputHandler, SceneManager, SessionConfig, WarrenResult};

/// Command line arguments for Warren.
#[derive(Parser, Debug)]
#[command(name = "warren")]
#[command(about = "A room-graph adventure with autosave, item swaps and racing pathfinders")]
#[command(version)]
struct Args {
    /// Autosave destination
    #[arg(short = 'b', long = "backup", env = "GAME_AUTOSAVE", default_value = DEFAULT_AUTOSAVE_PATH)]
    backup: PathBuf,

    /// Random seed for maps, item placement, swaps and pathfinding
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> WarrenResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);

    info!("Starting Warren v{}", warren::VERSION);

    let config = SessionConfig::new(&args.backup).with_seed(args.seed);
    let mut input = InputHandler::new(BufReader::new(tokio::io::stdin()));
    let mut stdout = std::io::stdout().lock();

    let result = SceneManager::new(config).run(&mut input, &mut stdout).await;
    if let Err(e) = &result {
        error!("Fatal: {}", e);
    }
    result
}

/// Initializes `env_logger`; `RUST_LOG` takes precedence over `--log-level`.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_target(false)
        .init();
}
