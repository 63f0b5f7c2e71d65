#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Maze Explorer agent against simulated mazes.

mod source;

use std::{io, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use maze_explorer_core::MazeInfo;
use maze_explorer_rendering::TextRenderer;
use maze_explorer_simulation::{MazeLayout, SimulatedOracle};
use maze_explorer_system_navigator::{MazeOutcome, Navigator, NavigatorConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::source::MazeSize;

/// Explores mazes through a move oracle, banks their reward and leaves.
#[derive(Debug, Parser)]
#[command(name = "maze-explorer", version)]
#[command(group(
    clap::ArgGroup::new("source")
        .required(true)
        .args(["mazes", "generate"])
))]
struct Cli {
    /// TOML maze catalog to solve.
    #[arg(long, value_name = "FILE")]
    mazes: Option<PathBuf>,

    /// Only solve the catalog maze with this name.
    #[arg(long, value_name = "NAME", requires = "mazes")]
    maze: Option<String>,

    /// Generate mazes of the given size in rooms instead of loading a catalog.
    #[arg(long, value_name = "WxH")]
    generate: Option<MazeSize>,

    /// Seed of the first generated maze.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of mazes to generate.
    #[arg(long, default_value_t = 1, requires = "generate")]
    count: u32,

    /// Draw the agent's map after every step.
    #[arg(long)]
    render: bool,

    /// TOML file with navigator settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Attempts per oracle request, overriding the config file.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_oracle_attempts: Option<u32>,

    /// Moves allowed per maze, overriding the config file.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    move_budget: Option<u32>,
}

impl Cli {
    fn navigator_config(&self) -> Result<NavigatorConfig> {
        let mut config = match &self.config {
            Some(path) => NavigatorConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => NavigatorConfig::default(),
        };
        if let Some(attempts) = self.max_oracle_attempts {
            config.max_oracle_attempts = attempts;
        }
        if let Some(budget) = self.move_budget {
            config.move_budget = budget;
        }
        Ok(config)
    }

    fn layouts(&self) -> Result<Vec<MazeLayout>> {
        match (&self.mazes, self.generate) {
            (Some(path), _) => source::from_catalog(path, self.maze.as_deref()),
            (None, Some(size)) => Ok(source::generated(size, self.seed, self.count)),
            (None, None) => bail!("either --mazes or --generate is required"),
        }
    }
}

/// Entry point for the Maze Explorer command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.navigator_config()?;
    let layouts = cli.layouts()?;
    let infos: Vec<MazeInfo> = layouts.iter().map(MazeLayout::info).collect();

    let mut navigator = Navigator::with_config(SimulatedOracle::new(layouts), config);
    if cli.render {
        navigator = navigator.with_observer(TextRenderer::new(io::stdout()));
    }
    info!(
        mazes = infos.len(),
        max_oracle_attempts = navigator.config().max_oracle_attempts,
        move_budget = navigator.config().move_budget,
        "starting run"
    );

    let mut failed = 0;
    let mut banked = 0u64;
    for info in &infos {
        match navigator.run(info) {
            Ok(outcome) => {
                banked += u64::from(outcome.score_in_bag);
                println!("{}", summary(info, &outcome));
            }
            Err(error) => {
                failed += 1;
                error!(maze = %info.name, error = %error, "maze attempt failed");
                println!("{:<28} failed: {error}", info.name);
            }
        }
    }

    println!(
        "{} of {} mazes solved, {banked} reward banked",
        infos.len() - failed,
        infos.len()
    );
    if failed > 0 {
        bail!("{failed} maze attempt(s) failed");
    }
    Ok(())
}

fn summary(info: &MazeInfo, outcome: &MazeOutcome) -> String {
    let mut line = format!(
        "{:<28} moves {:>6}  collects {:>3}  reward {}/{}",
        outcome.maze, outcome.moves, outcome.collections, outcome.score_in_bag, info.potential_reward,
    );
    if outcome.portals > 0 {
        line.push_str(&format!("  portals {}", outcome.portals));
    }
    if outcome.map_invalidated {
        line.push_str("  (map invalidated)");
    }
    line
}
