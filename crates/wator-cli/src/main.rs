//! Headless command-line driver for the Wa-Tor simulation.

mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use wator_core::RunConfig;
use wator_world::{Simulation, UpdateResult};

/// What to print on stdout while the simulation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Only the final run summary, as JSON
    Summary,
    /// The grid after every tick
    Grid,
    /// Every change-log entry, one per line
    Deltas,
    /// One JSON object per tick with both snapshots and the change log
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "wator",
    version,
    about = "Run the Wa-Tor predator-prey simulation on a toroidal grid"
)]
struct Cli {
    /// JSON file holding a run configuration; flags override its fields
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of columns in the grid
    #[arg(long)]
    width: Option<usize>,

    /// Number of rows in the grid
    #[arg(long)]
    height: Option<usize>,

    /// Initial number of fish
    #[arg(long)]
    fish: Option<usize>,

    /// Initial number of sharks
    #[arg(long)]
    sharks: Option<usize>,

    /// Age interval at which fish spawn
    #[arg(long = "fish-spawn-period", value_name = "TICKS")]
    fish_spawn_period: Option<u32>,

    /// Age interval at which sharks spawn
    #[arg(long = "shark-spawn-period", value_name = "TICKS")]
    shark_spawn_period: Option<u32>,

    /// Ticks a shark can go without feeding before it dies
    #[arg(long = "starve-limit", visible_alias = "health", value_name = "TICKS")]
    starve_limit: Option<u32>,

    /// Number of ticks to simulate
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Random seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,

    /// What to print on stdout
    #[arg(short, long, value_enum, default_value_t = Output::Summary)]
    output: Output,

    /// Emit logs as JSON on stderr
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    /// Start from the config file (or defaults) and apply flag overrides
    fn run_config(&self) -> Result<RunConfig> {
        let mut run = match &self.config {
            Some(path) => load_config(path)?,
            None => RunConfig::default(),
        };

        if let Some(width) = self.width {
            run.world.width = width;
        }
        if let Some(height) = self.height {
            run.world.height = height;
        }
        if let Some(fish) = self.fish {
            run.world.fish_count = fish;
        }
        if let Some(sharks) = self.sharks {
            run.world.shark_count = sharks;
        }
        if let Some(period) = self.fish_spawn_period {
            run.simulation.fish_spawn_period = period;
        }
        if let Some(period) = self.shark_spawn_period {
            run.simulation.shark_spawn_period = period;
        }
        if let Some(limit) = self.starve_limit {
            run.simulation.shark_starve_limit = limit;
        }
        if let Some(ticks) = self.ticks {
            run.num_ticks = ticks;
        }
        if let Some(seed) = self.seed {
            run.seed = seed;
        }

        Ok(run)
    }
}

fn load_config(path: &Path) -> Result<RunConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

fn emit<W: Write>(out: &mut W, output: Output, width: usize, result: &UpdateResult) -> Result<()> {
    match output {
        Output::Summary => {}
        Output::Grid => {
            writeln!(out, "tick {}", result.tick)?;
            write!(out, "{}", result.current.render(width))?;
        }
        Output::Deltas => {
            for delta in &result.changes {
                writeln!(out, "tick {}: {}", result.tick, delta)?;
            }
        }
        Output::Json => {
            serde_json::to_writer(&mut *out, result)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    telemetry::init_telemetry(cli.log_json)?;

    let run = cli.run_config()?;
    info!(
        width = run.world.width,
        height = run.world.height,
        fish = run.world.fish_count,
        sharks = run.world.shark_count,
        ticks = run.num_ticks,
        seed = run.seed,
        "Starting Wa-Tor"
    );

    let mut simulation =
        Simulation::from_run_config(&run).context("failed to initialise the world")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.output == Output::Grid {
        writeln!(out, "tick {}", simulation.tick())?;
        simulation.debug_print(&mut out)?;
    }

    let width = run.world.width;
    let mut write_error = None;
    let summary = simulation.run_with(run.num_ticks, |result| {
        if write_error.is_none() {
            write_error = emit(&mut out, cli.output, width, result).err();
        }
    });
    if let Some(err) = write_error {
        return Err(err.context("failed to write simulation output"));
    }

    if cli.output == Output::Summary {
        serde_json::to_writer_pretty(&mut out, &summary)?;
        writeln!(out)?;
    }
    out.flush()?;

    Ok(())
}
