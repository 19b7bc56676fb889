//! Hoffman simulation CLI
//!
//! Run the toroidal grid population simulation, optionally checkpointing and
//! resuming, and export the population history for charting.

use clap::Parser;
use hoffman_core::SimulationParameters;
use hoffman_sim::{HistoryExport, RunOutcome, SimulationRunner};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Hoffman grid population simulation
#[derive(Parser, Debug)]
#[command(name = "hoffman-sim")]
#[command(about = "Run the Hoffman toroidal grid population simulation", long_about = None)]
struct Args {
    /// Dimension of the simulation grid
    #[arg(long, default_value = "50")]
    dim: usize,

    /// Number of time steps to run
    #[arg(long, default_value = "1000")]
    steps: u64,

    /// Initial density of humans
    #[arg(long, default_value = "0.02")]
    density: f64,

    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Ticks between transition-rule boundaries
    #[arg(long, default_value = "100")]
    birth_death_interval: u64,

    /// Ticks between checkpoints (0 = only at the end)
    #[arg(long, default_value = "0")]
    checkpoint_interval: u64,

    /// Snapshot file written at checkpoints
    #[arg(long)]
    checkpoint: Option<String>,

    /// Resume from a snapshot file instead of sampling a new world
    #[arg(long)]
    resume: Option<String>,

    /// Write the population history as JSON for charting
    #[arg(long)]
    chart: Option<String>,

    /// Ticks between progress lines (0 = silent)
    #[arg(long, default_value = "100")]
    progress_interval: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON summary for CI parsing
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging; with --json, stdout carries only the summary
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(args.verbose, args.json))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("Hoffman Simulator v0.1.0");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Determine seed
    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    } else {
        args.seed
    };

    let outcome = match build_runner(&args, seed).run() {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("✗ Simulation failed: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(chart_path) = &args.chart {
        let export = HistoryExport::from_simulation(&outcome.simulation, seed);
        if let Err(e) = export.write_to_file(chart_path) {
            error!("Failed to write chart data: {:?}", e);
            std::process::exit(1);
        }
        info!("Exported {} history samples to {}", export.len(), chart_path);
    }

    report(&outcome, args.json);
}

fn build_runner(args: &Args, seed: u64) -> SimulationRunner {
    let params = SimulationParameters::with_grid(args.dim, args.density);
    let mut runner = SimulationRunner::new(seed)
        .with_params(params)
        .with_steps(args.steps)
        .with_birth_death_interval(args.birth_death_interval)
        .with_checkpoint_interval(args.checkpoint_interval)
        .with_progress_interval(if args.json { 0 } else { args.progress_interval });

    if let Some(path) = &args.checkpoint {
        runner = runner.with_checkpoint(path);
    }
    if let Some(path) = &args.resume {
        runner = runner.with_resume(path);
    }
    runner
}

fn log_level(verbose: bool, json: bool) -> Level {
    match (json, verbose) {
        (true, _) => Level::WARN,
        (false, true) => Level::DEBUG,
        (false, false) => Level::INFO,
    }
}

fn report(outcome: &RunOutcome, json: bool) {
    let report = &outcome.report;

    if json {
        let summary = serde_json::json!({
            "seed": report.seed,
            "resumed": report.resumed,
            "ticks_run": report.ticks_run,
            "final_tick": report.final_tick,
            "agents": report.agent_count,
            "humans": report.population.humans,
            "machines": report.population.machines,
            "ai": report.population.ai,
            "checkpoints_written": report.checkpoints_written,
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to encode summary: {}", e),
        }
        return;
    }

    info!("");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!(
        "✅ {} ticks (now at tick {}) | Humans: {} | Machines: {} | AI: {}",
        report.ticks_run,
        report.final_tick,
        report.population.humans,
        report.population.machines,
        report.population.ai
    );
    if report.checkpoints_written > 0 {
        info!("{} checkpoint(s) written", report.checkpoints_written);
    }
}
