//! Simulation runner - creates or resumes a run and drives it to completion.

use hoffman_core::{
    ClockConfig, JsonFileStore, Population, Result, SimError, SimulationClock,
    SimulationParameters, StateStore,
};
use std::path::PathBuf;
use tracing::{debug, info};

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Seed used for a fresh world (or as fallback when resuming)
    pub seed: u64,

    /// Whether the run continued from a snapshot
    pub resumed: bool,

    /// Ticks executed by this invocation
    pub ticks_run: u64,

    /// Ticks completed overall, including any resumed ones
    pub final_tick: u64,

    /// Population at the end of the run
    pub population: Population,

    /// Registered agents at the end of the run
    pub agent_count: usize,

    /// Distinct snapshots written, including the final one
    pub checkpoints_written: u64,
}

/// A finished run together with the simulation it produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    pub simulation: SimulationClock,
}

/// Builds and runs one simulation.
#[derive(Debug, Clone)]
pub struct SimulationRunner {
    seed: u64,
    params: SimulationParameters,
    steps: u64,
    birth_death_interval: u64,
    checkpoint_path: Option<PathBuf>,
    checkpoint_interval: u64,
    resume_from: Option<PathBuf>,
    progress_interval: u64,
}

impl SimulationRunner {
    /// Creates a runner with default parameters.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            params: SimulationParameters::default(),
            steps: 1000,
            birth_death_interval: ClockConfig::default().birth_death_interval,
            checkpoint_path: None,
            checkpoint_interval: 0,
            resume_from: None,
            progress_interval: 100,
        }
    }

    /// Sets the parameters for a fresh world (ignored when resuming).
    pub fn with_params(mut self, params: SimulationParameters) -> Self {
        self.params = params;
        self
    }

    /// Sets the number of ticks to run.
    pub fn with_steps(mut self, steps: u64) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the transition-rule interval.
    pub fn with_birth_death_interval(mut self, ticks: u64) -> Self {
        self.birth_death_interval = ticks;
        self
    }

    /// Writes a snapshot to `path` at the end of the run.
    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_path = Some(path.into());
        self
    }

    /// Also writes a snapshot every `ticks` ticks (0 = only at the end).
    /// Requires a checkpoint path.
    pub fn with_checkpoint_interval(mut self, ticks: u64) -> Self {
        self.checkpoint_interval = ticks;
        self
    }

    /// Continues from a previously written snapshot.
    pub fn with_resume(mut self, path: impl Into<PathBuf>) -> Self {
        self.resume_from = Some(path.into());
        self
    }

    /// Sets how often progress is logged (0 disables progress lines).
    pub fn with_progress_interval(mut self, ticks: u64) -> Self {
        self.progress_interval = ticks;
        self
    }

    fn clock_config(&self) -> ClockConfig {
        ClockConfig {
            birth_death_interval: self.birth_death_interval,
            checkpoint_interval: self.checkpoint_interval,
        }
    }

    /// Creates (or restores) the simulation without running it.
    pub fn build(&self) -> Result<SimulationClock> {
        let config = self.clock_config();
        config.validate()?;

        let simulation = match &self.resume_from {
            Some(path) => {
                info!("Resuming from {}", path.display());
                let snapshot = JsonFileStore::new(path).load()?;
                SimulationClock::from_snapshot(snapshot, config, self.seed)?
            }
            None => SimulationClock::new(self.params.clone(), config, self.seed)?,
        };

        Ok(match &self.checkpoint_path {
            Some(path) => simulation.with_store(JsonFileStore::new(path)),
            None => simulation,
        })
    }

    /// Runs the configured number of ticks.
    pub fn run(&self) -> Result<RunOutcome> {
        if self.checkpoint_interval > 0 && self.checkpoint_path.is_none() {
            return Err(SimError::config("checkpoint interval set without a checkpoint path"));
        }

        let mut simulation = self.build()?;

        info!(
            "Starting simulation: {}x{} grid, {} agents, {} steps",
            simulation.params().dim,
            simulation.params().dim,
            simulation.world().agent_count(),
            self.steps
        );

        let mut last_checkpointed = false;
        for _ in 0..self.steps {
            let summary = simulation.tick()?;
            last_checkpointed = summary.checkpointed;

            if summary.checkpointed {
                info!("Checkpoint written at tick {}", summary.tick);
            }

            if self.progress_interval > 0 && summary.tick % self.progress_interval == 0 {
                if let Some(sample) = simulation.history().last() {
                    info!(
                        "Time: {}, Humans: {}, Machines: {}, AI: {}",
                        sample.tick, sample.humans, sample.machines, sample.ai
                    );
                }
            } else {
                debug!(
                    "tick {} | moved={} blocked={}",
                    summary.tick, summary.moved, summary.blocked
                );
            }
        }

        // The last tick may already have landed on an interval checkpoint
        if self.checkpoint_path.is_some() && !last_checkpointed {
            simulation.checkpoint()?;
        }

        info!("Simulation finished.");

        let report = RunReport {
            seed: self.seed,
            resumed: self.resume_from.is_some(),
            ticks_run: self.steps,
            final_tick: simulation.tick_count(),
            population: simulation.population(),
            agent_count: simulation.world().agent_count(),
            checkpoints_written: simulation.checkpoints_written(),
        };

        Ok(RunOutcome { report, simulation })
    }
}
