//! SimulationClock - drives discrete ticks over one world.

use crate::error::{Result, SimError};
use crate::history::{History, HistorySample};
use crate::movement::{MoveOutcome, MovementResolver};
use crate::params::SimulationParameters;
use crate::rules::{RuleSet, TransitionRule};
use crate::store::{Snapshot, StateStore};
use crate::world::{Population, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Run options that are not part of the persisted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockConfig {
    /// Ticks between transition-rule boundaries
    pub birth_death_interval: u64,

    /// Ticks between checkpoints (0 = never checkpoint)
    pub checkpoint_interval: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            birth_death_interval: 100,
            checkpoint_interval: 0,
        }
    }
}

impl ClockConfig {
    pub fn validate(&self) -> Result<()> {
        if self.birth_death_interval == 0 {
            return Err(SimError::config("birth_death_interval must be positive"));
        }
        Ok(())
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// Ticks completed after this one
    pub tick: u64,

    /// Agents that changed cell
    pub moved: usize,

    /// Agents with no empty neighbour
    pub blocked: usize,

    /// Whether a checkpoint was written
    pub checkpointed: bool,
}

/// Owns one simulation's world, randomness and history, and advances it tick
/// by tick.
pub struct SimulationClock {
    params: SimulationParameters,
    config: ClockConfig,
    world: World,
    rng: ChaCha8Rng,
    history: History,
    tick: u64,
    rules: RuleSet,
    resolver: MovementResolver,
    store: Option<Box<dyn StateStore>>,
    checkpoints_written: u64,
}

impl SimulationClock {
    /// Creates a simulation with a freshly sampled world.
    ///
    /// Parameters are validated before anything is allocated.
    pub fn new(params: SimulationParameters, config: ClockConfig, seed: u64) -> Result<Self> {
        params.validate()?;
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let world = World::populate(params.dim, params.p_dense, &mut rng);

        info!(
            dim = params.dim,
            p_dense = params.p_dense,
            seed,
            agents = world.agent_count(),
            "world initialized"
        );

        Ok(Self::assemble(params, config, world, rng, History::new(), 0))
    }

    /// Creates a simulation over an explicit world.
    pub fn with_world(
        params: SimulationParameters,
        config: ClockConfig,
        world: World,
        rng: ChaCha8Rng,
    ) -> Result<Self> {
        params.validate()?;
        config.validate()?;

        if world.dim() != params.dim {
            return Err(SimError::config(format!(
                "world is {}x{} but dim is {}",
                world.dim(),
                world.dim(),
                params.dim
            )));
        }
        world
            .check_consistency()
            .map_err(|e| SimError::config(format!("inconsistent world: {}", e)))?;

        Ok(Self::assemble(params, config, world, rng, History::new(), 0))
    }

    /// Rebuilds a simulation from a snapshot, continuing its tick count and
    /// history. `fallback_seed` seeds the random stream when the snapshot
    /// does not carry one.
    pub fn from_snapshot(snapshot: Snapshot, config: ClockConfig, fallback_seed: u64) -> Result<Self> {
        config.validate()?;

        let restored = snapshot.restore(fallback_seed)?;

        info!(
            dim = restored.params.dim,
            tick = restored.tick,
            agents = restored.world.agent_count(),
            history = restored.history.len(),
            "simulation resumed from snapshot"
        );

        Ok(Self::assemble(
            restored.params,
            config,
            restored.world,
            restored.rng,
            restored.history,
            restored.tick,
        ))
    }

    fn assemble(
        params: SimulationParameters,
        config: ClockConfig,
        world: World,
        rng: ChaCha8Rng,
        history: History,
        tick: u64,
    ) -> Self {
        Self {
            params,
            config,
            world,
            rng,
            history,
            tick,
            rules: RuleSet::new(),
            resolver: MovementResolver,
            store: None,
            checkpoints_written: 0,
        }
    }

    /// Attaches the store used for periodic checkpoints.
    pub fn with_store(mut self, store: impl StateStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Registers a transition rule.
    pub fn with_rule(mut self, rule: impl TransitionRule + 'static) -> Self {
        self.rules.register(rule);
        self
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn rng(&self) -> &ChaCha8Rng {
        &self.rng
    }

    /// Ticks completed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn population(&self) -> Population {
        self.world.population()
    }

    pub fn checkpoints_written(&self) -> u64 {
        self.checkpoints_written
    }

    /// Attached checkpoint store, if any.
    pub fn store(&self) -> Option<&dyn StateStore> {
        self.store.as_deref()
    }

    /// Advances the simulation by one tick.
    ///
    /// Movement cannot fail. Errors come from a transition rule breaking the
    /// world's invariants, or from a checkpoint write failing after the tick
    /// has fully completed.
    pub fn tick(&mut self) -> Result<TickSummary> {
        let t = self.tick;

        if t > 0 && t % self.config.birth_death_interval == 0 && !self.rules.is_empty() {
            debug!(tick = t, rules = self.rules.len(), "transition boundary");
            self.apply_rules()?;
        }

        let order = self.world.agents().shuffled_order(&mut self.rng);
        let mut moved = 0;
        let mut blocked = 0;

        for idx in order {
            match self.resolver.move_agent(&mut self.world, idx, &mut self.rng) {
                MoveOutcome::Moved { .. } => moved += 1,
                MoveOutcome::Blocked => blocked += 1,
            }
        }

        self.tick += 1;
        self.history.push(HistorySample::new(self.tick, self.world.population()));

        let checkpointed = self.checkpoint_due() && self.checkpoint()?;

        Ok(TickSummary {
            tick: self.tick,
            moved,
            blocked,
            checkpointed,
        })
    }

    /// Runs the registered rules and checks they kept the world sound.
    ///
    /// Counters restored from a snapshot may be offset from a grid scan; the
    /// rules must leave that offset unchanged rather than reconcile it.
    fn apply_rules(&mut self) -> Result<()> {
        let drift = self.world.counter_drift();
        self.rules.apply_all(&mut self.world, &self.params, &mut self.rng);

        self.world
            .check_structure()
            .map_err(|e| SimError::RuleViolation(format!("at tick {}: {}", self.tick, e)))?;

        let after = self.world.counter_drift();
        if after != drift {
            return Err(SimError::RuleViolation(format!(
                "at tick {}: counter offset changed from {:?} to {:?}",
                self.tick, drift, after
            )));
        }
        Ok(())
    }

    /// Runs `steps` ticks.
    pub fn run(&mut self, steps: u64) -> Result<()> {
        for _ in 0..steps {
            self.tick()?;
        }
        Ok(())
    }

    fn checkpoint_due(&self) -> bool {
        let interval = self.config.checkpoint_interval;
        interval > 0 && self.tick % interval == 0
    }

    /// Writes the full state to the attached store.
    ///
    /// Returns `Ok(false)` when no store is attached.
    pub fn checkpoint(&mut self) -> Result<bool> {
        if self.store.is_none() {
            return Ok(false);
        }

        let snapshot = self.snapshot();
        if let Some(store) = self.store.as_mut() {
            store.save(&snapshot)?;
        }

        self.checkpoints_written += 1;
        debug!(tick = self.tick, "checkpoint saved");
        Ok(true)
    }

    /// Captures the full state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.params, &self.world, &self.history, self.tick, &self.rng)
    }
}

impl std::fmt::Debug for SimulationClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationClock")
            .field("params", &self.params)
            .field("config", &self.config)
            .field("tick", &self.tick)
            .field("agents", &self.world.agent_count())
            .field("rules", &self.rules)
            .finish()
    }
}
