//! World - grid, agent registry and population counters as one aggregate.
//!
//! Every mutation goes through `World`, which keeps the three parts in
//! lockstep: each registered agent sits on a distinct cell whose label is
//! the agent's category, and the counters equal a scan of the grid.

use crate::error::{Result, SimError};
use crate::grid::{Grid, Label};
use crate::registry::{AgentRegistry, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Stasis value given to freshly placed humans.
pub const INITIAL_STASIS: f64 = 1.0;

/// Per-category agent counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    pub humans: u64,
    pub machines: u64,
    pub ai: u64,
}

impl Population {
    /// Counts agents by scanning a grid.
    pub fn scan(grid: &Grid) -> Self {
        let mut population = Self::default();
        for (_, _, label) in grid.occupied() {
            population.increment(label);
        }
        population
    }

    /// Count for one category (`Empty` is always zero).
    pub fn get(&self, label: Label) -> u64 {
        match label {
            Label::Empty => 0,
            Label::Human => self.humans,
            Label::Machine => self.machines,
            Label::Ai => self.ai,
        }
    }

    /// Total agents across all categories.
    pub fn total(&self) -> u64 {
        self.humans + self.machines + self.ai
    }

    fn slot(&mut self, label: Label) -> Option<&mut u64> {
        match label {
            Label::Empty => None,
            Label::Human => Some(&mut self.humans),
            Label::Machine => Some(&mut self.machines),
            Label::Ai => Some(&mut self.ai),
        }
    }

    fn increment(&mut self, label: Label) {
        if let Some(count) = self.slot(label) {
            *count += 1;
        }
    }

    fn decrement(&mut self, label: Label) {
        if let Some(count) = self.slot(label) {
            *count = count.saturating_sub(1);
        }
    }
}

/// Grid, registry and counters owned together by one simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    grid: Grid,
    agents: AgentRegistry,
    population: Population,
}

impl World {
    /// Creates an empty world.
    pub fn empty(dim: usize) -> Self {
        Self {
            grid: Grid::new(dim),
            agents: AgentRegistry::new(),
            population: Population::default(),
        }
    }

    /// Samples a fresh world: each cell, scanned row-major, holds a human
    /// with probability `p_dense`.
    pub fn populate<R: Rng + ?Sized>(dim: usize, p_dense: f64, rng: &mut R) -> Self {
        let mut world = Self::empty(dim);

        for row in 0..dim {
            for col in 0..dim {
                if rng.gen::<f64>() < p_dense {
                    world.place(row, col, Label::Human, INITIAL_STASIS);
                }
            }
        }

        world
    }

    /// Reassembles a world from persisted parts without rescanning counters.
    pub(crate) fn from_parts(grid: Grid, agents: AgentRegistry, population: Population) -> Self {
        Self {
            grid,
            agents,
            population,
        }
    }

    /// Side length of the grid.
    pub fn dim(&self) -> usize {
        self.grid.dim()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    /// Current population counters.
    pub fn population(&self) -> Population {
        self.population
    }

    /// Number of registered agents.
    pub fn agent_count(&self) -> usize {
        self.agents.count()
    }

    /// Category of agent `idx`, read from the grid.
    pub fn agent_label(&self, idx: usize) -> Label {
        let (row, col) = self.agents.position(idx);
        self.grid.occupancy(row, col)
    }

    /// Split borrow used by the movement resolver.
    pub(crate) fn parts_mut(&mut self) -> (&mut Grid, &mut AgentRegistry) {
        (&mut self.grid, &mut self.agents)
    }

    fn place(&mut self, row: usize, col: usize, label: Label, stasis: f64) -> usize {
        self.grid.set(row, col, label, stasis);
        self.population.increment(label);
        self.agents.push((row, col))
    }

    /// Adds an agent on an empty cell and returns its registry index.
    pub fn spawn(&mut self, row: usize, col: usize, label: Label, stasis: f64) -> Result<usize> {
        let dim = self.dim();
        if row >= dim || col >= dim {
            return Err(SimError::config(format!(
                "cell ({}, {}) outside {}x{} grid",
                row, col, dim, dim
            )));
        }
        if !label.is_agent() {
            return Err(SimError::config("cannot spawn an empty agent"));
        }
        if !self.grid.is_empty(row, col) {
            return Err(SimError::config(format!("cell ({}, {}) already occupied", row, col)));
        }
        if !stasis.is_finite() {
            return Err(SimError::config(format!("stasis must be finite, got {}", stasis)));
        }

        Ok(self.place(row, col, label, stasis))
    }

    /// Removes agent `idx`, vacating its cell.
    ///
    /// The last agent in the registry moves into index `idx`.
    pub fn despawn(&mut self, idx: usize) -> Position {
        let (row, col) = self.agents.swap_remove(idx);
        self.population.decrement(self.grid.occupancy(row, col));
        self.grid.clear(row, col);
        (row, col)
    }

    /// Changes the category of agent `idx` in place, keeping its stasis value.
    pub fn convert(&mut self, idx: usize, label: Label) -> Result<()> {
        if !label.is_agent() {
            return Err(SimError::config("use despawn to remove an agent"));
        }

        let (row, col) = self.agents.position(idx);
        let old = self.grid.occupancy(row, col);
        let stasis = self.grid.stasis(row, col);

        self.grid.set(row, col, label, stasis);
        self.population.decrement(old);
        self.population.increment(label);
        Ok(())
    }

    /// Verifies occupancy exclusivity, label agreement and counter accuracy.
    pub fn check_consistency(&self) -> Result<()> {
        self.check_structure()?;

        let scanned = Population::scan(&self.grid);
        if scanned != self.population {
            return Err(SimError::corrupt(format!(
                "counters {:?} disagree with grid {:?}",
                self.population, scanned
            )));
        }

        Ok(())
    }

    /// Verifies the grid/registry pairing, ignoring the counters: agents are
    /// in range, on distinct occupied cells, every occupied cell belongs to
    /// an agent, and vacant cells carry zero stasis.
    pub fn check_structure(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.agents.count());

        for (idx, &(row, col)) in self.agents.positions().iter().enumerate() {
            if row >= self.dim() || col >= self.dim() {
                return Err(SimError::corrupt(format!(
                    "agent {} at ({}, {}) lies outside the grid",
                    idx, row, col
                )));
            }
            if !seen.insert((row, col)) {
                return Err(SimError::corrupt(format!(
                    "agent {} shares cell ({}, {}) with another agent",
                    idx, row, col
                )));
            }
            if !self.grid.occupancy(row, col).is_agent() {
                return Err(SimError::corrupt(format!(
                    "agent {} at ({}, {}) sits on an empty cell",
                    idx, row, col
                )));
            }
        }

        let occupied = self.grid.occupied().count();
        if occupied != seen.len() {
            return Err(SimError::corrupt(format!(
                "{} occupied cells but {} registered agents",
                occupied,
                seen.len()
            )));
        }

        let dim = self.dim();
        let stray = self
            .grid
            .labels()
            .iter()
            .zip(self.grid.stasis_field())
            .position(|(label, &stasis)| !label.is_agent() && stasis != 0.0);
        if let Some(idx) = stray {
            return Err(SimError::corrupt(format!(
                "vacant cell ({}, {}) carries stasis {}",
                idx / dim,
                idx % dim,
                self.grid.stasis_field()[idx]
            )));
        }

        Ok(())
    }

    /// Difference between the counters and a grid scan, per category.
    ///
    /// Zero for a world built through `World`'s own methods. A snapshot may
    /// carry a nonzero offset, which mutations must then leave unchanged.
    pub fn counter_drift(&self) -> [i128; 3] {
        let scanned = Population::scan(&self.grid);
        Label::AGENTS.map(|label| {
            i128::from(self.population.get(label)) - i128::from(scanned.get(label))
        })
    }
}
