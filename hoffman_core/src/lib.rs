//! Hoffman grid population simulation core.
//!
//! Agents live on the cells of a `dim × dim` toroidal lattice. Every tick the
//! agents are visited in a freshly shuffled order and each one steps into a
//! randomly chosen empty von Neumann neighbour, if any. Population counters
//! and a per-tick history are maintained alongside, and the whole state can
//! be checkpointed and resumed bit-for-bit.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                    SimulationClock                    │
//! │   ChaCha8Rng ── RuleSet ── History ── StateStore      │
//! │        │                                              │
//! │  ┌─────▼──────────────────────────────────────────┐   │
//! │  │ World                                          │   │
//! │  │   Grid (labels + stasis) ◄─► AgentRegistry     │   │
//! │  │   Population counters                          │   │
//! │  └────────────────────────────────────────────────┘   │
//! │        ▲                                              │
//! │  MovementResolver (one step per agent per tick)       │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use hoffman_core::{ClockConfig, SimulationClock, SimulationParameters};
//!
//! let params = SimulationParameters::with_grid(50, 0.02);
//! let mut sim = SimulationClock::new(params, ClockConfig::default(), 42)?;
//! sim.run(1000)?;
//! println!("{} humans", sim.population().humans);
//! ```

mod clock;
mod error;
mod grid;
mod history;
mod movement;
mod params;
mod registry;
mod rules;
mod store;
mod world;

pub use clock::{ClockConfig, SimulationClock, TickSummary};
pub use error::{Result, SimError};
pub use grid::{Grid, Label};
pub use history::{History, HistoryColumns, HistorySample};
pub use movement::{Direction, MoveOutcome, MovementResolver};
pub use params::SimulationParameters;
pub use registry::{AgentRegistry, Position};
pub use rules::{RuleSet, TransitionRule};
pub use store::{decode, encode, JsonFileStore, MemoryStore, RestoredState, RngState, Snapshot, StateStore};
pub use world::{Population, World, INITIAL_STASIS};
