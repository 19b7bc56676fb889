//! Hoffman simulation harness
//!
//! Wraps [`hoffman_core`] with the pieces a command-line run needs:
//! - **Runner**: builds a fresh world or resumes one from a snapshot, drives
//!   the requested ticks, logs progress and writes checkpoints
//! - **Exporter**: dumps the population history as JSON for charting
//!
//! # Usage
//!
//! ```ignore
//! use hoffman_sim::SimulationRunner;
//! use hoffman_core::SimulationParameters;
//!
//! let outcome = SimulationRunner::new(42)
//!     .with_params(SimulationParameters::with_grid(50, 0.02))
//!     .with_steps(1000)
//!     .with_checkpoint("state.json")
//!     .with_checkpoint_interval(100)
//!     .run()?;
//! ```

mod exporter;
mod runner;

pub use exporter::{FinalCounts, HistoryExport};
pub use runner::{RunOutcome, RunReport, SimulationRunner};
