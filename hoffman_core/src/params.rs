//! Simulation parameters.

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};

/// Constants governing a simulation run.
///
/// Only `dim` and `p_dense` are consumed by the built-in logic. The rates are
/// carried for transition rules and persisted with every snapshot so a resumed
/// run continues under identical parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Side length of the square toroidal grid
    pub dim: usize,

    /// Probability that a cell holds a human at world initialization
    pub p_dense: f64,

    /// Human birth rate
    pub k_birth: f64,

    /// Human death rate
    pub k_death: f64,

    /// AI death rate
    pub k_deathai: f64,

    /// Machine death rate
    pub k_deathmachine: f64,

    /// AI creation rate
    pub k_aicreate: f64,

    /// Machine creation rate
    pub k_compcreate: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            dim: 50,
            p_dense: 0.02,
            k_birth: 0.3,
            k_death: 0.2,
            k_deathai: 0.2,
            k_deathmachine: 0.1,
            k_aicreate: 0.0003,
            k_compcreate: 0.00005,
        }
    }
}

impl SimulationParameters {
    /// Returns default parameters with the given grid dimension and density.
    pub fn with_grid(dim: usize, p_dense: f64) -> Self {
        Self {
            dim,
            p_dense,
            ..Default::default()
        }
    }

    /// Checks every field, failing fast before any state is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.dim == 0 {
            return Err(SimError::config("dim must be positive"));
        }

        if !self.p_dense.is_finite() || !(0.0..=1.0).contains(&self.p_dense) {
            return Err(SimError::config(format!(
                "p_dense must lie in [0, 1], got {}",
                self.p_dense
            )));
        }

        for (name, rate) in self.rates() {
            if !rate.is_finite() || rate < 0.0 {
                return Err(SimError::config(format!(
                    "{} must be a non-negative finite rate, got {}",
                    name, rate
                )));
            }
        }

        Ok(())
    }

    /// Named transition rates, in declaration order.
    pub fn rates(&self) -> [(&'static str, f64); 6] {
        [
            ("k_birth", self.k_birth),
            ("k_death", self.k_death),
            ("k_deathai", self.k_deathai),
            ("k_deathmachine", self.k_deathmachine),
            ("k_aicreate", self.k_aicreate),
            ("k_compcreate", self.k_compcreate),
        ]
    }
}
