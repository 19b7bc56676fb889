//! JSON exporter for population charts.
//!
//! Exports the per-tick population series so an external plotting tool can
//! draw humans, machines and AI against tick number.

use hoffman_core::{HistoryColumns, SimulationClock, SimulationParameters};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// Final counts at the end of the exported run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalCounts {
    pub humans: u64,
    pub machines: u64,
    pub ai: u64,
}

/// Complete chart export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryExport {
    /// Seed used
    pub seed: u64,

    /// Parameters of the run
    pub params: SimulationParameters,

    /// Ticks completed
    pub final_tick: u64,

    /// Counts after the last tick
    pub final_counts: FinalCounts,

    /// Population series, one entry per tick
    pub history: HistoryColumns,
}

impl HistoryExport {
    /// Collects the export from a simulation.
    pub fn from_simulation(simulation: &SimulationClock, seed: u64) -> Self {
        let population = simulation.population();

        Self {
            seed,
            params: simulation.params().clone(),
            final_tick: simulation.tick_count(),
            final_counts: FinalCounts {
                humans: population.humans,
                machines: population.machines,
                ai: population.ai,
            },
            history: simulation.history().to_columns(),
        }
    }

    /// Number of exported samples.
    pub fn len(&self) -> usize {
        self.history.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.time.is_empty()
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoffman_core::ClockConfig;

    #[test]
    fn test_export_series_match_history() {
        let params = SimulationParameters::with_grid(8, 0.2);
        let mut sim = SimulationClock::new(params, ClockConfig::default(), 4).unwrap();
        sim.run(12).unwrap();

        let export = HistoryExport::from_simulation(&sim, 4);

        assert_eq!(export.len(), 12);
        assert_eq!(export.final_tick, 12);
        assert_eq!(export.history.time, (1..=12).collect::<Vec<u64>>());
        assert_eq!(export.final_counts.humans, sim.population().humans);
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");

        let params = SimulationParameters::with_grid(4, 0.5);
        let mut sim = SimulationClock::new(params, ClockConfig::default(), 1).unwrap();
        sim.run(3).unwrap();

        HistoryExport::from_simulation(&sim, 1)
            .write_to_file(path.to_str().unwrap())
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["history"]["time"], serde_json::json!([1, 2, 3]));
        assert_eq!(written["params"]["dim"], 4);
    }
}
