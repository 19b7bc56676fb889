//! Append-only population history.

use crate::error::{Result, SimError};
use crate::world::Population;
use serde::{Deserialize, Serialize};

/// Population counts recorded at the end of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySample {
    /// Ticks completed when the sample was taken (1 for the first tick)
    pub tick: u64,
    pub humans: u64,
    pub machines: u64,
    pub ai: u64,
}

impl HistorySample {
    pub fn new(tick: u64, population: Population) -> Self {
        Self {
            tick,
            humans: population.humans,
            machines: population.machines,
            ai: population.ai,
        }
    }

    pub fn population(&self) -> Population {
        Population {
            humans: self.humans,
            machines: self.machines,
            ai: self.ai,
        }
    }
}

/// One sample per tick, never mutated or truncated once appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    samples: Vec<HistorySample>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: HistorySample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[HistorySample] {
        &self.samples
    }

    pub fn last(&self) -> Option<&HistorySample> {
        self.samples.last()
    }

    /// Splits the samples into parallel series for charting and persistence.
    pub fn to_columns(&self) -> HistoryColumns {
        let mut columns = HistoryColumns::default();
        for s in &self.samples {
            columns.time.push(s.tick);
            columns.humans.push(s.humans);
            columns.machines.push(s.machines);
            columns.ai.push(s.ai);
        }
        columns
    }

    /// Rebuilds history from parallel series, which must be equally long.
    pub fn from_columns(columns: HistoryColumns) -> Result<Self> {
        let len = columns.time.len();
        if columns.humans.len() != len || columns.machines.len() != len || columns.ai.len() != len {
            return Err(SimError::corrupt(format!(
                "history series lengths differ: time={} humans={} machines={} ai={}",
                len,
                columns.humans.len(),
                columns.machines.len(),
                columns.ai.len()
            )));
        }

        let samples = (0..len)
            .map(|i| HistorySample {
                tick: columns.time[i],
                humans: columns.humans[i],
                machines: columns.machines[i],
                ai: columns.ai[i],
            })
            .collect();

        Ok(Self { samples })
    }
}

/// Columnar form `{time, humans, machines, ai}`.
///
/// Every series defaults to empty when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryColumns {
    pub time: Vec<u64>,
    pub humans: Vec<u64>,
    pub machines: Vec<u64>,
    pub ai: Vec<u64>,
}
