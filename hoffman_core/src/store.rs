//! Snapshot codec and checkpoint stores.
//!
//! A snapshot is a lossless, human-readable JSON document holding the
//! parameters, the full label and stasis matrices, agent positions in
//! registry order, the three counters, and the columnar history. The random
//! stream position and tick count are appended so a resumed run continues
//! exactly where it stopped.

use crate::error::{Result, SimError};
use crate::grid::{Grid, Label};
use crate::history::{History, HistoryColumns};
use crate::params::SimulationParameters;
use crate::registry::AgentRegistry;
use crate::world::{Population, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Persisted position of a ChaCha8 stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: [u8; 32],
    pub stream: u64,
    #[serde(with = "u128_string")]
    pub word_pos: u128,
}

impl RngState {
    pub fn capture(rng: &ChaCha8Rng) -> Self {
        Self {
            seed: rng.get_seed(),
            stream: rng.get_stream(),
            word_pos: rng.get_word_pos(),
        }
    }

    pub fn restore(&self) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::from_seed(self.seed);
        rng.set_stream(self.stream);
        rng.set_word_pos(self.word_pos);
        rng
    }
}

/// Full simulation state in its persisted layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub params: SimulationParameters,

    /// `dim × dim` label codes
    pub mat: Vec<Vec<Label>>,

    /// `dim × dim` stasis values
    #[serde(rename = "P")]
    pub stasis: Vec<Vec<f64>>,

    /// `[row, col]` per agent, in registry order
    pub agents: Vec<[usize; 2]>,

    pub c_man: u64,
    pub c_machine: u64,
    pub c_ai: u64,

    #[serde(default)]
    pub history: HistoryColumns,

    /// Ticks completed; defaults to the history length when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick: Option<u64>,

    /// Random stream position; reseeded from the caller's seed when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng: Option<RngState>,
}

/// State reconstructed from a snapshot.
#[derive(Debug, Clone)]
pub struct RestoredState {
    pub params: SimulationParameters,
    pub world: World,
    pub history: History,
    pub tick: u64,
    pub rng: ChaCha8Rng,
}

impl Snapshot {
    /// Captures the given state.
    pub fn capture(
        params: &SimulationParameters,
        world: &World,
        history: &History,
        tick: u64,
        rng: &ChaCha8Rng,
    ) -> Self {
        let grid = world.grid();
        let dim = grid.dim().max(1);
        let population = world.population();

        Self {
            params: params.clone(),
            mat: grid.labels().chunks(dim).map(<[Label]>::to_vec).collect(),
            stasis: grid.stasis_field().chunks(dim).map(<[f64]>::to_vec).collect(),
            agents: world.agents().positions().iter().map(|&(r, c)| [r, c]).collect(),
            c_man: population.humans,
            c_machine: population.machines,
            c_ai: population.ai,
            history: history.to_columns(),
            tick: Some(tick),
            rng: Some(RngState::capture(rng)),
        }
    }

    /// Persisted counters.
    pub fn population(&self) -> Population {
        Population {
            humans: self.c_man,
            machines: self.c_machine,
            ai: self.c_ai,
        }
    }

    /// Validates the snapshot and rebuilds the state it describes.
    ///
    /// Structural problems are `SnapshotCorrupt`. Persisted counters are
    /// trusted as-is; a disagreement with the grid is logged, not rejected.
    pub fn restore(self, fallback_seed: u64) -> Result<RestoredState> {
        self.params
            .validate()
            .map_err(|e| SimError::corrupt(format!("invalid parameters: {}", e)))?;

        let dim = self.params.dim;
        let labels = flatten_matrix("mat", self.mat, dim)?;
        let stasis = flatten_matrix("P", self.stasis, dim)?;
        let grid = Grid::from_parts(dim, labels, stasis)
            .ok_or_else(|| SimError::corrupt("matrix size mismatch"))?;

        let registry =
            AgentRegistry::from_positions(self.agents.iter().map(|&[r, c]| (r, c)).collect());

        let scanned = Population::scan(&grid);
        let persisted = Population {
            humans: self.c_man,
            machines: self.c_machine,
            ai: self.c_ai,
        };
        if persisted != scanned {
            warn!(?persisted, ?scanned, "snapshot counters disagree with grid contents");
        }
        let world = World::from_parts(grid, registry, persisted);
        world.check_structure()?;

        let history = History::from_columns(self.history)?;
        let tick = self.tick.unwrap_or(history.len() as u64);

        let rng = match &self.rng {
            Some(state) => state.restore(),
            None => {
                debug!(fallback_seed, "snapshot has no rng state, reseeding");
                ChaCha8Rng::seed_from_u64(fallback_seed)
            }
        };

        Ok(RestoredState {
            params: self.params,
            world,
            history,
            tick,
            rng,
        })
    }
}

fn flatten_matrix<T>(field: &str, rows: Vec<Vec<T>>, dim: usize) -> Result<Vec<T>> {
    if rows.len() != dim {
        return Err(SimError::corrupt(format!(
            "{} has {} rows, expected {}",
            field,
            rows.len(),
            dim
        )));
    }

    let mut flat = Vec::with_capacity(dim * dim);
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != dim {
            return Err(SimError::corrupt(format!(
                "{} row {} has {} columns, expected {}",
                field,
                i,
                row.len(),
                dim
            )));
        }
        flat.extend(row);
    }
    Ok(flat)
}

/// Encodes a snapshot as pretty-printed JSON.
///
/// JSON has no representation for NaN or infinities, so a snapshot holding
/// one is refused rather than written as `null`.
pub fn encode(snapshot: &Snapshot) -> Result<String> {
    let params = &snapshot.params;
    if let Some((name, value)) = std::iter::once(("p_dense", params.p_dense))
        .chain(params.rates())
        .find(|(_, v)| !v.is_finite())
    {
        return Err(SimError::Serialization(format!("non-finite {} = {}", name, value)));
    }
    for (row, values) in snapshot.stasis.iter().enumerate() {
        if let Some(col) = values.iter().position(|v| !v.is_finite()) {
            return Err(SimError::Serialization(format!(
                "non-finite stasis {} at ({}, {})",
                values[col], row, col
            )));
        }
    }

    serde_json::to_string_pretty(snapshot).map_err(|e| SimError::Serialization(e.to_string()))
}

/// Decodes a snapshot from JSON.
pub fn decode(json: &str) -> Result<Snapshot> {
    Ok(serde_json::from_str(json)?)
}

/// Destination for checkpoints.
pub trait StateStore {
    /// Persists a snapshot, replacing any previous one.
    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Reads back the most recent snapshot.
    fn load(&self) -> Result<Snapshot>;
}

/// Stores snapshots as a JSON file.
///
/// Writes go to a sibling `.tmp` file first and are renamed into place, so an
/// interrupted write never clobbers the previous checkpoint.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl StateStore for JsonFileStore {
    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let json = encode(snapshot)?;
        let tmp = self.temp_path();

        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), bytes = json.len(), "snapshot written");
        Ok(())
    }

    fn load(&self) -> Result<Snapshot> {
        let json = fs::read_to_string(&self.path)?;
        decode(&json)
    }
}

/// Keeps the latest snapshot in memory, encoded exactly as a file would be.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    latest: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON of the latest snapshot.
    pub fn latest_json(&self) -> Option<&str> {
        self.latest.as_deref()
    }
}

impl StateStore for MemoryStore {
    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.latest = Some(encode(snapshot)?);
        Ok(())
    }

    fn load(&self) -> Result<Snapshot> {
        let json = self.latest.as_deref().ok_or_else(|| {
            SimError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no snapshot has been saved",
            ))
        })?;
        decode(json)
    }
}

/// Serde adapter writing a `u128` as a decimal string.
mod u128_string {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum U128Input {
            String(String),
            Number(u64),
        }

        match U128Input::deserialize(deserializer)? {
            U128Input::String(raw) => raw.parse::<u128>().map_err(D::Error::custom),
            U128Input::Number(value) => Ok(value as u128),
        }
    }
}
