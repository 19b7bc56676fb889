//! Dense cell-occupancy store for the toroidal lattice.
//!
//! Labels and the stasis field live in two flat, row-major vectors sharing a
//! single `(row, col) -> row * dim + col` offset. The grid itself performs no
//! wraparound: callers reduce indices modulo `dim` before addressing a cell.

use serde::{Deserialize, Serialize};

/// Occupancy label of a single cell.
///
/// Persisted as its integer code (`0..=3`). Only `Human` is produced by the
/// built-in logic; `Machine` and `Ai` are reserved for transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Label {
    #[default]
    Empty = 0,
    Human = 1,
    Machine = 2,
    Ai = 3,
}

impl Label {
    /// All agent categories (every label except `Empty`).
    pub const AGENTS: [Label; 3] = [Label::Human, Label::Machine, Label::Ai];

    /// Returns true if this label denotes an agent.
    pub fn is_agent(self) -> bool {
        self != Label::Empty
    }

    /// Returns the label name.
    pub fn name(&self) -> &'static str {
        match self {
            Label::Empty => "empty",
            Label::Human => "human",
            Label::Machine => "machine",
            Label::Ai => "ai",
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label as u8
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Label::Empty),
            1 => Ok(Label::Human),
            2 => Ok(Label::Machine),
            3 => Ok(Label::Ai),
            _ => Err(format!("unknown cell label {}", code)),
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A `dim × dim` matrix of labels with a parallel stasis field.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    dim: usize,
    labels: Vec<Label>,
    stasis: Vec<f64>,
}

impl Grid {
    /// Creates an all-empty grid.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            labels: vec![Label::Empty; dim * dim],
            stasis: vec![0.0; dim * dim],
        }
    }

    /// Builds a grid from row-major label and stasis vectors.
    ///
    /// Returns `None` when either vector is not `dim * dim` long.
    pub fn from_parts(dim: usize, labels: Vec<Label>, stasis: Vec<f64>) -> Option<Self> {
        if labels.len() != dim * dim || stasis.len() != dim * dim {
            return None;
        }

        Some(Self { dim, labels, stasis })
    }

    /// Returns the side length.
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        debug_assert!(
            row < self.dim && col < self.dim,
            "cell ({}, {}) outside {}x{} grid",
            row,
            col,
            self.dim,
            self.dim
        );
        row * self.dim + col
    }

    /// Returns the label at `(row, col)`.
    pub fn occupancy(&self, row: usize, col: usize) -> Label {
        self.labels[self.offset(row, col)]
    }

    /// Returns the stasis value at `(row, col)`.
    pub fn stasis(&self, row: usize, col: usize) -> f64 {
        self.stasis[self.offset(row, col)]
    }

    /// Returns true if no agent occupies `(row, col)`.
    pub fn is_empty(&self, row: usize, col: usize) -> bool {
        self.occupancy(row, col) == Label::Empty
    }

    /// Writes a label and stasis value into one cell.
    pub fn set(&mut self, row: usize, col: usize, label: Label, stasis: f64) {
        let idx = self.offset(row, col);
        self.labels[idx] = label;
        self.stasis[idx] = stasis;
    }

    /// Marks a cell empty and zeroes its stasis value.
    pub fn clear(&mut self, row: usize, col: usize) {
        self.set(row, col, Label::Empty, 0.0);
    }

    /// Row-major labels.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Row-major stasis values.
    pub fn stasis_field(&self) -> &[f64] {
        &self.stasis
    }

    /// Counts cells carrying `label`.
    pub fn count(&self, label: Label) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }

    /// Iterates over occupied cells as `(row, col, label)`.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, Label)> + '_ {
        let dim = self.dim;
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.is_agent())
            .map(move |(idx, &label)| (idx / dim, idx % dim, label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(4);
        assert_eq!(grid.dim(), 4);
        assert_eq!(grid.count(Label::Empty), 16);
        assert_eq!(grid.occupied().count(), 0);
    }

    #[test]
    fn test_set_touches_only_addressed_cell() {
        let mut grid = Grid::new(3);
        grid.set(1, 2, Label::Human, 0.75);

        assert_eq!(grid.occupancy(1, 2), Label::Human);
        assert_eq!(grid.stasis(1, 2), 0.75);

        for row in 0..3 {
            for col in 0..3 {
                if (row, col) != (1, 2) {
                    assert!(grid.is_empty(row, col));
                    assert_eq!(grid.stasis(row, col), 0.0);
                }
            }
        }
    }

    #[test]
    fn test_clear_zeroes_stasis() {
        let mut grid = Grid::new(2);
        grid.set(0, 1, Label::Machine, 1.0);
        grid.clear(0, 1);

        assert!(grid.is_empty(0, 1));
        assert_eq!(grid.stasis(0, 1), 0.0);
    }

    #[test]
    fn test_row_major_layout() {
        let mut grid = Grid::new(3);
        grid.set(2, 0, Label::Ai, 0.5);

        assert_eq!(grid.labels()[6], Label::Ai);
        assert_eq!(grid.stasis_field()[6], 0.5);
        assert_eq!(grid.occupied().collect::<Vec<_>>(), vec![(2, 0, Label::Ai)]);
    }

    #[test]
    fn test_from_parts_checks_length() {
        assert!(Grid::from_parts(2, vec![Label::Empty; 4], vec![0.0; 4]).is_some());
        assert!(Grid::from_parts(2, vec![Label::Empty; 3], vec![0.0; 4]).is_none());
        assert!(Grid::from_parts(2, vec![Label::Empty; 4], vec![0.0; 5]).is_none());
    }

    #[test]
    fn test_label_codes() {
        for label in [Label::Empty, Label::Human, Label::Machine, Label::Ai] {
            let code: u8 = label.into();
            assert_eq!(Label::try_from(code).unwrap(), label);
        }
        assert!(Label::try_from(4).is_err());
        assert_eq!(serde_json::to_string(&Label::Machine).unwrap(), "2");
    }
}
