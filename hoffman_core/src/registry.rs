//! Ordered agent positions.

use rand::seq::SliceRandom;
use rand::Rng;

/// A `(row, col)` cell coordinate.
pub type Position = (usize, usize);

/// Ordered sequence of agent positions, kept in sync with the grid by
/// [`World`](crate::World).
///
/// Registry order carries no meaning between ticks. Each tick draws a fresh
/// traversal order with [`shuffled_order`](Self::shuffled_order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentRegistry {
    positions: Vec<Position>,
}

impl AgentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry from existing positions, preserving index order.
    pub fn from_positions(positions: Vec<Position>) -> Self {
        Self { positions }
    }

    /// Number of agents.
    pub fn count(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if no agents are registered.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of agent `idx`.
    pub fn position(&self, idx: usize) -> Position {
        self.positions[idx]
    }

    /// Updates the stored position of agent `idx`.
    pub fn set_position(&mut self, idx: usize, row: usize, col: usize) {
        self.positions[idx] = (row, col);
    }

    /// All positions in index order.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub(crate) fn push(&mut self, position: Position) -> usize {
        self.positions.push(position);
        self.positions.len() - 1
    }

    /// Removes agent `idx`; the last agent takes over its index.
    pub(crate) fn swap_remove(&mut self, idx: usize) -> Position {
        self.positions.swap_remove(idx)
    }

    /// Draws a uniform random permutation of `0..count()`.
    ///
    /// Fisher-Yates over the identity permutation, so every ordering is
    /// equally likely for a uniform source.
    pub fn shuffled_order<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.positions.len()).collect();
        order.shuffle(rng);
        order
    }
}
