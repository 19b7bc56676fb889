//! Per-agent movement resolution on the torus.
//!
//! Each agent is resolved completely (read neighbours, then write) before the
//! next agent in the tick's order is considered, so two agents can never claim
//! the same empty cell within one tick.

use crate::registry::Position;
use crate::world::World;
use rand::seq::SliceRandom;
use rand::Rng;

/// One of the four von Neumann steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Base candidate order before shuffling.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Neighbour of `(row, col)` in this direction on a `dim × dim` torus.
    pub fn step(self, (row, col): Position, dim: usize) -> Position {
        match self {
            Direction::Up => ((row + dim - 1) % dim, col),
            Direction::Down => ((row + 1) % dim, col),
            Direction::Left => (row, (col + dim - 1) % dim),
            Direction::Right => (row, (col + 1) % dim),
        }
    }
}

/// Outcome of a single move attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Agent stepped from one cell to another
    Moved { from: Position, to: Position },

    /// All four neighbours were occupied
    Blocked,
}

/// Stateless resolver applying one random step per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementResolver;

impl MovementResolver {
    /// Moves agent `idx` to a uniformly shuffled choice among its empty
    /// neighbours, or leaves it in place if there are none.
    pub fn move_agent<R: Rng + ?Sized>(&self, world: &mut World, idx: usize, rng: &mut R) -> MoveOutcome {
        let mut order = Direction::ALL;
        order.shuffle(rng);
        self.move_agent_in_order(world, idx, order)
    }

    /// Moves agent `idx` into the first empty neighbour in `order`.
    ///
    /// Emptiness is checked before any cell is written, so the agent's own
    /// cell (the only neighbour on a 1×1 torus) is never a destination.
    pub fn move_agent_in_order(&self, world: &mut World, idx: usize, order: [Direction; 4]) -> MoveOutcome {
        let dim = world.dim();
        let (grid, agents) = world.parts_mut();
        let from = agents.position(idx);

        let destination = order
            .iter()
            .map(|dir| dir.step(from, dim))
            .find(|&(row, col)| grid.is_empty(row, col));

        let Some(to) = destination else {
            return MoveOutcome::Blocked;
        };

        let label = grid.occupancy(from.0, from.1);
        let stasis = grid.stasis(from.0, from.1);
        grid.set(to.0, to.1, label, stasis);
        grid.clear(from.0, from.1);
        agents.set_position(idx, to.0, to.1);

        MoveOutcome::Moved { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Label;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_single_agent_moves_up_first() {
        let mut world = World::empty(3);
        world.spawn(1, 1, Label::Human, 0.25).unwrap();

        let order = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];
        let outcome = MovementResolver.move_agent_in_order(&mut world, 0, order);

        assert_eq!(outcome, MoveOutcome::Moved { from: (1, 1), to: (0, 1) });
        assert_eq!(world.agents().position(0), (0, 1));
        assert!(world.grid().is_empty(1, 1));
        assert_eq!(world.grid().stasis(1, 1), 0.0);
        assert_eq!(world.grid().occupancy(0, 1), Label::Human);
        assert_eq!(world.grid().stasis(0, 1), 0.25);
    }

    #[test]
    fn test_wraparound_each_direction() {
        for dim in [2, 5] {
            let last = dim - 1;
            let cases = [
                (Direction::Up, (0, 1), (last, 1)),
                (Direction::Down, (last, 1), (0, 1)),
                (Direction::Left, (1, 0), (1, last)),
                (Direction::Right, (1, last), (1, 0)),
            ];

            for (dir, start, expected) in cases {
                let mut world = World::empty(dim);
                world.spawn(start.0, start.1, Label::Human, 1.0).unwrap();

                let mut order = Direction::ALL;
                order.sort_by_key(|d| *d != dir);
                MovementResolver.move_agent_in_order(&mut world, 0, order);

                assert_eq!(
                    world.agents().position(0),
                    expected,
                    "dim={} dir={:?}",
                    dim,
                    dir
                );
            }
        }
    }

    #[test]
    fn test_dim_one_never_moves() {
        let mut world = World::empty(1);
        world.spawn(0, 0, Label::Human, 1.0).unwrap();
        let before = world.clone();

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..10 {
            assert_eq!(MovementResolver.move_agent(&mut world, 0, &mut rng), MoveOutcome::Blocked);
        }
        assert_eq!(world, before);
    }

    #[test]
    fn test_surrounded_agent_is_noop() {
        let mut world = World::empty(5);
        world.spawn(2, 2, Label::Human, 0.5).unwrap();
        for (row, col) in [(1, 2), (3, 2), (2, 1), (2, 3)] {
            world.spawn(row, col, Label::Machine, 0.0).unwrap();
        }
        let before = world.clone();

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        assert_eq!(MovementResolver.move_agent(&mut world, 0, &mut rng), MoveOutcome::Blocked);
        assert_eq!(world, before);
    }

    #[test]
    fn test_only_free_neighbour_is_taken() {
        let mut world = World::empty(5);
        world.spawn(2, 2, Label::Human, 1.0).unwrap();
        for (row, col) in [(1, 2), (3, 2), (2, 1)] {
            world.spawn(row, col, Label::Human, 1.0).unwrap();
        }

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let outcome = MovementResolver.move_agent(&mut world, 0, &mut rng);

        assert_eq!(outcome, MoveOutcome::Moved { from: (2, 2), to: (2, 3) });
        world.check_consistency().unwrap();
    }

    #[test]
    fn test_dim_two_vertical_neighbours_coincide() {
        assert_eq!(Direction::Up.step((0, 0), 2), Direction::Down.step((0, 0), 2));
        assert_eq!(Direction::Left.step((1, 1), 2), Direction::Right.step((1, 1), 2));
    }
}
