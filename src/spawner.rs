// Random tile spawning and the full stochastic state transition built on it

use rand::Rng;

use crate::board;
use crate::config::SpawnConfig;
use crate::types::{Board, Direction, GameState};

/// Inserts one 2 or 4 tile into a uniformly chosen empty cell
#[derive(Debug, Clone, Copy)]
pub struct TileSpawner {
    two_probability: f64,
}

impl TileSpawner {
    pub fn new(config: &SpawnConfig) -> Self {
        TileSpawner {
            two_probability: config.two_probability,
        }
    }

    /// Returns a copy of `board` with one new tile, or the board unchanged when it is full
    pub fn spawn<R: Rng + ?Sized>(&self, board: &Board, rng: &mut R) -> Board {
        let empty = board.empty_cells();
        if empty.is_empty() {
            return *board;
        }

        let (row, col) = empty[rng.random_range(0..empty.len())];
        let value = if rng.random_bool(self.two_probability) { 2 } else { 4 };

        let mut out = *board;
        out.set(row, col, value);
        out
    }

    /// One ply: slide, spawn only if the slide changed the board, accumulate score.
    /// The input state is left untouched.
    pub fn advance<R: Rng + ?Sized>(&self, state: &GameState, dir: Direction, rng: &mut R) -> GameState {
        let outcome = board::apply_direction(&state.board, dir);
        let next_board = if outcome.moved {
            self.spawn(&outcome.board, rng)
        } else {
            outcome.board
        };

        GameState::new(next_board, state.score + outcome.score_delta)
    }
}

impl Default for TileSpawner {
    fn default() -> Self {
        TileSpawner { two_probability: 0.9 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_fills_exactly_one_empty_cell() {
        let spawner = TileSpawner::default();
        let mut rng = StdRng::seed_from_u64(7);

        let board = spawner.spawn(&Board::EMPTY, &mut rng);
        assert_eq!(board.count_empty(), 15);
        let value = board.max_tile();
        assert!(value == 2 || value == 4);
    }

    #[test]
    fn test_spawn_on_full_board_is_noop() {
        let spawner = TileSpawner::default();
        let mut rng = StdRng::seed_from_u64(7);
        let full = Board::new([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert_eq!(spawner.spawn(&full, &mut rng), full);
    }

    #[test]
    fn test_spawn_probability_extremes() {
        let mut rng = StdRng::seed_from_u64(99);
        let always_four = TileSpawner::new(&SpawnConfig { two_probability: 0.0 });
        let always_two = TileSpawner::new(&SpawnConfig { two_probability: 1.0 });

        for _ in 0..20 {
            assert_eq!(always_four.spawn(&Board::EMPTY, &mut rng).max_tile(), 4);
            assert_eq!(always_two.spawn(&Board::EMPTY, &mut rng).max_tile(), 2);
        }
    }

    #[test]
    fn test_advance_spawns_only_after_a_change() {
        let spawner = TileSpawner::default();
        let mut rng = StdRng::seed_from_u64(3);

        let mut board = Board::EMPTY;
        board.cells[0] = [2, 4, 8, 16];
        let state = GameState::new(board, 10);

        let unchanged = spawner.advance(&state, Direction::Left, &mut rng);
        assert_eq!(unchanged.board, board);
        assert_eq!(unchanged.score, 10);

        board.cells[0] = [2, 2, 0, 0];
        let state = GameState::new(board, 10);
        let next = spawner.advance(&state, Direction::Left, &mut rng);
        assert_eq!(next.board.get(0, 0), 4);
        assert_eq!(next.score, 14);
        assert_eq!(next.board.count_empty(), 14);
        // input snapshot untouched
        assert_eq!(state.board.cells[0], [2, 2, 0, 0]);
    }
}
