//! Heuristic board evaluation
//!
//! Scores a state as its accumulated game score plus a weighted sum of positional features.
//! Terminal states are worth their score alone. Used both as the rollout reward and by the
//! greedy half of the rollout policy.

use crate::config::HeuristicConfig;
use crate::types::{Board, GameState, BOARD_SIZE};

const CORNERS: [(usize, usize); 4] = [(0, 0), (0, 3), (3, 0), (3, 3)];
const CENTER: [(usize, usize); 4] = [(1, 1), (1, 2), (2, 1), (2, 2)];

/// Weighted multi-feature evaluation function
#[derive(Debug, Clone)]
pub struct HeuristicEvaluator {
    weights: HeuristicConfig,
}

impl HeuristicEvaluator {
    pub fn new(weights: HeuristicConfig) -> Self {
        HeuristicEvaluator { weights }
    }

    /// Evaluates a state. Pure: no randomness, no side effects.
    pub fn evaluate(&self, state: &GameState) -> f64 {
        let base = state.score as f64;
        if state.terminal {
            return base;
        }

        let board = &state.board;
        base + self.empty_cell_score(board)
            + self.monotonicity_score(board)
            + self.smoothness_score(board)
            + self.corner_score(board)
            + self.center_avoidance_score(board)
            + self.merge_potential_score(board)
            + self.structure_score(board)
    }

    pub fn empty_cell_score(&self, board: &Board) -> f64 {
        board.count_empty() as f64 * self.weights.empty_cell_weight
    }

    /// Rows and columns whose occupied neighbours never both rise and fall earn a flat
    /// bonus, plus a small credit for each close-valued neighbour pair in that line.
    pub fn monotonicity_score(&self, board: &Board) -> f64 {
        let mut score = 0.0;
        for i in 0..BOARD_SIZE {
            let row: [u32; BOARD_SIZE] = board.cells[i];
            let col: [u32; BOARD_SIZE] = std::array::from_fn(|r| board.cells[r][i]);
            score += self.line_monotonicity(&row);
            score += self.line_monotonicity(&col);
        }
        score
    }

    fn line_monotonicity(&self, line: &[u32; BOARD_SIZE]) -> f64 {
        let mut increasing = true;
        let mut decreasing = true;
        let mut pair_bonus = 0.0;

        for pair in line.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a == 0 || b == 0 {
                continue;
            }
            if a > b {
                increasing = false;
            }
            if a < b {
                decreasing = false;
            }
            let (lo, hi) = (a.min(b) as f64, a.max(b) as f64);
            if hi / lo <= self.weights.monotonic_pair_max_ratio {
                pair_bonus += lo * self.weights.monotonic_pair_weight;
            }
        }

        if increasing || decreasing {
            self.weights.monotonic_line_bonus + pair_bonus
        } else {
            0.0
        }
    }

    /// Negative sum of exponent gaps between occupied orthogonal neighbours
    pub fn smoothness_score(&self, board: &Board) -> f64 {
        let mut score = 0.0;
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let value = board.get(row, col);
                if value == 0 {
                    continue;
                }
                let exponent = log2(value);
                if col + 1 < BOARD_SIZE && board.get(row, col + 1) != 0 {
                    score -= (exponent - log2(board.get(row, col + 1))).abs();
                }
                if row + 1 < BOARD_SIZE && board.get(row + 1, col) != 0 {
                    score -= (exponent - log2(board.get(row + 1, col))).abs();
                }
            }
        }
        score
    }

    /// Rewards the maximum tile sitting in a corner, then separately re-credits each of the
    /// largest tiles whose value also appears in a corner (the maximum included).
    pub fn corner_score(&self, board: &Board) -> f64 {
        let corner_values: Vec<u32> = CORNERS.iter().map(|&(r, c)| board.get(r, c)).collect();
        let max_tile = board.max_tile();

        let mut score = 0.0;
        if corner_values.contains(&max_tile) {
            score += max_tile as f64 * self.weights.corner_max_weight;
        }

        let mut occupied: Vec<u32> = board.cells.iter().flatten().copied().filter(|&v| v > 0).collect();
        occupied.sort_unstable_by(|a, b| b.cmp(a));
        for value in occupied.into_iter().take(self.weights.corner_top_count) {
            if corner_values.contains(&value) {
                score += value as f64 * self.weights.corner_top_weight;
            }
        }
        score
    }

    pub fn center_avoidance_score(&self, board: &Board) -> f64 {
        CENTER
            .iter()
            .map(|&(r, c)| board.get(r, c))
            .filter(|&v| v > 0)
            .map(|v| -(v as f64) * self.weights.center_penalty_weight)
            .sum()
    }

    /// Each tile earns a credit per equal right-hand or lower neighbour
    pub fn merge_potential_score(&self, board: &Board) -> f64 {
        let mut score = 0.0;
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let value = board.get(row, col);
                if value == 0 {
                    continue;
                }
                if col + 1 < BOARD_SIZE && board.get(row, col + 1) == value {
                    score += value as f64 * self.weights.merge_weight;
                }
                if row + 1 < BOARD_SIZE && board.get(row + 1, col) == value {
                    score += value as f64 * self.weights.merge_weight;
                }
            }
        }
        score
    }

    /// Walks the snake path (top row left to right, right column downward, bottom row right
    /// to left) summing tiles that do not exceed the last accepted one. Larger tiles are
    /// skipped without resetting the walk.
    pub fn structure_score(&self, board: &Board) -> f64 {
        let mut accumulated = 0u64;
        let mut last = 0u32;

        for (row, col) in snake_path() {
            let value = board.get(row, col);
            if value == 0 {
                continue;
            }
            if last == 0 || value <= last {
                accumulated += u64::from(value);
                last = value;
            }
        }

        accumulated as f64 * self.weights.structure_weight
    }
}

/// Cells of the snake path in visiting order
fn snake_path() -> impl Iterator<Item = (usize, usize)> {
    let top = (0..BOARD_SIZE).map(|c| (0, c));
    let right = (1..BOARD_SIZE).map(|r| (r, BOARD_SIZE - 1));
    let bottom = (0..BOARD_SIZE - 1).rev().map(|c| (BOARD_SIZE - 1, c));
    top.chain(right).chain(bottom)
}

#[inline]
fn log2(value: u32) -> f64 {
    assert!(value > 0, "log2 of an empty cell");
    (value as f64).log2()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn evaluator() -> HeuristicEvaluator {
        HeuristicEvaluator::new(Config::default_hardcoded().heuristic)
    }

    fn state(cells: [[u32; 4]; 4], score: u64) -> GameState {
        GameState::new(Board::new(cells), score)
    }

    #[test]
    fn test_empty_board_value() {
        // 16 empty cells * 15 + 8 trivially monotonic lines * 60
        let value = evaluator().evaluate(&GameState::new(Board::EMPTY, 0));
        assert!((value - 720.0).abs() < 1e-9, "got {}", value);
    }

    #[test]
    fn test_terminal_state_is_worth_its_score() {
        let s = state([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]], 1234);
        assert!(s.terminal);
        assert_eq!(evaluator().evaluate(&s), 1234.0);
    }

    #[test]
    fn test_snake_path_order() {
        let path: Vec<_> = snake_path().collect();
        assert_eq!(
            path,
            vec![(0, 0), (0, 1), (0, 2), (0, 3), (1, 3), (2, 3), (3, 3), (3, 2), (3, 1), (3, 0)]
        );
    }

    #[test]
    fn test_structure_skips_without_reset() {
        let board = Board::new([[8, 16, 4, 0], [0, 0, 0, 2], [0, 0, 0, 0], [0, 0, 0, 0]]);
        // 8 accepted, 16 skipped, 4 and 2 accepted
        let expected = (8.0 + 4.0 + 2.0) * 0.2;
        assert!((evaluator().structure_score(&board) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_corner_double_credits_maximum() {
        let board = Board::new([[64, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        // 0.5 * 64 for the corner maximum, 0.1 * 64 again as a top-4 tile
        assert!((evaluator().corner_score(&board) - 38.4).abs() < 1e-9);
    }

    #[test]
    fn test_merge_potential_counts_each_pair_once() {
        let board = Board::new([[4, 4, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        assert!((evaluator().merge_potential_score(&board) - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_smoothness_penalises_gaps() {
        let board = Board::new([[2, 16, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        assert!((evaluator().smoothness_score(&board) + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_center_penalty() {
        let board = Board::new([[0, 0, 0, 0], [0, 8, 2, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        assert!((evaluator().center_avoidance_score(&board) + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_monotonicity_ignores_gaps_between_cells() {
        // only the occupied neighbour pair (2, 4) is compared
        let board = Board::new([[8, 0, 2, 4], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let e = evaluator();
        // row 0: monotone, pair ratio 2 -> 60 + 0.2; remaining 7 lines trivially monotone
        let expected = 8.0 * 60.0 + 0.2;
        assert!((e.monotonicity_score(&board) - expected).abs() < 1e-9);
    }
}
