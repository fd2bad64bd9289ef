//! Board Engine Tests
//!
//! Sliding, merging and terminal detection checked against hand-worked positions and
//! against properties that must hold for every board.

use mcts_2048::board::{apply_direction, is_terminal, legal_directions, slide_line_left};
use mcts_2048::spawner::TileSpawner;
use mcts_2048::types::{Board, Direction};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn row_board(row: [u32; 4]) -> Board {
    let mut board = Board::EMPTY;
    board.cells[0] = row;
    board
}

/// Random position with a mix of empty cells and small tiles
fn random_board(rng: &mut StdRng) -> Board {
    let mut board = Board::EMPTY;
    for row in 0..4 {
        for col in 0..4 {
            if rng.random_bool(0.7) {
                board.set(row, col, 1 << rng.random_range(1..6));
            }
        }
    }
    board
}

#[test]
fn test_left_merges_across_gap() {
    let outcome = apply_direction(&row_board([0, 2, 0, 2]), Direction::Left);
    assert_eq!(outcome.board.cells[0], [4, 0, 0, 0]);
    assert_eq!(outcome.score_delta, 4);
    assert!(outcome.moved);
}

#[test]
fn test_right_merges_across_gap() {
    let outcome = apply_direction(&row_board([2, 0, 2, 0]), Direction::Right);
    assert_eq!(outcome.board.cells[0], [0, 0, 0, 4]);
    assert_eq!(outcome.score_delta, 4);
}

#[test]
fn test_down_merges_column_ends() {
    let mut board = Board::EMPTY;
    board.set(0, 0, 2);
    board.set(3, 0, 2);
    let outcome = apply_direction(&board, Direction::Down);
    let column: Vec<u32> = (0..4).map(|r| outcome.board.get(r, 0)).collect();
    assert_eq!(column, vec![0, 0, 0, 4]);
    assert_eq!(outcome.score_delta, 4);
}

#[test]
fn test_up_merges_column() {
    let mut board = Board::EMPTY;
    board.set(1, 0, 2);
    board.set(3, 0, 2);
    let outcome = apply_direction(&board, Direction::Up);
    assert_eq!(outcome.board.get(0, 0), 4);
    assert_eq!(outcome.score_delta, 4);
}

#[test]
fn test_checkerboard_is_terminal_with_no_legal_moves() {
    let board = Board::new([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
    assert!(is_terminal(&board));
    for dir in Direction::all() {
        assert!(!apply_direction(&board, dir).moved, "{} should not move", dir);
    }
}

#[test]
fn test_full_board_with_one_pair_is_playable() {
    let board = Board::new([[2, 2, 4, 8], [4, 8, 2, 4], [2, 4, 8, 2], [8, 2, 4, 8]]);
    assert!(!is_terminal(&board));
    assert_eq!(legal_directions(&board), vec![Direction::Left, Direction::Right]);
}

#[test]
fn test_board_with_empty_cell_is_not_terminal() {
    let board = Board::new([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 0, 2]]);
    assert!(!is_terminal(&board));
}

#[test]
fn test_each_tile_merges_at_most_once() {
    let (line, gained) = slide_line_left(&[4, 4, 8, 0]);
    assert_eq!(line, [8, 8, 0, 0]);
    assert_eq!(gained, 8);

    let (line, gained) = slide_line_left(&[2, 2, 2, 0]);
    assert_eq!(line, [4, 2, 0, 0]);
    assert_eq!(gained, 4);
}

#[test]
fn test_unmoved_direction_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..500 {
        let board = random_board(&mut rng);
        for dir in Direction::all() {
            let outcome = apply_direction(&board, dir);
            if !outcome.moved {
                assert_eq!(outcome.board, board);
                assert_eq!(apply_direction(&outcome.board, dir), outcome);
            }
        }
    }
}

#[test]
fn test_score_delta_is_sum_of_new_tiles() {
    let mut rng = StdRng::seed_from_u64(77);
    for _ in 0..500 {
        let board = random_board(&mut rng);
        for dir in Direction::all() {
            let outcome = apply_direction(&board, dir);
            let before: u64 = board.cells.iter().flatten().map(|&v| u64::from(v)).sum();
            let after: u64 = outcome.board.cells.iter().flatten().map(|&v| u64::from(v)).sum();
            // Sliding conserves the tile total; every merge removes one tile
            assert_eq!(before, after);
            let merges = board.count_empty().abs_diff(outcome.board.count_empty());
            if outcome.score_delta == 0 {
                assert_eq!(merges, 0);
            } else {
                assert!(merges > 0);
            }
        }
    }
}

/// A line can move toward index 0 iff a zero precedes a tile or two equal tiles touch
fn line_can_move_left(line: &[u32; 4]) -> bool {
    let gap_before_tile = (0..4).any(|i| line[i] == 0 && line[i + 1..].iter().any(|&v| v != 0));
    let equal_neighbours = line.windows(2).any(|w| w[0] != 0 && w[0] == w[1]);
    gap_before_tile || equal_neighbours
}

#[test]
fn test_legality_matches_gap_or_pair_rule() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..500 {
        let board = random_board(&mut rng);
        let transposed = board.transpose();
        let reversed = |line: &[u32; 4]| {
            let mut l = *line;
            l.reverse();
            l
        };

        let expected = |dir: Direction| match dir {
            Direction::Left => board.cells.iter().any(line_can_move_left),
            Direction::Right => board.cells.iter().any(|l| line_can_move_left(&reversed(l))),
            Direction::Up => transposed.cells.iter().any(line_can_move_left),
            Direction::Down => transposed.cells.iter().any(|l| line_can_move_left(&reversed(l))),
        };

        for dir in Direction::all() {
            assert_eq!(apply_direction(&board, dir).moved, expected(dir), "{}\n{}", dir, board);
        }

        let any_legal = !legal_directions(&board).is_empty();
        if board.count_empty() < 16 {
            assert_eq!(is_terminal(&board), !any_legal, "{}", board);
        }
    }
}

#[test]
fn test_spawned_games_keep_power_of_two_tiles() {
    let spawner = TileSpawner::default();
    let mut rng = StdRng::seed_from_u64(31);
    let mut board = spawner.spawn(&Board::EMPTY, &mut rng);

    for _ in 0..200 {
        let legal = legal_directions(&board);
        if legal.is_empty() {
            break;
        }
        let dir = legal[rng.random_range(0..legal.len())];
        board = spawner.spawn(&apply_direction(&board, dir).board, &mut rng);
        assert!(board
            .cells
            .iter()
            .flatten()
            .all(|&v| v == 0 || (v >= 2 && v.is_power_of_two())));
    }
}
