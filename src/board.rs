// Board transition engine
//
// Pure functions: sliding and merging tiles for one direction, and terminal detection.
// Vertical moves reuse the row logic on the transposed board.

use crate::types::{Board, Direction, MoveOutcome, BOARD_SIZE};

type Line = [u32; BOARD_SIZE];

/// Slides a board in `dir`, reporting the merged score and whether anything changed.
/// No tile is spawned.
pub fn apply_direction(board: &Board, dir: Direction) -> MoveOutcome {
    match dir {
        Direction::Left => shift_rows(board, slide_line_left),
        Direction::Right => shift_rows(board, slide_line_right),
        Direction::Up => {
            let outcome = shift_rows(&board.transpose(), slide_line_left);
            MoveOutcome {
                board: outcome.board.transpose(),
                ..outcome
            }
        }
        Direction::Down => {
            let outcome = shift_rows(&board.transpose(), slide_line_right);
            MoveOutcome {
                board: outcome.board.transpose(),
                ..outcome
            }
        }
    }
}

fn shift_rows(board: &Board, slide: fn(&Line) -> (Line, u64)) -> MoveOutcome {
    let mut out = *board;
    let mut score_delta = 0;
    let mut moved = false;

    for (row, line) in board.cells.iter().enumerate() {
        let (slid, gained) = slide(line);
        if slid != *line {
            moved = true;
        }
        score_delta += gained;
        out.cells[row] = slid;
    }

    MoveOutcome {
        board: out,
        score_delta,
        moved,
    }
}

/// Compacts a line toward index 0, merging each equal adjacent pair at most once.
/// Returns the new line and the sum of merged tile values.
pub fn slide_line_left(line: &Line) -> (Line, u64) {
    let tiles: Vec<u32> = line.iter().copied().filter(|&v| v != 0).collect();
    let mut out = [0; BOARD_SIZE];
    let mut gained = 0u64;
    let mut write = 0;
    let mut i = 0;

    while i < tiles.len() {
        if i + 1 < tiles.len() && tiles[i] == tiles[i + 1] {
            let merged = tiles[i] * 2;
            out[write] = merged;
            gained += u64::from(merged);
            i += 2;
        } else {
            out[write] = tiles[i];
            i += 1;
        }
        write += 1;
    }

    (out, gained)
}

/// Mirror of `slide_line_left`: scans from the right and pads with leading zeros
pub fn slide_line_right(line: &Line) -> (Line, u64) {
    let mut reversed = *line;
    reversed.reverse();
    let (mut slid, gained) = slide_line_left(&reversed);
    slid.reverse();
    (slid, gained)
}

/// True when the board is full and no two orthogonal neighbours are equal
pub fn is_terminal(board: &Board) -> bool {
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            let value = board.get(row, col);
            if value == 0 {
                return false;
            }
            if col + 1 < BOARD_SIZE && value == board.get(row, col + 1) {
                return false;
            }
            if row + 1 < BOARD_SIZE && value == board.get(row + 1, col) {
                return false;
            }
        }
    }
    true
}

/// Directions that change the board, in canonical order. Spawning is ignored.
pub fn legal_directions(board: &Board) -> Vec<Direction> {
    Direction::all()
        .iter()
        .copied()
        .filter(|&dir| apply_direction(board, dir).moved)
        .collect()
}
