// Core game types shared by the board engine, the search and the game session

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::board;

/// Side length of the square grid
pub const BOARD_SIZE: usize = 4;

/// Tile value that counts as winning the puzzle
pub const WINNING_TILE: u32 = 2048;

/// The four sliding directions
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Returns all directions in canonical order (left, right, up, down)
    pub fn all() -> [Direction; 4] {
        [Direction::Left, Direction::Right, Direction::Up, Direction::Down]
    }

    /// Two-bit code of this direction, matching its position in `all()`
    pub fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }

    /// Inverse of `index`
    pub fn from_index(idx: usize) -> Option<Direction> {
        Direction::all().get(idx).copied()
    }

    /// Converts direction to its lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            other => Err(format!("Invalid direction '{}'", other)),
        }
    }
}

/// 4x4 grid of tile values, row-major; 0 is an empty cell
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(transparent)]
pub struct Board {
    pub cells: [[u32; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// A board with every cell empty
    pub const EMPTY: Board = Board {
        cells: [[0; BOARD_SIZE]; BOARD_SIZE],
    };

    pub fn new(cells: [[u32; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Board { cells }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[row][col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u32) {
        self.cells[row][col] = value;
    }

    /// Coordinates of every empty cell in row-major order
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut empty = Vec::with_capacity(BOARD_SIZE * BOARD_SIZE);
        for (row, line) in self.cells.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                if value == 0 {
                    empty.push((row, col));
                }
            }
        }
        empty
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v == 0).count()
    }

    /// Highest tile on the board, 0 when empty
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Swaps rows and columns
    pub fn transpose(&self) -> Board {
        let mut out = Board::EMPTY;
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                out.cells[col][row] = self.cells[row][col];
            }
        }
        out
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let rendered: Vec<String> = line
                .iter()
                .map(|&v| {
                    if v == 0 {
                        format!("{:>5}", ".")
                    } else {
                        format!("{:>5}", v)
                    }
                })
                .collect();
            write!(f, "{}", rendered.join(""))?;
        }
        Ok(())
    }
}

/// Result of sliding a board in one direction, before any tile spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub board: Board,
    pub score_delta: u64,
    pub moved: bool,
}

/// Immutable snapshot of a game: board, accumulated score, terminal flag
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub score: u64,
    pub terminal: bool,
}

impl GameState {
    /// Builds a snapshot, deriving the terminal flag from the board
    pub fn new(board: Board, score: u64) -> Self {
        GameState {
            board,
            score,
            terminal: board::is_terminal(&board),
        }
    }
}
