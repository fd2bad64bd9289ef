// Game session: the board the player acts on, its score and the history of accepted moves.
// A finished session can be exported to JSON, imported again and re-walked move by move.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::board;
use crate::spawner::TileSpawner;
use crate::types::{Board, Direction, GameState, WINNING_TILE};

/// One accepted move
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GameMove {
    pub direction: Direction,
    pub board_before: Board,
    pub board_after: Board,
    pub score_gained: u64,
    pub timestamp: String,
}

/// Exported record of one game
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GameSession {
    pub start_time: String,
    pub start_board: Board,
    pub start_score: u64,
    pub moves: Vec<GameMove>,
    pub final_score: u64,
    pub max_tile: u32,
}

impl GameSession {
    /// Writes the session as pretty-printed JSON
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize game session: {}", e))?;
        fs::write(path.as_ref(), json).map_err(|e| format!("Failed to write game session: {}", e))
    }

    /// Reads a session written by `export`
    pub fn import<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read game session: {}", e))?;
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse game session: {}", e))
    }

    /// Re-walks the history from the start board, checking every move against the board
    /// engine: each slide must change the board and score what was recorded, and the board
    /// after it may differ from the slid board only by one spawned 2 or 4.
    /// Returns the final state.
    pub fn replay(&self) -> Result<GameState, String> {
        let mut current = self.start_board;
        let mut score = self.start_score;

        for (i, mv) in self.moves.iter().enumerate() {
            if mv.board_before != current {
                return Err(format!("Move {}: board does not continue from the previous move", i));
            }

            let outcome = board::apply_direction(&current, mv.direction);
            if !outcome.moved {
                return Err(format!("Move {}: {} does not change the board", i, mv.direction));
            }
            if outcome.score_delta != mv.score_gained {
                return Err(format!(
                    "Move {}: recorded {} points, sliding {} scores {}",
                    i, mv.score_gained, mv.direction, outcome.score_delta
                ));
            }
            if !is_single_spawn(&outcome.board, &mv.board_after) {
                return Err(format!("Move {}: board after is not the slid board plus one tile", i));
            }

            current = mv.board_after;
            score += mv.score_gained;
        }

        if score != self.final_score {
            return Err(format!(
                "Final score {} does not match the replayed score {}",
                self.final_score, score
            ));
        }

        Ok(GameState::new(current, score))
    }
}

fn is_single_spawn(slid: &Board, after: &Board) -> bool {
    let mut spawned = 0;
    for (a, b) in slid.cells.iter().flatten().zip(after.cells.iter().flatten()) {
        if a == b {
            continue;
        }
        if *a != 0 || !(*b == 2 || *b == 4) {
            return false;
        }
        spawned += 1;
    }
    // A full slid board leaves no room for a spawn
    spawned == 1 || (spawned == 0 && slid.count_empty() == 0)
}

/// A running game. Moves that leave the board unchanged are rejected.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    score: u64,
    start_board: Board,
    start_score: u64,
    start_time: String,
    moves: Vec<GameMove>,
    spawner: TileSpawner,
}

impl Game {
    /// Starts a game on an empty board with two spawned tiles
    pub fn new<R: Rng + ?Sized>(spawner: TileSpawner, rng: &mut R) -> Self {
        let board = spawner.spawn(&Board::EMPTY, rng);
        let board = spawner.spawn(&board, rng);
        Self::from_board(board, 0, spawner)
    }

    /// Resumes from a known position
    pub fn from_board(board: Board, score: u64, spawner: TileSpawner) -> Self {
        Game {
            board,
            score,
            start_board: board,
            start_score: score,
            start_time: chrono::Utc::now().to_rfc3339(),
            moves: Vec::new(),
            spawner,
        }
    }

    /// Snapshot of the game so far, for export
    pub fn session(&self) -> GameSession {
        GameSession {
            start_time: self.start_time.clone(),
            start_board: self.start_board,
            start_score: self.start_score,
            moves: self.moves.clone(),
            final_score: self.score,
            max_tile: self.max_tile(),
        }
    }

    /// Snapshot handed to the search
    pub fn state(&self) -> GameState {
        GameState::new(self.board, self.score)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn max_tile(&self) -> u32 {
        self.board.max_tile()
    }

    pub fn is_over(&self) -> bool {
        board::is_terminal(&self.board)
    }

    pub fn has_won(&self) -> bool {
        self.max_tile() >= WINNING_TILE
    }

    /// Applies `dir`; returns false (and records nothing) when the board would not change
    pub fn play<R: Rng + ?Sized>(&mut self, dir: Direction, rng: &mut R) -> bool {
        if self.is_over() {
            return false;
        }

        let outcome = board::apply_direction(&self.board, dir);
        if !outcome.moved {
            return false;
        }

        let board_after = self.spawner.spawn(&outcome.board, rng);
        self.moves.push(GameMove {
            direction: dir,
            board_before: self.board,
            board_after,
            score_gained: outcome.score_delta,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
        self.board = board_after;
        self.score += outcome.score_delta;
        true
    }
}
