// Replay module for re-running the search on logged positions
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Re-run the search on each logged snapshot
// 3. Compare logged vs replayed moves
// 4. Report match rates and expected-move validation

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::Config;
use crate::mcts::MctsEngine;
use crate::types::{Board, Direction, GameState};

/// Represents a single log entry from the debug JSONL file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogEntry {
    pub move_number: u32,
    pub chosen_move: String,
    pub board: Board,
    pub score: u64,
    pub timestamp: String,
}

impl LogEntry {
    pub fn state(&self) -> GameState {
        GameState::new(self.board, self.score)
    }
}

/// Result of replaying a single move
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub move_number: u32,
    pub original_move: Direction,
    pub replayed_move: Option<Direction>,
    pub matches: bool,
    pub best_mean_reward: Option<f64>,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_moves: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    engine: MctsEngine,
    seed: Option<u64>,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    /// A seed makes every replayed search reproducible (seed + move number)
    pub fn new(config: Config, seed: Option<u64>, verbose: bool) -> Self {
        ReplayEngine {
            engine: MctsEngine::from_config(&config),
            seed,
            verbose,
        }
    }

    /// Loads all log entries from a JSONL file, ordered by move number
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        // Async writes may land out of order
        entries.sort_by_key(|e| e.move_number);

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying move {}...", entry.move_number);
        }

        let original_move: Direction = entry.chosen_move.parse()?;
        let state = entry.state();

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(u64::from(entry.move_number))),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let outcome = self.engine.search(&state, self.engine.budget(), &mut rng);

        let replayed_move = outcome.best_move;
        let matches = replayed_move == Some(original_move);
        let best_mean_reward = replayed_move.and_then(|dir| {
            outcome
                .children
                .iter()
                .find(|c| c.direction == dir)
                .map(|c| c.mean_reward)
        });

        let result = ReplayResult {
            move_number: entry.move_number,
            original_move,
            replayed_move,
            matches,
            best_mean_reward,
            computation_time_ms: outcome.elapsed_ms,
        };

        if self.verbose {
            let replayed = replayed_move.map_or("none", |d| d.as_str());
            if matches {
                info!(
                    "Move {}: ✓ MATCH - {} (time: {}ms)",
                    entry.move_number, replayed, outcome.elapsed_ms
                );
            } else {
                warn!(
                    "Move {}: ✗ MISMATCH - Original: {}, Replayed: {} (time: {}ms)",
                    entry.move_number,
                    original_move.as_str(),
                    replayed,
                    outcome.elapsed_ms
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries in a log file
    pub fn replay_all(&self, entries: &[LogEntry]) -> Vec<ReplayResult> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay move {}: {}", entry.move_number, e);
                }
            }
        }

        results
    }

    /// Replays specific moves from a log file
    pub fn replay_moves(
        &self,
        entries: &[LogEntry],
        move_numbers: &[u32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for move_num in move_numbers {
            let entry = entries
                .iter()
                .find(|e| e.move_number == *move_num)
                .ok_or_else(|| format!("Move {} not found in log file", move_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay move {}: {}", move_num, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_moves = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_moves - matches;
        let match_rate = if total_moves > 0 {
            (matches as f64 / total_moves as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_moves,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Moves:    {}", stats.total_moves);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results.iter().map(|r| r.computation_time_ms as f64).sum::<f64>()
                / results.len() as f64;
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Move {}: {} → {} (mean reward: {}, time: {}ms)",
                    result.move_number,
                    result.original_move.as_str(),
                    result.replayed_move.map_or("none", |d| d.as_str()),
                    result
                        .best_mean_reward
                        .map_or_else(|| "-".to_string(), |r| format!("{:.1}", r)),
                    result.computation_time_ms
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were made
    pub fn validate_expected_moves(
        &self,
        entries: &[LogEntry],
        expected_moves: &[(u32, Vec<Direction>)], // (move number, acceptable moves)
    ) -> Result<(), String> {
        for (move_num, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.move_number == *move_num)
                .ok_or_else(|| format!("Move {} not found in log", move_num))?;

            let actual_move: Direction = entry.chosen_move.parse()?;

            if !acceptable.contains(&actual_move) {
                return Err(format!(
                    "Move {}: Expected one of {:?}, but got {}",
                    move_num,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    actual_move.as_str()
                ));
            }
        }

        Ok(())
    }
}
