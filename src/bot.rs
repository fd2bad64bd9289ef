// Autoplay bot
//
// Owns the configuration and the search engine, turns each game snapshot into a move, and
// drives whole games: one at a time for interactive runs, or a batch of independent games
// spread over the rayon pool.

use log::{debug, info, log, Level};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::game::{Game, GameSession};
use crate::mcts::{MctsEngine, SearchOutcome};
use crate::spawner::TileSpawner;
use crate::types::{Board, Direction, GameState};

/// Final statistics of one game
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub game_index: usize,
    pub seed: u64,
    pub final_score: u64,
    pub max_tile: u32,
    pub moves: usize,
    pub reached_2048: bool,
    /// False when the game stopped at the move limit
    pub game_over: bool,
    pub elapsed_ms: u128,
    pub final_board: Board,
    /// Full move history, for export
    pub session: GameSession,
}

/// Aggregate of a batch of games
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub games: Vec<GameSummary>,
    pub mean_score: f64,
    pub max_score: u64,
    pub win_rate: f64,
    /// Number of games that ended with each max tile
    pub max_tile_counts: BTreeMap<u32, usize>,
    pub elapsed_ms: u128,
}

impl BatchReport {
    fn from_games(mut games: Vec<GameSummary>, elapsed_ms: u128) -> Self {
        games.sort_by_key(|g| g.game_index);

        let count = games.len().max(1) as f64;
        let mean_score = games.iter().map(|g| g.final_score as f64).sum::<f64>() / count;
        let max_score = games.iter().map(|g| g.final_score).max().unwrap_or(0);
        let win_rate = games.iter().filter(|g| g.reached_2048).count() as f64 / count;

        let mut max_tile_counts = BTreeMap::new();
        for g in &games {
            *max_tile_counts.entry(g.max_tile).or_insert(0) += 1;
        }

        BatchReport {
            games,
            mean_score,
            max_score,
            win_rate,
            max_tile_counts,
            elapsed_ms,
        }
    }
}

/// 2048 autoplay bot
#[derive(Debug, Clone)]
pub struct Bot {
    config: Config,
    engine: MctsEngine,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        let engine = MctsEngine::from_config(&config);
        Bot { config, engine }
    }

    /// Returns the bot's search parameters
    pub fn info(&self) -> Value {
        json!({
            "engine": "mcts",
            "max_iterations": self.config.search.max_iterations,
            "max_simulation_depth": self.config.search.max_simulation_depth,
            "exploration_constant": self.config.search.exploration_constant,
            "greedy_probability": self.config.rollout.greedy_probability,
        })
    }

    /// Searches `state` and logs the decision at `level`
    pub fn decide<R: Rng + ?Sized>(
        &self,
        move_number: u32,
        state: &GameState,
        rng: &mut R,
        level: Level,
    ) -> SearchOutcome {
        let outcome = self.engine.search(state, self.engine.budget(), rng);

        match outcome.best_move {
            Some(dir) => log!(
                level,
                "Move {}: Chose {} (score: {}, nodes: {}, time: {}ms)",
                move_number,
                dir.as_str(),
                state.score,
                outcome.nodes,
                outcome.elapsed_ms
            ),
            None => log!(level, "Move {}: No move available (score: {})", move_number, state.score),
        }

        outcome
    }

    /// Computes the next move for a snapshot on the blocking pool
    ///
    /// # Arguments
    /// * `move_number` - Number of moves already played, for logging
    /// * `state` - Snapshot of the game; copied, never retained
    /// * `seed` - Seed for a reproducible search, thread-local randomness otherwise
    ///
    /// # Returns
    /// * `Option<Direction>` - The chosen direction, or `None` when no move exists
    pub async fn get_move(&self, move_number: u32, state: &GameState, seed: Option<u64>) -> Option<Direction> {
        let bot = self.clone();
        let state = *state;

        let handle = tokio::task::spawn_blocking(move || {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_rng(&mut rand::rng()),
            };
            bot.decide(move_number, &state, &mut rng, Level::Info).best_move
        });

        match handle.await {
            Ok(chosen) => chosen,
            Err(e) => {
                log::error!("Search task failed: {}", e);
                None
            }
        }
    }

    /// Plays one game to the end (or the configured move limit)
    pub fn play_game<R: Rng + ?Sized>(
        &self,
        game_index: usize,
        seed: u64,
        rng: &mut R,
        logger: &DebugLogger,
        level: Level,
    ) -> GameSummary {
        let start = Instant::now();
        let max_moves = self.config.autoplay.max_moves;
        let mut game = Game::new(TileSpawner::new(&self.config.spawn), rng);

        log!(level, "Game {}: start\n{}", game_index, game.board());

        loop {
            let move_number = game.move_count() as u32;
            if max_moves > 0 && move_number >= max_moves {
                info!("Game {}: stopping at move limit ({})", game_index, max_moves);
                break;
            }

            let state = game.state();
            let chosen = match self.decide(move_number, &state, rng, level).best_move {
                Some(dir) => dir,
                None => break,
            };

            logger.log_move(move_number, state.board, state.score, chosen);

            // The engine only returns directions that change the board
            let accepted = game.play(chosen, rng);
            assert!(accepted, "engine returned an illegal move {}", chosen);
        }

        let summary = GameSummary {
            game_index,
            seed,
            final_score: game.score(),
            max_tile: game.max_tile(),
            moves: game.move_count(),
            reached_2048: game.has_won(),
            game_over: game.is_over(),
            elapsed_ms: start.elapsed().as_millis(),
            final_board: *game.board(),
            session: game.session(),
        };

        info!(
            "Game {}: over (score: {}, max tile: {}, moves: {}, time: {}ms)",
            game_index, summary.final_score, summary.max_tile, summary.moves, summary.elapsed_ms
        );
        debug!("Game {}: final board\n{}", game_index, summary.final_board);

        summary
    }

    /// Plays one game on the blocking pool, logging each decision at info level
    pub async fn play_game_async(
        &self,
        game_index: usize,
        seed: Option<u64>,
        logger: DebugLogger,
    ) -> Result<GameSummary, String> {
        let bot = self.clone();
        let seed = seed.unwrap_or_else(rand::random);

        let summary = tokio::task::spawn_blocking(move || {
            let mut rng = StdRng::seed_from_u64(seed);
            bot.play_game(game_index, seed, &mut rng, &logger, Level::Info)
        })
        .await
        .map_err(|e| format!("Game task failed: {}", e))?;

        Ok(summary)
    }

    /// Plays `count` independent games. Game `i` is seeded with `seed + i` when a seed is
    /// given. Runs on the rayon pool when `autoplay.parallel` is set.
    pub fn play_batch(&self, count: usize, seed: Option<u64>, logger: &DebugLogger) -> BatchReport {
        let start = Instant::now();
        let base_seed = seed.unwrap_or_else(rand::random);
        let results: Mutex<Vec<GameSummary>> = Mutex::new(Vec::with_capacity(count));

        let run_one = |index: usize| {
            let game_seed = base_seed.wrapping_add(index as u64);
            let mut rng = StdRng::seed_from_u64(game_seed);
            let summary = self.play_game(index, game_seed, &mut rng, logger, Level::Debug);
            results.lock().push(summary);
        };

        if self.config.autoplay.parallel {
            info!(
                "Playing {} games on {} threads",
                count,
                rayon::current_num_threads()
            );
            (0..count).into_par_iter().for_each(run_one);
        } else {
            info!("Playing {} games sequentially", count);
            (0..count).for_each(run_one);
        }

        BatchReport::from_games(results.into_inner(), start.elapsed().as_millis())
    }
}
