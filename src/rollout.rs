// Rollout policy used during the simulation phase
//
// Mixes a one-ply greedy step on the heuristic with uniform random play.

use rand::Rng;

use crate::board;
use crate::config::RolloutConfig;
use crate::evaluator::HeuristicEvaluator;
use crate::spawner::TileSpawner;
use crate::types::{Direction, GameState};

#[derive(Debug, Clone)]
pub struct RolloutPolicy {
    greedy_probability: f64,
}

impl RolloutPolicy {
    pub fn new(config: &RolloutConfig) -> Self {
        RolloutPolicy {
            greedy_probability: config.greedy_probability,
        }
    }

    /// Directions that change the board, in canonical order. Spawning is ignored.
    pub fn valid_directions(state: &GameState) -> Vec<Direction> {
        board::legal_directions(&state.board)
    }

    /// Picks one of `legal`, which must be non-empty.
    /// Greedy picks evaluate the post-spawn state of every legal direction and keep the
    /// first best in canonical order.
    pub fn select_move<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        legal: &[Direction],
        evaluator: &HeuristicEvaluator,
        spawner: &TileSpawner,
        rng: &mut R,
    ) -> Direction {
        assert!(!legal.is_empty(), "rollout asked to choose among no moves");

        if rng.random_bool(self.greedy_probability) {
            let mut best = legal[0];
            let mut best_score = f64::NEG_INFINITY;
            for &dir in legal {
                let next = spawner.advance(state, dir, rng);
                let score = evaluator.evaluate(&next);
                if score > best_score {
                    best_score = score;
                    best = dir;
                }
            }
            best
        } else {
            legal[rng.random_range(0..legal.len())]
        }
    }

    /// Plays from `state` until it is terminal, has no legal move, or `max_depth` plies
    /// elapse. Returns the heuristic value of the final state.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        max_depth: u32,
        evaluator: &HeuristicEvaluator,
        spawner: &TileSpawner,
        rng: &mut R,
    ) -> f64 {
        let mut current = *state;
        let mut depth = 0;

        while !current.terminal && depth < max_depth {
            let legal = Self::valid_directions(&current);
            if legal.is_empty() {
                break;
            }
            let dir = self.select_move(&current, &legal, evaluator, spawner, rng);
            current = spawner.advance(&current, dir, rng);
            depth += 1;
        }

        evaluator.evaluate(&current)
    }
}
