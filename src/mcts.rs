//! Monte Carlo Tree Search engine.
//!
//! Each call to `get_best_move` builds a fresh tree for the given snapshot and runs a fixed
//! number of selection / expansion / simulation / backpropagation iterations. The move
//! returned is the root child with the highest mean reward.

use log::debug;
use rand::Rng;
use std::time::Instant;

use crate::config::{Config, SearchConfig};
use crate::evaluator::HeuristicEvaluator;
use crate::rollout::RolloutPolicy;
use crate::spawner::TileSpawner;
use crate::tree::SearchTree;
use crate::types::{Direction, GameState};

/// Fixed compute budget of one search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudget {
    pub iterations: u32,
    pub simulation_depth: u32,
}

/// Visit statistics of one root child
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildStats {
    pub direction: Direction,
    pub visits: u32,
    pub mean_reward: f64,
}

/// Result of a search with the statistics behind the decision
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub best_move: Option<Direction>,
    pub iterations: u32,
    pub nodes: usize,
    pub root_visits: u32,
    pub children: Vec<ChildStats>,
    pub elapsed_ms: u128,
}

impl SearchOutcome {
    fn no_move(start: Instant) -> Self {
        SearchOutcome {
            best_move: None,
            iterations: 0,
            nodes: 0,
            root_visits: 0,
            children: Vec::new(),
            elapsed_ms: start.elapsed().as_millis(),
        }
    }
}

/// Single-threaded MCTS player. Holds no per-search state, so one engine may serve any
/// number of sequential calls; concurrent searches need one engine each.
#[derive(Debug, Clone)]
pub struct MctsEngine {
    search: SearchConfig,
    evaluator: HeuristicEvaluator,
    rollout: RolloutPolicy,
    spawner: TileSpawner,
}

impl MctsEngine {
    /// Engine with every component taken from `config`
    pub fn from_config(config: &Config) -> Self {
        MctsEngine {
            search: config.search.clone(),
            evaluator: HeuristicEvaluator::new(config.heuristic.clone()),
            rollout: RolloutPolicy::new(&config.rollout),
            spawner: TileSpawner::new(&config.spawn),
        }
    }

    /// Default engine with the given budget
    pub fn new(max_iterations: u32, max_simulation_depth: u32) -> Self {
        let mut config = Config::default_hardcoded();
        config.search.max_iterations = max_iterations;
        config.search.max_simulation_depth = max_simulation_depth;
        Self::from_config(&config)
    }

    pub fn budget(&self) -> SearchBudget {
        SearchBudget {
            iterations: self.search.max_iterations,
            simulation_depth: self.search.max_simulation_depth,
        }
    }

    /// Best direction for `state` using the thread-local RNG, or `None` when no move exists
    pub fn get_best_move(&self, state: &GameState) -> Option<Direction> {
        self.get_best_move_with(state, None, None)
    }

    /// Like `get_best_move`, with optional per-call overrides of the budget
    pub fn get_best_move_with(
        &self,
        state: &GameState,
        iterations: Option<u32>,
        simulation_depth: Option<u32>,
    ) -> Option<Direction> {
        let default = self.budget();
        let budget = SearchBudget {
            iterations: iterations.unwrap_or(default.iterations),
            simulation_depth: simulation_depth.unwrap_or(default.simulation_depth),
        };
        self.search(state, budget, &mut rand::rng()).best_move
    }

    /// Runs one full search drawing all randomness from `rng`
    pub fn search<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        budget: SearchBudget,
        rng: &mut R,
    ) -> SearchOutcome {
        let start = Instant::now();

        if state.terminal {
            return SearchOutcome::no_move(start);
        }
        let legal = RolloutPolicy::valid_directions(state);
        if legal.is_empty() {
            return SearchOutcome::no_move(start);
        }

        let mut tree = SearchTree::new(*state);
        let exploration = self.search.exploration_constant;

        for _ in 0..budget.iterations {
            // Selection
            let selected = tree.select(exploration);

            // Expansion
            let leaf = match tree.take_untried(selected) {
                Some(dir) => {
                    let parent_state = tree.node(selected).state;
                    let child_state = self.spawner.advance(&parent_state, dir, rng);
                    tree.add_child(selected, dir, child_state)
                }
                None => selected,
            };

            // Simulation
            let leaf_state = tree.node(leaf).state;
            let reward = self.rollout.simulate(
                &leaf_state,
                budget.simulation_depth,
                &self.evaluator,
                &self.spawner,
                rng,
            );

            // Backpropagation
            tree.backpropagate(leaf, reward);
        }

        let root = tree.root();
        let best_move = tree
            .best_child(root, 0.0)
            .map(|(dir, _)| dir)
            .or_else(|| legal.first().copied());

        let children: Vec<ChildStats> = tree
            .node(root)
            .children()
            .map(|(direction, id)| {
                let node = tree.node(id);
                ChildStats {
                    direction,
                    visits: node.visits,
                    mean_reward: node.mean_reward(),
                }
            })
            .collect();

        let outcome = SearchOutcome {
            best_move,
            iterations: budget.iterations,
            nodes: tree.len(),
            root_visits: tree.node(root).visits,
            children,
            elapsed_ms: start.elapsed().as_millis(),
        };

        debug!(
            "Search: {} iterations, {} nodes, {}ms, best {:?}",
            outcome.iterations, outcome.nodes, outcome.elapsed_ms, outcome.best_move
        );
        for child in &outcome.children {
            debug!(
                "  {:<5} visits={:<6} mean={:.2}",
                child.direction.as_str(),
                child.visits,
                child.mean_reward
            );
        }

        outcome
    }
}

impl Default for MctsEngine {
    fn default() -> Self {
        Self::from_config(&Config::default_hardcoded())
    }
}
