// Library exports for the 2048 MCTS player
// The autoplay and replay binaries and the integration tests build on these modules

pub mod board;
pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod evaluator;
pub mod game;
pub mod mcts;
pub mod replay;
pub mod rollout;
pub mod spawner;
pub mod tree;
pub mod types;

pub use mcts::MctsEngine;
pub use types::{Board, Direction, GameState};
