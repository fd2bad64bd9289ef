//! Autoplay and Replay Integration Tests
//!
//! Plays short games through the async bot, writes the decisions to a JSONL debug log, and
//! feeds that log back through the replay engine.

use mcts_2048::bot::Bot;
use mcts_2048::config::Config;
use mcts_2048::debug_logger::DebugLogger;
use mcts_2048::replay::ReplayEngine;
use mcts_2048::types::{Board, Direction, GameState};
use std::path::PathBuf;

fn small_config() -> Config {
    let mut config = Config::default_hardcoded();
    config.search.max_iterations = 25;
    config.search.max_simulation_depth = 4;
    config.autoplay.max_moves = 12;
    config
}

fn temp_log(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mcts_2048_{}_{}.jsonl", name, std::process::id()))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_move_returns_legal_direction() {
    let bot = Bot::new(small_config());
    let state = GameState::new(
        Board::new([[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
        0,
    );

    let chosen = bot.get_move(0, &state, Some(3)).await;
    assert!(chosen.is_some());
    // Unseeded searches draw from the thread-local generator
    assert!(bot.get_move(0, &state, None).await.is_some());

    let locked = GameState::new(
        Board::new([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]),
        0,
    );
    assert_eq!(bot.get_move(1, &locked, Some(3)).await, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_seeded_async_games_agree() {
    let bot = Bot::new(small_config());
    let a = bot
        .play_game_async(0, Some(11), DebugLogger::disabled())
        .await
        .unwrap();
    let b = bot
        .play_game_async(0, Some(11), DebugLogger::disabled())
        .await
        .unwrap();

    assert_eq!(a.final_board, b.final_board);
    assert_eq!(a.final_score, b.final_score);
    assert_eq!(a.seed, 11);
    assert!(a.moves <= 12);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_debug_log_round_trips_through_replay() {
    let path = temp_log("roundtrip");
    let path_str = path.to_string_lossy().to_string();

    let logger = DebugLogger::new(true, &path_str).await;
    assert!(logger.is_enabled());

    let bot = Bot::new(small_config());
    let summary = bot
        .play_game_async(0, Some(5), logger.clone())
        .await
        .unwrap();
    logger.flush().await;

    let mut replay_config = small_config();
    replay_config.search.max_iterations = 10;
    let replay = ReplayEngine::new(replay_config, Some(5), false);
    let entries = replay.load_log_file(&path).unwrap();

    assert_eq!(entries.len(), summary.moves);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.move_number as usize, i);
        assert!(entry.chosen_move.parse::<Direction>().is_ok());
    }

    let results = replay.replay_all(&entries);
    assert_eq!(results.len(), entries.len());
    // Every logged position had a move, so the replayed search finds one too
    assert!(results.iter().all(|r| r.replayed_move.is_some()));

    let stats = replay.generate_stats(&results);
    assert_eq!(stats.matches + stats.mismatches, stats.total_moves);

    let first = entries[0].chosen_move.parse::<Direction>().unwrap();
    assert!(replay
        .validate_expected_moves(&entries, &[(0, vec![first])])
        .is_ok());
    assert!(replay.replay_moves(&entries, &[0, 1]).is_ok());
    assert!(replay.replay_moves(&entries, &[999]).is_err());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_malformed_log_line_is_reported() {
    let path = temp_log("malformed");
    std::fs::write(&path, "{\"move_number\":0}\nnot json\n").unwrap();

    let replay = ReplayEngine::new(small_config(), None, false);
    let err = replay.load_log_file(&path).unwrap_err();
    assert!(err.contains("line 1"), "{}", err);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_missing_log_file_is_an_error() {
    let replay = ReplayEngine::new(small_config(), None, false);
    assert!(replay.load_log_file(temp_log("does_not_exist")).is_err());
}
