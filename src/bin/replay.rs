// Standalone replay tool for analyzing 2048 debug logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --all                  Replay all moves
//   --moves <m1,m2>        Replay specific moves (comma-separated)
//   --validate             Check logged moves against expectations
//   --session              Treat the file as an exported game session and re-walk it
//   --seed <n>             Seed the replayed searches
//   --verbose              Show detailed output for each move
//   --config <path>        Path to Mcts.toml (default: Mcts.toml)

use std::env;
use std::process;

use mcts_2048::config::Config;
use mcts_2048::game::GameSession;
use mcts_2048::replay::ReplayEngine;
use mcts_2048::types::Direction;

fn print_usage() {
    eprintln!("2048 Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --all                   Replay all moves in the log");
    eprintln!("  --moves <M1,M2,...>     Replay specific moves (comma-separated)");
    eprintln!("  --validate <M:D,...>    Validate expected moves (format: move:direction,...)");
    eprintln!("  --session               Check an exported game session move by move");
    eprintln!("  --seed <n>              Seed the replayed searches");
    eprintln!("  --verbose               Show detailed output for each move");
    eprintln!("  --config <path>         Path to Mcts.toml (default: Mcts.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  # Replay all moves");
    eprintln!("  replay mcts_2048_debug.jsonl --all");
    eprintln!();
    eprintln!("  # Replay specific moves with a fixed seed");
    eprintln!("  replay mcts_2048_debug.jsonl --moves 5,10,15 --seed 7");
    eprintln!();
    eprintln!("  # Validate expected moves");
    eprintln!("  replay mcts_2048_debug.jsonl --validate 5:up,10:left|down");
    eprintln!();
    eprintln!("  # Check an exported game");
    eprintln!("  replay mcts_2048_game.json --session");
}

fn parse_moves(s: &str) -> Result<Vec<u32>, String> {
    s.split(',')
        .map(|t| {
            t.trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid move number '{}': {}", t, e))
        })
        .collect()
}

fn parse_expected_moves(s: &str) -> Result<Vec<(u32, Vec<Direction>)>, String> {
    s.split(',')
        .map(|pair| {
            let parts: Vec<&str> = pair.trim().split(':').collect();
            if parts.len() != 2 {
                return Err(format!("Invalid format '{}'. Expected 'move:direction'", pair));
            }

            let move_number = parts[0]
                .parse::<u32>()
                .map_err(|e| format!("Invalid move number '{}': {}", parts[0], e))?;

            // Support multiple acceptable moves separated by '|'
            let moves: Result<Vec<Direction>, String> =
                parts[1].split('|').map(|m| m.parse::<Direction>()).collect();

            Ok((move_number, moves?))
        })
        .collect()
}

enum Mode {
    All,
    Moves(String),
    Validate(String),
    Session,
}

fn require_arg(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i + 1) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires an argument", flag);
            process::exit(1);
        }
    }
}

fn replay_session(path: &str) {
    let session = match GameSession::import(path) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error loading game session: {}", e);
            process::exit(1);
        }
    };

    println!("Game started:   {}", session.start_time);
    println!("Moves:          {}", session.moves.len());
    println!("Final score:    {}", session.final_score);
    println!("Max tile:       {}", session.max_tile);

    match session.replay() {
        Ok(state) => {
            println!("\n{}\n", state.board);
            println!("✓ All {} moves replayed consistently", session.moves.len());
        }
        Err(e) => {
            eprintln!("✗ Session replay failed: {}", e);
            process::exit(1);
        }
    }
}

fn main() {
    // Per-move replay lines are logged at info, so default to it unless `RUST_LOG` is set.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) {
            0
        } else {
            1
        });
    }

    let log_file = &args[1];
    let mut config_path = "Mcts.toml".to_string();
    let mut verbose = false;
    let mut seed = None;
    let mut mode = None;

    // Parse arguments
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--all" => {
                mode = Some(Mode::All);
            }
            "--moves" => {
                mode = Some(Mode::Moves(require_arg(&args, i, "--moves")));
                i += 1;
            }
            "--validate" => {
                mode = Some(Mode::Validate(require_arg(&args, i, "--validate")));
                i += 1;
            }
            "--session" => {
                mode = Some(Mode::Session);
            }
            "--seed" => {
                let raw = require_arg(&args, i, "--seed");
                seed = match raw.parse::<u64>() {
                    Ok(s) => Some(s),
                    Err(e) => {
                        eprintln!("Error: Invalid seed '{}': {}", raw, e);
                        process::exit(1);
                    }
                };
                i += 1;
            }
            "--config" => {
                config_path = require_arg(&args, i, "--config");
                i += 1;
            }
            "--verbose" => {
                verbose = true;
            }
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mode = match mode {
        Some(mode) => mode,
        None => {
            eprintln!("Error: Must specify --all, --moves, --validate, or --session");
            print_usage();
            process::exit(1);
        }
    };

    if let Mode::Session = mode {
        replay_session(log_file);
        return;
    }

    // Load configuration
    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", config_path);
    println!("Replay log file: {}", log_file);
    println!();

    // Create replay engine
    let engine = ReplayEngine::new(config, seed, verbose);

    // Load log file
    let entries = match engine.load_log_file(log_file) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error loading log file: {}", e);
            process::exit(1);
        }
    };

    if entries.is_empty() {
        eprintln!("Error: Log file is empty");
        process::exit(1);
    }

    println!("Loaded {} log entries\n", entries.len());

    // Execute based on mode
    match mode {
        Mode::All => {
            println!("Replaying all {} moves...\n", entries.len());
            let results = engine.replay_all(&entries);
            engine.print_report(&results);
        }
        Mode::Moves(arg) => {
            let moves = match parse_moves(&arg) {
                Ok(m) => m,
                Err(e) => {
                    eprintln!("Error parsing moves: {}", e);
                    process::exit(1);
                }
            };

            println!("Replaying {} specific move(s)...\n", moves.len());
            match engine.replay_moves(&entries, &moves) {
                Ok(results) => {
                    engine.print_report(&results);
                }
                Err(e) => {
                    eprintln!("Error during replay: {}", e);
                    process::exit(1);
                }
            }
        }
        Mode::Validate(arg) => {
            let expected_moves = match parse_expected_moves(&arg) {
                Ok(m) => m,
                Err(e) => {
                    eprintln!("Error parsing expected moves: {}", e);
                    process::exit(1);
                }
            };

            println!("Validating {} expected move(s)...\n", expected_moves.len());
            match engine.validate_expected_moves(&entries, &expected_moves) {
                Ok(()) => {
                    println!("✓ All expected moves validated successfully!");
                }
                Err(e) => {
                    eprintln!("✗ Validation failed: {}", e);
                    process::exit(1);
                }
            }
        }
        // Sessions are checked before any log is loaded
        Mode::Session => {}
    }
}
