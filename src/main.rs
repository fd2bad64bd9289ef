// Autoplay tool: lets the MCTS player play 2048 on its own
//
// Usage:
//   cargo run --release -- [options]
//
// Options:
//   --games <n>        Number of games (default: autoplay.games)
//   --seed <n>         Seed for reproducible games
//   --max-moves <n>    Stop each game after n moves (0 = play to the end)
//   --iterations <n>   Search iterations per move
//   --depth <n>        Rollout depth limit
//   --sequential       Play batches one game at a time
//   --debug-log <path> Write every decision to a JSONL file (single game only)
//   --export <path>    Write the game's move history as JSON (single game only)
//   --config <path>    Path to Mcts.toml (default: Mcts.toml)

use log::{info, warn};
use std::env;
use std::process;

use mcts_2048::bot::{BatchReport, Bot, GameSummary};
use mcts_2048::config::Config;
use mcts_2048::debug_logger::DebugLogger;

fn print_usage() {
    eprintln!("2048 MCTS Autoplay");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  mcts-2048 [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --games <n>          Number of games to play");
    eprintln!("  --seed <n>           Seed for reproducible games");
    eprintln!("  --max-moves <n>      Stop each game after n moves (0 = unlimited)");
    eprintln!("  --iterations <n>     Search iterations per move");
    eprintln!("  --depth <n>          Rollout depth limit");
    eprintln!("  --sequential         Play batches one game at a time");
    eprintln!("  --debug-log <path>   Log every decision to a JSONL file");
    eprintln!("  --export <path>      Save the game's move history as JSON");
    eprintln!("  --config <path>      Path to Mcts.toml (default: Mcts.toml)");
    eprintln!("  --help               Show this help message");
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    let raw = value.ok_or_else(|| format!("{} requires an argument", flag))?;
    raw.parse::<T>()
        .map_err(|e| format!("Invalid value '{}' for {}: {}", raw, flag, e))
}

/// Applies command-line overrides on top of the loaded configuration
fn parse_args(args: &[String]) -> Result<Config, String> {
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .map(|i| parse_value::<String>("--config", args.get(i + 1)))
        .transpose()?;

    let mut config = match config_path {
        Some(path) => Config::from_file(&path)?,
        None => Config::load_or_default(),
    };

    let mut i = 1;
    while i < args.len() {
        let next = args.get(i + 1);
        match args[i].as_str() {
            "--games" => {
                config.autoplay.games = parse_value("--games", next)?;
                i += 1;
            }
            "--seed" => {
                config.autoplay.seed = Some(parse_value("--seed", next)?);
                i += 1;
            }
            "--max-moves" => {
                config.autoplay.max_moves = parse_value("--max-moves", next)?;
                i += 1;
            }
            "--iterations" => {
                config.search.max_iterations = parse_value("--iterations", next)?;
                i += 1;
            }
            "--depth" => {
                config.search.max_simulation_depth = parse_value("--depth", next)?;
                i += 1;
            }
            "--sequential" => {
                config.autoplay.parallel = false;
            }
            "--debug-log" => {
                config.debug.enabled = true;
                config.debug.log_file_path = parse_value("--debug-log", next)?;
                i += 1;
            }
            "--export" => {
                config.autoplay.export_path = Some(parse_value("--export", next)?);
                i += 1;
            }
            "--config" => {
                i += 1;
            }
            other => return Err(format!("Unknown option '{}'", other)),
        }
        i += 1;
    }

    config.validate()?;
    Ok(config)
}

fn print_game(summary: &GameSummary) {
    println!("\n{}\n", summary.final_board);
    println!("Score:     {}", summary.final_score);
    println!("Max tile:  {}", summary.max_tile);
    println!("Moves:     {}", summary.moves);
    println!("Seed:      {}", summary.seed);
    println!("Time:      {}ms", summary.elapsed_ms);
}

fn print_batch(report: &BatchReport) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("                    AUTOPLAY REPORT");
    println!("═══════════════════════════════════════════════════════════");
    println!("Games:          {}", report.games.len());
    println!("Mean score:     {:.1}", report.mean_score);
    println!("Best score:     {}", report.max_score);
    println!("2048 rate:      {:.1}%", report.win_rate * 100.0);
    println!("Total time:     {}ms", report.elapsed_ms);
    println!("═══════════════════════════════════════════════════════════");
    println!("Max tile distribution:");
    for (tile, count) in report.max_tile_counts.iter().rev() {
        println!("  {:>6}: {}", tile, count);
    }
    println!();
}

#[tokio::main]
async fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help") {
        print_usage();
        process::exit(0);
    }

    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    let games = config.autoplay.games;
    let seed = config.autoplay.seed;
    let export_path = config.autoplay.export_path.clone();
    let logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;

    let bot = Bot::new(config);
    info!("Starting 2048 autoplay: {}", bot.info());

    if games <= 1 {
        match bot.play_game_async(0, seed, logger.clone()).await {
            Ok(summary) => {
                print_game(&summary);
                if let Some(path) = &export_path {
                    match summary.session.export(path) {
                        Ok(()) => info!("Exported game session to {}", path),
                        Err(e) => {
                            eprintln!("Error: {}", e);
                            process::exit(1);
                        }
                    }
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    } else {
        if logger.is_enabled() {
            warn!("Debug log is only written for single games; ignoring it for {} games", games);
        }
        if export_path.is_some() {
            warn!("Sessions are only exported for single games; ignoring --export for {} games", games);
        }
        let batch_bot = bot.clone();
        let report = tokio::task::spawn_blocking(move || {
            batch_bot.play_batch(games, seed, &DebugLogger::disabled())
        })
        .await;

        match report {
            Ok(report) => print_batch(&report),
            Err(e) => {
                eprintln!("Error: batch failed: {}", e);
                process::exit(1);
            }
        }
    }

    logger.flush().await;
}
