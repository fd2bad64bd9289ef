// Configuration module for reading Mcts.toml
// Every tunable of the search, the rollout policy, the heuristic and the autoplay driver lives here

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub search: SearchConfig,
    pub rollout: RolloutConfig,
    pub spawn: SpawnConfig,
    pub heuristic: HeuristicConfig,
    pub autoplay: AutoplayConfig,
    pub debug: DebugConfig,
}

/// Search budget and tree policy
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SearchConfig {
    pub max_iterations: u32,
    pub max_simulation_depth: u32,
    /// UCB1 exploration weight
    pub exploration_constant: f64,
}

/// Rollout policy mixing
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RolloutConfig {
    /// Probability of a one-ply greedy step; otherwise uniform random
    pub greedy_probability: f64,
}

/// Random tile spawning
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SpawnConfig {
    /// Probability that a spawned tile is a 2 (else a 4)
    pub two_probability: f64,
}

/// Weights of the board evaluation function
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HeuristicConfig {
    // Free space
    pub empty_cell_weight: f64,

    // Monotonic rows/columns
    pub monotonic_line_bonus: f64,
    pub monotonic_pair_weight: f64,
    pub monotonic_pair_max_ratio: f64,

    // Corner strategy
    pub corner_max_weight: f64,
    pub corner_top_weight: f64,
    pub corner_top_count: usize,

    pub center_penalty_weight: f64,
    pub merge_weight: f64,

    // Snake path
    pub structure_weight: f64,
}

/// Autoplay driver settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AutoplayConfig {
    pub games: usize,
    /// 0 means play until the game is over
    pub max_moves: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Run batches on the rayon pool
    pub parallel: bool,
    /// Write the move history of a single game here as JSON
    #[serde(default)]
    pub export_path: Option<String>,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Mcts.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let config: Config =
            toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Mcts.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Mcts.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Mcts.toml
    pub fn default_hardcoded() -> Self {
        Config {
            search: SearchConfig {
                max_iterations: 1000,
                max_simulation_depth: 100,
                exploration_constant: std::f64::consts::SQRT_2,
            },
            rollout: RolloutConfig {
                greedy_probability: 0.7,
            },
            spawn: SpawnConfig {
                two_probability: 0.9,
            },
            heuristic: HeuristicConfig {
                empty_cell_weight: 15.0,
                monotonic_line_bonus: 60.0,
                monotonic_pair_weight: 0.1,
                monotonic_pair_max_ratio: 2.0,
                corner_max_weight: 0.5,
                corner_top_weight: 0.1,
                corner_top_count: 4,
                center_penalty_weight: 0.2,
                merge_weight: 0.3,
                structure_weight: 0.2,
            },
            autoplay: AutoplayConfig {
                games: 1,
                max_moves: 0,
                seed: None,
                parallel: true,
                export_path: None,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "mcts_2048_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Mcts.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    /// Rejects values the search cannot run with
    pub fn validate(&self) -> Result<(), String> {
        let probabilities = [
            ("rollout.greedy_probability", self.rollout.greedy_probability),
            ("spawn.two_probability", self.spawn.two_probability),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{} must be within [0, 1], got {}", name, p));
            }
        }
        if !self.search.exploration_constant.is_finite() || self.search.exploration_constant < 0.0 {
            return Err(format!(
                "search.exploration_constant must be finite and non-negative, got {}",
                self.search.exploration_constant
            ));
        }
        if self.heuristic.monotonic_pair_max_ratio < 1.0 {
            return Err(format!(
                "heuristic.monotonic_pair_max_ratio must be at least 1, got {}",
                self.heuristic.monotonic_pair_max_ratio
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_hardcoded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_parameters() {
        let config = Config::default_hardcoded();
        assert_eq!(config.search.max_iterations, 1000);
        assert_eq!(config.search.max_simulation_depth, 100);
        assert!((config.search.exploration_constant - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(config.rollout.greedy_probability, 0.7);
        assert_eq!(config.spawn.two_probability, 0.9);
        assert_eq!(config.heuristic.empty_cell_weight, 15.0);
        assert_eq!(config.heuristic.corner_top_count, 4);
    }

    #[test]
    fn test_mcts_toml_can_be_parsed() {
        // This test ensures Mcts.toml is valid and can be parsed
        let result = Config::from_file("Mcts.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Mcts.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Mcts.toml").expect("Mcts.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        assert_eq!(file_config.search.max_iterations, hardcoded_config.search.max_iterations);
        assert_eq!(
            file_config.search.max_simulation_depth,
            hardcoded_config.search.max_simulation_depth
        );
        assert!(
            (file_config.search.exploration_constant - hardcoded_config.search.exploration_constant)
                .abs()
                < 1e-9
        );
        assert_eq!(file_config.rollout, hardcoded_config.rollout);
        assert_eq!(file_config.spawn, hardcoded_config.spawn);
        assert_eq!(file_config.heuristic, hardcoded_config.heuristic);
        assert_eq!(file_config.autoplay, hardcoded_config.autoplay);
        assert_eq!(file_config.debug, hardcoded_config.debug);
    }

    #[test]
    fn test_out_of_range_probability_is_rejected() {
        let mut config = Config::default_hardcoded();
        config.spawn.two_probability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        // Test with a non-existent file
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());

        let result = Config::from_toml_str("[search]\nmax_iterations = \"many\"\n");
        assert!(result.is_err());
    }
}
