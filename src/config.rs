// Configuration module for reading Agent.toml
// This module provides the tunable parameters of the decision engine and its transports

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub agent: AgentConfig,
    pub validator: ValidatorConfig,
    pub edge_guard: EdgeGuardConfig,
    pub trail: TrailConfig,
    pub fallback: FallbackConfig,
    #[serde(default)]
    pub rng: RngConfig,
    pub debug: DebugConfig,
}

/// Agent identity
#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    /// Name used to locate ourselves when none is given on the command line
    pub default_name: String,
}

/// Move validator constants
#[derive(Debug, Deserialize, Clone)]
pub struct ValidatorConfig {
    /// Cells within this distance of any border are rejected as risky
    pub edge_margin: i32,
}

/// Edge guard constants
#[derive(Debug, Deserialize, Clone)]
pub struct EdgeGuardConfig {
    pub enabled: bool,
    /// Distance from a border at which inward movement is forced
    pub border_margin: i32,
}

/// Trail memory constants
#[derive(Debug, Deserialize, Clone)]
pub struct TrailConfig {
    /// When false the trail is still recorded but never vetoes a move
    pub enabled: bool,
    pub capacity: usize,
}

/// Fallback selector constants
#[derive(Debug, Deserialize, Clone)]
pub struct FallbackConfig {
    /// Shuffle the scan order with the engine's RNG instead of north, east, south, west
    pub shuffle: bool,
}

/// Random source configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RngConfig {
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Agent.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Agent.toml in the working directory
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Agent.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Agent.toml
    pub fn default_hardcoded() -> Self {
        Config {
            agent: AgentConfig {
                default_name: "spiral".to_string(),
            },
            validator: ValidatorConfig { edge_margin: 2 },
            edge_guard: EdgeGuardConfig {
                enabled: true,
                border_margin: 2,
            },
            trail: TrailConfig {
                enabled: true,
                capacity: 200,
            },
            fallback: FallbackConfig { shuffle: false },
            rng: RngConfig { seed: None },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "spiral_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Agent.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.validator.edge_margin < 0 {
            return Err(format!(
                "validator.edge_margin must be non-negative, got {}",
                self.validator.edge_margin
            ));
        }
        if self.edge_guard.border_margin < 0 {
            return Err(format!(
                "edge_guard.border_margin must be non-negative, got {}",
                self.edge_guard.border_margin
            ));
        }
        if self.trail.capacity == 0 {
            return Err("trail.capacity must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.validator.edge_margin, 2);
        assert_eq!(config.edge_guard.border_margin, 2);
        assert_eq!(config.trail.capacity, 200);
        assert!(config.trail.enabled);
        assert!(!config.fallback.shuffle);
    }

    #[test]
    fn test_agent_toml_can_be_parsed() {
        let result = Config::from_file("Agent.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Agent.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Agent.toml").expect("Agent.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        assert_eq!(
            file_config.agent.default_name,
            hardcoded_config.agent.default_name
        );
        assert_eq!(
            file_config.validator.edge_margin,
            hardcoded_config.validator.edge_margin
        );
        assert_eq!(
            file_config.edge_guard.border_margin,
            hardcoded_config.edge_guard.border_margin
        );
        assert_eq!(
            file_config.edge_guard.enabled,
            hardcoded_config.edge_guard.enabled
        );
        assert_eq!(file_config.trail.enabled, hardcoded_config.trail.enabled);
        assert_eq!(file_config.trail.capacity, hardcoded_config.trail.capacity);
        assert_eq!(
            file_config.fallback.shuffle,
            hardcoded_config.fallback.shuffle
        );
        assert_eq!(file_config.rng.seed, hardcoded_config.rng.seed);
        assert_eq!(file_config.debug.enabled, hardcoded_config.debug.enabled);
    }

    #[test]
    fn test_rng_section_is_optional() {
        let text = r#"
            [agent]
            default_name = "laura"
            [validator]
            edge_margin = 0
            [edge_guard]
            enabled = false
            border_margin = 3
            [trail]
            enabled = false
            capacity = 10
            [fallback]
            shuffle = true
            [debug]
            enabled = false
            log_file_path = "x.jsonl"
        "#;
        let config = Config::from_toml_str(text).expect("config without [rng] should parse");
        assert_eq!(config.rng.seed, None);
        assert_eq!(config.edge_guard.border_margin, 3);
        assert!(config.fallback.shuffle);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let text = r#"
            [agent]
            default_name = "laura"
            [validator]
            edge_margin = 2
            [edge_guard]
            enabled = true
            border_margin = 2
            [trail]
            enabled = true
            capacity = 0
            [fallback]
            shuffle = false
            [debug]
            enabled = false
            log_file_path = "x.jsonl"
        "#;
        let result = Config::from_toml_str(text);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}
