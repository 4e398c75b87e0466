//! Configuration loading for the planner.
//!
//! All planner settings are loaded from a TOML file. Every section is optional
//! and falls back to its defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default tuning file path
pub const DEFAULT_CONFIG_PATH: &str = "planner.toml";

/// Complete planner configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Item acquisition settings
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    /// Blueprint construction settings
    #[serde(default)]
    pub construction: ConstructionConfig,
    /// Goal controller settings
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Session settings
    #[serde(default)]
    pub session: SessionConfig,
}

impl PlannerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes this configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Item acquisition configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Items whose name contains any of these fragments are never expanded
    pub blacklist: Vec<String>,
    /// Recipes using more items than this need the crafting station
    pub crafting_grid_capacity: u32,
    /// Station required by large recipes
    pub crafting_station: String,
    /// Station required for smelting
    pub smelting_station: String,
    /// Fuel consumed by smelting
    pub smelting_fuel: String,
    /// Radius of the nearby block/entity index
    pub scan_radius: u32,
    /// How far to wander when a source stays out of sight
    pub explore_distance: u32,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            blacklist: [
                "coal_block",
                "iron_block",
                "gold_block",
                "diamond_block",
                "deepslate",
                "blackstone",
                "netherite",
                "_wood",
                "stripped_",
                "crimson",
                "warped",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            crafting_grid_capacity: 4,
            crafting_station: "crafting_table".to_string(),
            smelting_station: "furnace".to_string(),
            smelting_fuel: "coal".to_string(),
            scan_radius: 16,
            explore_distance: 8,
        }
    }
}

impl AcquisitionConfig {
    /// True if `item` matches any blacklist fragment.
    pub fn is_blacklisted(&self, item: &str) -> bool {
        self.blacklist.iter().any(|fragment| item.contains(fragment.as_str()))
    }
}

/// Blueprint construction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionConfig {
    /// Search radius for a free building footprint
    pub free_space_radius: u32,
    /// Search radius for logs when picking a wood variant
    pub variant_search_radius: u32,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        Self {
            free_space_radius: 16,
            variant_search_radius: 16,
        }
    }
}

/// Goal controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Distance to step aside before each tick's work (0 disables)
    pub step_aside_distance: u32,
    /// Distance to walk after leaving a building through its door
    pub exit_move_distance: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            step_aside_distance: 2,
            exit_move_distance: 2,
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed for orientation selection
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Returns the default configuration as a TOML string.
pub fn default_config_toml() -> String {
    PlannerConfig::default()
        .to_toml()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.acquisition.crafting_grid_capacity, 4);
        assert_eq!(config.acquisition.explore_distance, 8);
        assert_eq!(config.construction.free_space_radius, 16);
        assert_eq!(config.controller.exit_move_distance, 2);
        assert_eq!(config.session.seed, 42);
    }

    #[test]
    fn test_blacklist_matches_fragments() {
        let config = AcquisitionConfig::default();
        assert!(config.is_blacklisted("coal_block"));
        assert!(config.is_blacklisted("oak_wood"));
        assert!(config.is_blacklisted("stripped_oak_log"));
        assert!(!config.is_blacklisted("oak_log"));
        assert!(!config.is_blacklisted("coal"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PlannerConfig::from_str(
            r#"
            [acquisition]
            explore_distance = 12

            [session]
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.acquisition.explore_distance, 12);
        assert_eq!(config.acquisition.crafting_station, "crafting_table");
        assert_eq!(config.session.seed, 7);
        assert_eq!(config.controller, ControllerConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let toml = default_config_toml();
        let parsed = PlannerConfig::from_str(&toml).unwrap();
        assert_eq!(parsed, PlannerConfig::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[construction]\nfree_space_radius = 24").unwrap();
        let config = PlannerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.construction.free_space_radius, 24);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(matches!(
            PlannerConfig::from_str("[acquisition\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
