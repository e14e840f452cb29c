//! Semnav - semantic occupancy mapping and grid navigation
//!
//! This library projects labeled point clouds onto a semantic occupancy grid,
//! keeps the latest grid in a map store, and runs a grid-world navigation agent
//! on top of it with a pluggable action scorer.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Projection, map store, episode state and the session facade
pub mod core;
/// Grid-world environment, planner and agent
pub mod navigation;
/// Action scorers
pub mod neural;

// Re-export commonly used items for easier access
pub use crate::core::{
    project, LabeledScan, OccupancyGrid, OccupancyMapStore, PerceptionError, PointCloud,
    ProjectionConfig, SemanticClass, Session,
};
pub use navigation::{Action, Cell, EpsilonGreedyPlanner, NavGrid, NavigationAgent, NavigationEnv, NavigationError};
pub use neural::{ActionScorer, DenseQNetwork, GoalSeekingScorer, ScorerConfig, ScorerKind};

use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// Main configuration structure for semnav
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemnavConfig {
    /// Point projection parameters; `grid_size` is shared with navigation
    pub projection: ProjectionConfig,
    /// Navigation parameters
    pub navigation: NavigationConfig,
    /// Action scorer selection
    pub scorer: ScorerConfig,
}

/// Navigation system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Exploration rate used when a step does not specify one
    pub epsilon: f64,
    /// Seed for obstacle scatter, exploration and scorer weights; entropy if unset
    pub seed: Option<u64>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        NavigationConfig {
            epsilon: navigation::planner::DEFAULT_EPSILON,
            seed: None,
        }
    }
}

impl SemnavConfig {
    /// Loads a configuration from a YAML file; missing keys keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let config: SemnavConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Writes the configuration to a YAML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_yaml::to_writer(file, self)?;
        Ok(())
    }

    /// Rejects configurations that cannot produce a map or a valid policy
    pub fn validate(&self) -> Result<()> {
        self.projection.validate()?;
        let epsilon = self.navigation.epsilon;
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(SemnavError::Config(format!(
                "navigation.epsilon must be in [0, 1], got {epsilon}"
            )));
        }
        if self.scorer.hidden_layers.iter().any(|&width| width == 0) {
            return Err(SemnavError::Config("scorer.hidden_layers must be non-zero".into()));
        }
        Ok(())
    }
}

/// Random source for one consumer. Seeded sessions give each consumer its own
/// ChaCha stream so their draws do not interleave.
pub fn seeded_rng(seed: Option<u64>, stream: u64) -> ChaCha8Rng {
    match seed {
        Some(seed) => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(stream);
            rng
        }
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Semnav error types
#[derive(Debug, Error)]
pub enum SemnavError {
    /// Point cloud or projection failure
    #[error("perception error: {0}")]
    Perception(#[from] PerceptionError),
    /// Environment or planner failure
    #[error("navigation error: {0}")]
    Navigation(#[from] NavigationError),
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
    /// File access
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// YAML (de)serialization
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, SemnavError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_deployment_values() {
        let config = SemnavConfig::default();
        assert_eq!(config.projection.grid_size, 40);
        assert_eq!(config.projection.resolution, 0.2);
        assert_eq!(config.projection.height_band, Some((0.1, 2.5)));
        assert_eq!(config.navigation.epsilon, 0.2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: SemnavConfig =
            serde_yaml::from_str("projection:\n  grid_size: 12\nnavigation:\n  seed: 9\n").unwrap();
        assert_eq!(config.projection.grid_size, 12);
        assert_eq!(config.projection.resolution, 0.2);
        assert_eq!(config.navigation.seed, Some(9));
        assert_eq!(config.navigation.epsilon, 0.2);
    }

    #[test]
    fn validate_rejects_bad_epsilon() {
        let mut config = SemnavConfig::default();
        config.navigation.epsilon = 1.2;
        assert!(matches!(config.validate(), Err(SemnavError::Config(_))));
    }

    #[test]
    fn seeded_streams_differ() {
        use rand::Rng;
        let mut a = seeded_rng(Some(1), 0);
        let mut b = seeded_rng(Some(1), 1);
        let xs: Vec<u32> = (0..4).map(|_| a.gen_range(0..u32::MAX)).collect();
        let ys: Vec<u32> = (0..4).map(|_| b.gen_range(0..u32::MAX)).collect();
        assert_ne!(xs, ys);
    }
}
