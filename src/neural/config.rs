// src/neural/config.rs
// Selects and parameterises the action scorer used by the planner.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{ActionScorer, DenseQNetwork, GoalSeekingScorer};

/// Which scorer the planner should use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    /// Untrained feed-forward Q-network
    Dense,
    /// Distance-to-goal heuristic
    GoalSeeking,
}

/// Scorer configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Scorer implementation
    pub kind: ScorerKind,
    /// Hidden widths of the dense network
    pub hidden_layers: Vec<usize>,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        ScorerConfig {
            kind: ScorerKind::Dense,
            hidden_layers: vec![128, 64],
        }
    }
}

/// Builds the configured scorer for `grid_size × grid_size` grids
pub fn build_scorer<R: Rng>(config: &ScorerConfig, grid_size: usize, rng: &mut R) -> Box<dyn ActionScorer> {
    match config.kind {
        ScorerKind::Dense => Box::new(DenseQNetwork::new(grid_size, &config.hidden_layers, rng)),
        ScorerKind::GoalSeeking => Box::new(GoalSeekingScorer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snake_case_kind() {
        let config: ScorerConfig = serde_yaml::from_str("kind: goal_seeking").unwrap();
        assert_eq!(config.kind, ScorerKind::GoalSeeking);
        assert_eq!(config.hidden_layers, vec![128, 64]);
    }
}
