//! Action scoring for the navigation planner
//!
//! The planner treats scoring as an injected capability: anything that maps a
//! navigation grid to four action scores. Training is out of scope, so the
//! provided implementations are an untrained feed-forward Q-network and a
//! goal-seeking heuristic.

/// Scorer selection
pub mod config;

pub use config::{build_scorer, ScorerConfig, ScorerKind};

use log::warn;
use nalgebra::{DMatrix, DVector};
use rand::Rng;

#[cfg(test)]
use mockall::automock;

use crate::core::state::Position;
use crate::navigation::{Action, Cell, NavGrid};

/// Maps a navigation grid to one score per action (up, down, left, right)
#[cfg_attr(test, automock)]
pub trait ActionScorer {
    /// Scores in [`Action`] index order; higher is better
    fn score(&self, grid: &NavGrid) -> [f64; 4];
}

/// Fully connected network with ReLU hidden layers and a linear output layer
#[derive(Debug, Clone)]
pub struct DenseQNetwork {
    layers: Vec<(DMatrix<f64>, DVector<f64>)>,
    input_size: usize,
}

impl DenseQNetwork {
    /// Builds a network for `grid_size × grid_size` inputs with uniform
    /// `±1/sqrt(fan_in)` initial weights.
    pub fn new<R: Rng>(grid_size: usize, hidden: &[usize], rng: &mut R) -> Self {
        let input_size = grid_size * grid_size;
        let mut widths = Vec::with_capacity(hidden.len() + 2);
        widths.push(input_size);
        widths.extend_from_slice(hidden);
        widths.push(Action::ALL.len());

        let layers = widths
            .windows(2)
            .map(|pair| {
                let (fan_in, fan_out) = (pair[0], pair[1]);
                let bound = 1.0 / (fan_in.max(1) as f64).sqrt();
                let weights = DMatrix::from_fn(fan_out, fan_in, |_, _| rng.gen_range(-bound..=bound));
                let bias = DVector::from_fn(fan_out, |_, _| rng.gen_range(-bound..=bound));
                (weights, bias)
            })
            .collect();

        DenseQNetwork { layers, input_size }
    }

    /// Flattened grid size the network was built for
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Forward pass over a flattened input
    pub fn forward(&self, input: DVector<f64>) -> DVector<f64> {
        let last = self.layers.len().saturating_sub(1);
        self.layers
            .iter()
            .enumerate()
            .fold(input, |activation, (i, (weights, bias))| {
                let z = weights * activation + bias;
                if i < last { z.map(|v| v.max(0.0)) } else { z }
            })
    }

    // Grids of another size are truncated or zero-padded to the input width.
    fn encode(&self, grid: &NavGrid) -> DVector<f64> {
        if grid.size() * grid.size() != self.input_size {
            warn!(
                "Grid {}x{} does not match network input of {} cells",
                grid.size(),
                grid.size(),
                self.input_size
            );
        }
        let mut cells = grid.cells().map(|c| i32::from(c) as f64);
        DVector::from_fn(self.input_size, |_, _| cells.next().unwrap_or(0.0))
    }
}

impl ActionScorer for DenseQNetwork {
    fn score(&self, grid: &NavGrid) -> [f64; 4] {
        let output = self.forward(self.encode(grid));
        let mut scores = [0.0; 4];
        for (slot, value) in scores.iter_mut().zip(output.iter()) {
            *slot = *value;
        }
        scores
    }
}

/// Heuristic scorer: heads for the goal and avoids obstacles and walls
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalSeekingScorer;

impl GoalSeekingScorer {
    const OBSTACLE_PENALTY: f64 = -100.0;
    const GOAL_BONUS: f64 = 100.0;
    const BLOCKED_PENALTY: f64 = -1.0;

    fn find(grid: &NavGrid, target: Cell) -> Option<Position> {
        grid.indexed_cells()
            .find(|&(_, cell)| cell == target)
            .map(|((row, col), _)| Position::new(row, col))
    }
}

impl ActionScorer for GoalSeekingScorer {
    fn score(&self, grid: &NavGrid) -> [f64; 4] {
        let (Some(agent), Some(goal)) = (Self::find(grid, Cell::Agent), Self::find(grid, Cell::Goal))
        else {
            return [0.0; 4];
        };

        Action::ALL.map(|action| {
            let to = action.apply(agent, grid.size());
            match grid.get(to.row, to.col) {
                Some(Cell::Obstacle) => Self::OBSTACLE_PENALTY,
                Some(Cell::Goal) => Self::GOAL_BONUS,
                _ => {
                    let distance = -(to.manhattan(&goal) as f64);
                    if to == agent { distance + Self::BLOCKED_PENALTY } else { distance }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::Grid;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn open_grid(size: usize) -> NavGrid {
        let mut grid = Grid::filled(size, Cell::Free);
        grid.set(size - 1, size - 1, Cell::Goal);
        grid.set(0, 0, Cell::Agent);
        grid
    }

    #[test]
    fn dense_network_is_deterministic_for_a_seed() {
        let a = DenseQNetwork::new(5, &[16, 8], &mut ChaCha8Rng::seed_from_u64(11));
        let b = DenseQNetwork::new(5, &[16, 8], &mut ChaCha8Rng::seed_from_u64(11));
        let grid = open_grid(5);
        let (sa, sb) = (a.score(&grid), b.score(&grid));
        for (x, y) in sa.iter().zip(sb.iter()) {
            assert_relative_eq!(*x, *y);
        }
        assert!(sa.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn dense_network_tolerates_other_grid_sizes() {
        let net = DenseQNetwork::new(4, &[8], &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(net.input_size(), 16);
        assert!(net.score(&open_grid(6)).iter().all(|s| s.is_finite()));
        assert!(net.score(&open_grid(2)).iter().all(|s| s.is_finite()));
    }

    #[test]
    fn forward_with_no_hidden_layers_is_affine() {
        let net = DenseQNetwork::new(1, &[], &mut ChaCha8Rng::seed_from_u64(5));
        let zero = net.forward(DVector::zeros(1));
        let (_, bias) = &net.layers[0];
        assert_relative_eq!(zero, bias.clone());
    }

    #[test]
    fn goal_seeker_prefers_moves_towards_goal() {
        let scores = GoalSeekingScorer.score(&open_grid(4));
        let best = crate::navigation::greedy_action(&scores);
        assert!(best == Action::Down || best == Action::Right);
        assert!(scores[Action::Up.index()] < scores[Action::Down.index()]);
    }

    #[test]
    fn goal_seeker_avoids_adjacent_obstacle() {
        let mut grid = open_grid(4);
        grid.set(1, 0, Cell::Obstacle);
        let scores = GoalSeekingScorer.score(&grid);
        assert_eq!(crate::navigation::greedy_action(&scores), Action::Right);
    }

    #[test]
    fn goal_seeker_without_goal_is_neutral() {
        let mut grid = Grid::filled(3, Cell::Free);
        grid.set(2, 2, Cell::Agent);
        assert_eq!(GoalSeekingScorer.score(&grid), [0.0; 4]);
    }
}
