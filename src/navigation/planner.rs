// src/navigation/planner.rs
// Epsilon-greedy action selection over an injected scoring function.

use log::trace;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{Action, NavGrid, NavigationError};
use crate::neural::ActionScorer;

/// Default exploration rate
pub const DEFAULT_EPSILON: f64 = 0.2;

/// Index of the highest score. Ties go to the lowest index and NaN never wins.
pub fn greedy_action(scores: &[f64; 4]) -> Action {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        let current = scores[best];
        if score > current || (current.is_nan() && !score.is_nan()) {
            best = i;
        }
    }
    Action::ALL[best]
}

/// Picks a random action with probability `epsilon`, otherwise the best-scoring one.
pub struct EpsilonGreedyPlanner<R: Rng = ChaCha8Rng> {
    scorer: Box<dyn ActionScorer>,
    rng: R,
}

impl<R: Rng> EpsilonGreedyPlanner<R> {
    /// Planner over `scorer`, exploring with `rng`
    pub fn new(scorer: Box<dyn ActionScorer>, rng: R) -> Self {
        EpsilonGreedyPlanner { scorer, rng }
    }

    /// Chooses the next action for `grid`.
    ///
    /// The scorer is only consulted on the greedy branch.
    pub fn select_action(&mut self, grid: &NavGrid, epsilon: f64) -> Result<Action, NavigationError> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(NavigationError::InvalidEpsilon(epsilon));
        }
        if self.rng.gen_bool(epsilon) {
            let action = Action::ALL[self.rng.gen_range(0..Action::ALL.len())];
            trace!("Exploring with {:?}", action);
            return Ok(action);
        }
        let scores = self.scorer.score(grid);
        let action = greedy_action(&scores);
        trace!("Scores {:?} -> {:?}", scores, action);
        Ok(action)
    }

    /// Swaps the scoring function
    pub fn set_scorer(&mut self, scorer: Box<dyn ActionScorer>) {
        self.scorer = scorer;
    }
}
