// src/navigation/controller.rs
// Drives the environment with the planner: one call picks an action for the
// current grid and applies it.

use log::info;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{Action, EpsilonGreedyPlanner, NavGrid, NavigationEnv, NavigationError, StepOutcome};
use crate::core::perception::OccupancyGrid;
use crate::core::state::{Episode, EpisodeOutcome, EpisodeState, EpisodeSummary};

/// A transition together with the action that produced it
#[derive(Clone, Debug, PartialEq)]
pub struct AgentStep {
    /// Environment transition
    pub outcome: StepOutcome,
    /// Action chosen by the planner
    pub action: Action,
}

/// Environment plus decision module
pub struct NavigationAgent<R: Rng = ChaCha8Rng> {
    env: NavigationEnv<R>,
    planner: EpsilonGreedyPlanner<R>,
}

impl<R: Rng> NavigationAgent<R> {
    /// Pairs an environment with a planner
    pub fn new(env: NavigationEnv<R>, planner: EpsilonGreedyPlanner<R>) -> Self {
        NavigationAgent { env, planner }
    }

    /// Starts an episode on a random layout
    pub fn reset_random(&mut self) -> NavGrid {
        self.env.reset_random()
    }

    /// Starts an episode on an occupancy map
    pub fn reset_from_map(&mut self, occupancy: &OccupancyGrid) -> Result<NavGrid, NavigationError> {
        self.env.reset_from_map(occupancy)
    }

    /// Selects an action for the current grid and applies it
    pub fn step(&mut self, epsilon: f64) -> Result<AgentStep, NavigationError> {
        match self.env.state() {
            EpisodeState::Uninitialized => return Err(NavigationError::NotInitialized),
            EpisodeState::Terminal => return Err(NavigationError::EpisodeFinished),
            EpisodeState::Ready => {}
        }
        let action = self.planner.select_action(self.env.grid(), epsilon)?;
        let outcome = self.env.step(action)?;
        Ok(AgentStep { outcome, action })
    }

    /// Steps until the episode ends. The step budget guarantees termination;
    /// an episode that has already ended needs a reset first.
    pub fn run_episode(&mut self, epsilon: f64) -> Result<EpisodeSummary, NavigationError> {
        let mut total_reward = 0.0;
        loop {
            let step = self.step(epsilon)?;
            total_reward += step.outcome.reward;
            if step.outcome.done {
                break;
            }
        }

        let episode = self.env.episode();
        let summary = EpisodeSummary {
            steps: episode.steps,
            total_reward,
            outcome: episode.outcome.unwrap_or(EpisodeOutcome::TimedOut),
        };
        info!(
            "Episode finished after {} steps: {:?}, total reward {:.2}",
            summary.steps, summary.outcome, summary.total_reward
        );
        Ok(summary)
    }

    /// Underlying environment
    pub fn env(&self) -> &NavigationEnv<R> {
        &self.env
    }

    /// Current episode bookkeeping
    pub fn episode(&self) -> &Episode {
        self.env.episode()
    }

    /// Planner access, e.g. to swap the scorer
    pub fn planner_mut(&mut self) -> &mut EpsilonGreedyPlanner<R> {
        &mut self.planner
    }
}
