// core/state.rs

// Episode bookkeeping for the navigation environment: agent/goal cells, the step
// counter and the lifecycle (Uninitialized -> Ready -> Terminal).

use serde::{Deserialize, Serialize};

/// Cell coordinate; `row` is y, `col` is x
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Row (y)
    pub row: usize,
    /// Column (x)
    pub col: usize,
}

impl Position {
    /// Cell at (row, col)
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Manhattan distance in cells
    pub fn manhattan(&self, other: &Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// Environment lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeState {
    /// No reset has happened yet
    Uninitialized,
    /// Episode in progress
    Ready,
    /// Collision, goal or timeout reached
    Terminal,
}

/// Why an episode ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeOutcome {
    /// Agent moved onto the goal
    ReachedGoal,
    /// Agent moved into an obstacle
    Collision,
    /// Step budget ran out first
    TimedOut,
}

/// Mutable per-episode state
#[derive(Clone, Debug, PartialEq)]
pub struct Episode {
    /// Agent cell
    pub agent: Position,
    /// Goal cell
    pub goal: Position,
    /// Steps taken so far
    pub steps: usize,
    /// Steps allowed before the episode is forced to end (grid area)
    pub step_budget: usize,
    /// Lifecycle state
    pub state: EpisodeState,
    /// Set when the episode ends
    pub outcome: Option<EpisodeOutcome>,
}

impl Episode {
    /// Placeholder before the first reset
    pub fn uninitialized() -> Self {
        Episode {
            agent: Position::default(),
            goal: Position::default(),
            steps: 0,
            step_budget: 0,
            state: EpisodeState::Uninitialized,
            outcome: None,
        }
    }

    /// Fresh episode with the agent in the top-left and the goal in the
    /// bottom-right corner of a `grid_size` grid
    pub fn start(grid_size: usize) -> Self {
        let far = grid_size.saturating_sub(1);
        Episode {
            agent: Position::new(0, 0),
            goal: Position::new(far, far),
            steps: 0,
            step_budget: grid_size * grid_size,
            state: EpisodeState::Ready,
            outcome: None,
        }
    }

    /// True once the episode has ended
    pub fn is_done(&self) -> bool {
        self.state == EpisodeState::Terminal
    }

    /// True once the step counter has used up the budget
    pub fn budget_exhausted(&self) -> bool {
        self.steps >= self.step_budget
    }
}

/// Result of driving one episode to completion
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Steps taken
    pub steps: usize,
    /// Sum of step rewards
    pub total_reward: f64,
    /// How the episode ended
    pub outcome: EpisodeOutcome,
}
