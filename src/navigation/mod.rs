//! Grid-world navigation for semnav
//!
//! The environment turns an occupancy map (or a random layout) into a navigation
//! grid and simulates an agent walking from the top-left to the bottom-right
//! corner. The planner picks actions, the controller ties both together.

/// Agent tying the planner to the environment
pub mod controller;
/// Epsilon-greedy action selection
pub mod planner;

pub use controller::{AgentStep, NavigationAgent};
pub use planner::{greedy_action, EpsilonGreedyPlanner};

use log::{debug, info, warn};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::grid::Grid;
use crate::core::perception::OccupancyGrid;
use crate::core::state::{Episode, EpisodeOutcome, EpisodeState, Position};

/// Per-step cost of a move that neither collides nor reaches the goal
pub const STEP_REWARD: f64 = -0.01;
/// Reward for moving into an obstacle
pub const COLLISION_REWARD: f64 = -1.0;
/// Reward for moving onto the goal
pub const GOAL_REWARD: f64 = 1.0;
/// Random layouts scatter this many obstacles per grid side
pub const OBSTACLES_PER_SIDE: usize = 3;

/// Navigation grid cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Cell {
    /// Walkable
    Free = 0,
    /// Blocked; moving here ends the episode
    Obstacle = 1,
    /// Episode target
    Goal = 2,
    /// Current agent position
    Agent = 3,
}

impl From<Cell> for i32 {
    fn from(cell: Cell) -> i32 {
        cell as i32
    }
}

/// Navigation grid: free(0), obstacle(1), goal(2), agent(3)
pub type NavGrid = Grid<Cell>;

/// Integer rows of a navigation grid, as handed to external readers
pub fn nav_rows(grid: &NavGrid) -> Vec<Vec<i32>> {
    grid.rows_map(i32::from)
}

/// Discrete moves: 0 = up, 1 = down, 2 = left, 3 = right
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    /// Row - 1
    Up = 0,
    /// Row + 1
    Down = 1,
    /// Column - 1
    Left = 2,
    /// Column + 1
    Right = 3,
}

impl Action {
    /// All actions in index order
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Position of the action in a score array
    pub fn index(self) -> usize {
        self as usize
    }

    /// Destination of a one-cell move; moves past the border leave `from` unchanged
    pub fn apply(self, from: Position, grid_size: usize) -> Position {
        let last = grid_size.saturating_sub(1);
        let mut to = from;
        match self {
            Action::Up if from.row > 0 => to.row -= 1,
            Action::Down if from.row < last => to.row += 1,
            Action::Left if from.col > 0 => to.col -= 1,
            Action::Right if from.col < last => to.col += 1,
            _ => {}
        }
        to
    }
}

impl TryFrom<i64> for Action {
    type Error = NavigationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Action::Up),
            1 => Ok(Action::Down),
            2 => Ok(Action::Left),
            3 => Ok(Action::Right),
            other => Err(NavigationError::InvalidAction(other)),
        }
    }
}

/// Navigation error types
#[derive(Debug, Error, PartialEq)]
pub enum NavigationError {
    /// `step` called before any reset
    #[error("environment not initialized, call a reset first")]
    NotInitialized,
    /// Episode already ended; reset before stepping or running again
    #[error("episode already finished, reset before stepping again")]
    EpisodeFinished,
    /// Action index outside 0..=3
    #[error("invalid action {0}, expected 0..=3")]
    InvalidAction(i64),
    /// Exploration rate outside [0, 1]
    #[error("invalid exploration rate {0}, expected a value in [0, 1]")]
    InvalidEpsilon(f64),
    /// Grid with no cells
    #[error("grid size must be at least 1")]
    EmptyGrid,
}

/// Outcome of a single transition
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    /// Grid after the move
    pub grid: NavGrid,
    /// Reward for this transition
    pub reward: f64,
    /// True once the episode has ended
    pub done: bool,
}

/// Grid-world environment. One instance serves one navigation session.
pub struct NavigationEnv<R: Rng = ChaCha8Rng> {
    grid_size: usize,
    grid: NavGrid,
    episode: Episode,
    rng: R,
}

impl<R: Rng> NavigationEnv<R> {
    /// Creates an uninitialized environment; call a reset before stepping
    pub fn new(grid_size: usize, rng: R) -> Result<Self, NavigationError> {
        if grid_size == 0 {
            return Err(NavigationError::EmptyGrid);
        }
        Ok(NavigationEnv {
            grid_size,
            grid: Grid::filled(grid_size, Cell::Free),
            episode: Episode::uninitialized(),
            rng,
        })
    }

    /// Fresh layout with `3·G` randomly scattered obstacles
    pub fn reset_random(&mut self) -> NavGrid {
        let size = self.grid_size;
        let mut grid = Grid::filled(size, Cell::Free);
        // Draw order is fixed (col then row) so seeded runs are reproducible.
        for _ in 0..OBSTACLES_PER_SIDE * size {
            let col = self.rng.gen_range(0..size);
            let row = self.rng.gen_range(0..size);
            grid.set(row, col, Cell::Obstacle);
        }
        self.install(grid);
        info!(
            "Reset to random {}x{} layout with {} obstacle cells",
            size,
            size,
            self.grid.count(Cell::Obstacle)
        );
        self.grid.clone()
    }

    /// Layout taken from an occupancy map; every nonzero class becomes an obstacle.
    /// The environment adopts the map's size.
    pub fn reset_from_map(&mut self, occupancy: &OccupancyGrid) -> Result<NavGrid, NavigationError> {
        let size = occupancy.size();
        if size == 0 {
            return Err(NavigationError::EmptyGrid);
        }
        let mut grid = Grid::filled(size, Cell::Free);
        for ((row, col), class) in occupancy.indexed_cells() {
            if class != 0 {
                grid.set(row, col, Cell::Obstacle);
            }
        }
        self.grid_size = size;
        self.install(grid);
        info!(
            "Reset from {}x{} occupancy map with {} obstacle cells",
            size,
            size,
            self.grid.count(Cell::Obstacle)
        );
        Ok(self.grid.clone())
    }

    // Goal first, then agent: with G == 1 both share (0, 0) and the agent wins.
    fn install(&mut self, mut grid: NavGrid) {
        let episode = Episode::start(self.grid_size);
        grid.set(episode.goal.row, episode.goal.col, Cell::Goal);
        grid.set(episode.agent.row, episode.agent.col, Cell::Agent);
        self.grid = grid;
        self.episode = episode;
    }

    /// Moves the agent one cell.
    ///
    /// The destination is inspected before the agent marker is written: an
    /// obstacle ends the episode with [`COLLISION_REWARD`], the goal with
    /// [`GOAL_REWARD`], anything else costs [`STEP_REWARD`]. Once the step
    /// counter reaches the grid area the episode is done regardless, keeping the
    /// reward already computed. A finished episode rejects further steps with
    /// [`NavigationError::EpisodeFinished`] and leaves the grid untouched.
    pub fn step(&mut self, action: Action) -> Result<StepOutcome, NavigationError> {
        match self.episode.state {
            EpisodeState::Uninitialized => return Err(NavigationError::NotInitialized),
            EpisodeState::Terminal => {
                warn!("Step requested after the episode ended, reset first");
                return Err(NavigationError::EpisodeFinished);
            }
            EpisodeState::Ready => {}
        }

        let from = self.episode.agent;
        self.grid.set(from.row, from.col, Cell::Free);
        let to = action.apply(from, self.grid_size);
        self.episode.steps += 1;

        let (reward, mut done, mut outcome) = match self.grid.get(to.row, to.col) {
            Some(Cell::Obstacle) => (COLLISION_REWARD, true, Some(EpisodeOutcome::Collision)),
            Some(Cell::Goal) => (GOAL_REWARD, true, Some(EpisodeOutcome::ReachedGoal)),
            _ => (STEP_REWARD, false, None),
        };
        if self.episode.budget_exhausted() {
            done = true;
            outcome.get_or_insert(EpisodeOutcome::TimedOut);
        }

        self.grid.set(to.row, to.col, Cell::Agent);
        self.episode.agent = to;
        if done {
            self.episode.state = EpisodeState::Terminal;
            self.episode.outcome = outcome;
        }

        debug!(
            "Step {}: {:?} ({},{}) -> ({},{}) reward={} done={}",
            self.episode.steps, action, from.row, from.col, to.row, to.col, reward, done
        );

        Ok(StepOutcome {
            grid: self.grid.clone(),
            reward,
            done,
        })
    }

    /// Current navigation grid
    pub fn grid(&self) -> &NavGrid {
        &self.grid
    }

    /// Current episode bookkeeping
    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    /// Lifecycle state of the current episode
    pub fn state(&self) -> EpisodeState {
        self.episode.state
    }

    /// Cells per side; follows the last map reset
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }
}
