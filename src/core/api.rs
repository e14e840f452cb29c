// core/api.rs

// Session facade for a serving layer: builds maps from labeled scans, exposes the
// stored map and drives one navigation agent. Each session owns its own store and
// environment, so concurrent callers use one session each.

use log::info;
use serde::{Deserialize, Serialize};

use super::memory::OccupancyMapStore;
use super::perception::{project, LabeledScan};
use super::state::EpisodeSummary;
use crate::navigation::{nav_rows, NavGrid, NavigationAgent, NavigationEnv, EpsilonGreedyPlanner};
use crate::neural::build_scorer;
use crate::{seeded_rng, SemnavConfig};

/// Occupancy map as nested rows
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapResponse {
    /// `G` rows of `G` class values
    pub grid: Vec<Vec<u8>>,
}

/// Navigation state after a reset or a step. Resets report no action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepResponse {
    /// Navigation grid rows
    pub grid: Vec<Vec<i32>>,
    /// Step reward, 0 after a reset
    pub reward: f64,
    /// Episode ended
    pub done: bool,
    /// Action index taken, `None` after a reset
    pub action: Option<u8>,
}

impl StepResponse {
    fn reset(grid: &NavGrid) -> Self {
        StepResponse {
            grid: nav_rows(grid),
            reward: 0.0,
            done: false,
            action: None,
        }
    }
}

// Independent ChaCha streams per random consumer.
const ENV_STREAM: u64 = 0;
const PLANNER_STREAM: u64 = 1;
const SCORER_STREAM: u64 = 2;

/// One mapping + navigation session
pub struct Session {
    config: SemnavConfig,
    store: OccupancyMapStore,
    agent: NavigationAgent,
}

impl Session {
    /// Validates the config and wires store, environment, planner and scorer
    pub fn new(config: SemnavConfig) -> crate::Result<Self> {
        config.validate()?;
        let grid_size = config.projection.grid_size;
        let seed = config.navigation.seed;

        let scorer = build_scorer(&config.scorer, grid_size, &mut seeded_rng(seed, SCORER_STREAM));
        let env = NavigationEnv::new(grid_size, seeded_rng(seed, ENV_STREAM))?;
        let planner = EpsilonGreedyPlanner::new(scorer, seeded_rng(seed, PLANNER_STREAM));

        info!(
            "Session ready: {}x{} grid, resolution {}, scorer {:?}",
            grid_size, grid_size, config.projection.resolution, config.scorer.kind
        );
        Ok(Session {
            store: OccupancyMapStore::new(grid_size),
            agent: NavigationAgent::new(env, planner),
            config,
        })
    }

    /// Projects a labeled scan and installs the result as the current map
    pub fn build_map(&self, scan: &LabeledScan) -> crate::Result<MapResponse> {
        let cloud = scan.cloud()?;
        let grid = project(&cloud, scan.labels.as_deref(), &self.config.projection)?;
        let response = MapResponse { grid: grid.to_rows() };
        self.store.replace(grid);
        Ok(response)
    }

    /// Current map, all-zero before the first build
    pub fn get_map(&self) -> MapResponse {
        MapResponse {
            grid: self.store.snapshot().to_rows(),
        }
    }

    /// Starts an episode on a random layout
    pub fn reset_random(&mut self) -> StepResponse {
        StepResponse::reset(&self.agent.reset_random())
    }

    /// Starts an episode on the stored map
    pub fn reset_from_map(&mut self) -> crate::Result<StepResponse> {
        let occupancy = self.store.snapshot();
        let grid = self.agent.reset_from_map(&occupancy)?;
        Ok(StepResponse::reset(&grid))
    }

    /// One planner-driven step; `None` uses the configured exploration rate
    pub fn step(&mut self, epsilon: Option<f64>) -> crate::Result<StepResponse> {
        let step = self.agent.step(epsilon.unwrap_or(self.config.navigation.epsilon))?;
        Ok(StepResponse {
            grid: nav_rows(&step.outcome.grid),
            reward: step.outcome.reward,
            done: step.outcome.done,
            action: Some(step.action as u8),
        })
    }

    /// Runs the current episode to completion
    pub fn run_episode(&mut self, epsilon: Option<f64>) -> crate::Result<EpisodeSummary> {
        Ok(self
            .agent
            .run_episode(epsilon.unwrap_or(self.config.navigation.epsilon))?)
    }

    /// Map store backing this session
    pub fn store(&self) -> &OccupancyMapStore {
        &self.store
    }

    /// Navigation agent
    pub fn agent(&self) -> &NavigationAgent {
        &self.agent
    }

    /// Active configuration
    pub fn config(&self) -> &SemnavConfig {
        &self.config
    }
}
