// core/mod.rs

// Mapping core: grid storage, point projection, the shared map store, episode
// state and the session facade that ties them to the navigation agent.

/// Session facade and response types
pub mod api;
/// Square cell matrix
pub mod grid;
/// Latest-map store
pub mod memory;
/// Point clouds and grid projection
pub mod perception;
/// Episode bookkeeping
pub mod state;

pub use api::{MapResponse, Session, StepResponse};
pub use grid::{Grid, NotSquare};
pub use memory::OccupancyMapStore;
pub use perception::{
    project, Dimensionality, LabeledScan, OccupancyGrid, PerceptionError, PointCloud,
    ProjectionConfig, SemanticClass,
};
pub use state::{Episode, EpisodeOutcome, EpisodeState, EpisodeSummary, Position};
