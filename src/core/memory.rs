// core/memory.rs

// Holds the most recent occupancy map produced by the projector. The store is the
// only shared map state: a projection installs a whole grid, readers always get a
// complete snapshot, never one in the middle of an update.

use log::info;
use parking_lot::RwLock;
use std::sync::Arc;

use super::grid::Grid;
use super::perception::OccupancyGrid;

/// Latest-map holder with replace/read semantics
#[derive(Debug)]
pub struct OccupancyMapStore {
    current: RwLock<Arc<OccupancyGrid>>,
}

impl OccupancyMapStore {
    /// Creates a store holding an all-zero `grid_size × grid_size` map
    pub fn new(grid_size: usize) -> Self {
        OccupancyMapStore {
            current: RwLock::new(Arc::new(Grid::filled(grid_size, 0))),
        }
    }

    /// Installs `grid`, dropping the previous map
    pub fn replace(&self, grid: OccupancyGrid) {
        let occupied = grid.cells().filter(|&c| c != 0).count();
        let size = grid.size();
        *self.current.write() = Arc::new(grid);
        info!("Installed {}x{} occupancy map ({} occupied cells)", size, size, occupied);
    }

    /// Shared handle to the current map
    pub fn snapshot(&self) -> Arc<OccupancyGrid> {
        Arc::clone(&self.current.read())
    }

    /// Copy of the current map
    pub fn read(&self) -> OccupancyGrid {
        self.snapshot().as_ref().clone()
    }
}
