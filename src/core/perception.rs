// core/perception.rs

// Turns labeled point clouds into a semantic occupancy grid. The projector is a
// pure function: it never touches the map store, publishing is up to the caller.

use log::{debug, info};
use nalgebra::{Point3, Vector2};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

use super::grid::Grid;

/// Occupancy grid: 0 = free/unknown, 1..=7 = last semantic class written to the cell
pub type OccupancyGrid = Grid<u8>;

/// Margin kept below the world edge so scaled points never land on index `G`
pub const EDGE_EPSILON: f64 = 1e-3;

/// Label written for points that arrive without one
pub const DEFAULT_LABEL: u8 = SemanticClass::Wall as u8;

/// Closed set of classes produced by the segmentation stage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SemanticClass {
    /// Floor or unknown
    Free = 0,
    /// Wall
    Wall = 1,
    /// Chair
    Chair = 2,
    /// Door
    Door = 3,
    /// Ceiling
    Ceiling = 4,
    /// Table
    Table = 5,
    /// Window
    Window = 6,
    /// Sofa or bed, one class
    SofaOrBed = 7,
}

impl SemanticClass {
    /// Number of classes in the label domain
    pub const COUNT: usize = 8;

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            SemanticClass::Free => "free",
            SemanticClass::Wall => "wall",
            SemanticClass::Chair => "chair",
            SemanticClass::Door => "door",
            SemanticClass::Ceiling => "ceiling",
            SemanticClass::Table => "table",
            SemanticClass::Window => "window",
            SemanticClass::SofaOrBed => "sofa/bed",
        }
    }
}

impl TryFrom<u8> for SemanticClass {
    type Error = PerceptionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => SemanticClass::Free,
            1 => SemanticClass::Wall,
            2 => SemanticClass::Chair,
            3 => SemanticClass::Door,
            4 => SemanticClass::Ceiling,
            5 => SemanticClass::Table,
            6 => SemanticClass::Window,
            7 => SemanticClass::SofaOrBed,
            other => return Err(PerceptionError::InvalidLabel(other)),
        })
    }
}

/// Perception error types
#[derive(Debug, Error, PartialEq)]
pub enum PerceptionError {
    /// A point has a coordinate count other than 2 or 3
    #[error("point {index} has {found} coordinates, expected 2 or 3")]
    ShapeMismatch {
        /// Row index
        index: usize,
        /// Coordinates in that row
        found: usize,
    },
    /// Points disagree on their dimensionality
    #[error("point {index} has {found} coordinates but earlier points have {expected}")]
    InconsistentDimensions {
        /// Row index
        index: usize,
        /// Width of the first row
        expected: usize,
        /// Width of this row
        found: usize,
    },
    /// NaN or infinite coordinate
    #[error("point {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Row index
        index: usize,
    },
    /// Label array not index-aligned with the points
    #[error("got {labels} labels for {points} points")]
    LabelCountMismatch {
        /// Point count
        points: usize,
        /// Label count
        labels: usize,
    },
    /// Label outside the 8-class domain
    #[error("label {0} is outside the class domain 0..=7")]
    InvalidLabel(u8),
    /// Coordinate spread too large to represent as a finite float
    #[error("point cloud extent overflows, coordinates are too far apart")]
    UnboundedExtent,
    /// Projection parameters that cannot produce a grid
    #[error("invalid projection config: {0}")]
    InvalidConfig(String),
}

/// Whether the cloud carries a height coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimensionality {
    /// x, y
    Planar,
    /// x, y, z
    Spatial,
}

/// Ordered point collection with uniform dimensionality.
/// Planar points are stored with `z = 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloud {
    points: Vec<Point3<f64>>,
    dims: Dimensionality,
}

impl PointCloud {
    /// Strict constructor: every row must hold exactly 2 or 3 finite coordinates
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, PerceptionError> {
        for (index, row) in rows.iter().enumerate() {
            if !(2..=3).contains(&row.len()) {
                return Err(PerceptionError::ShapeMismatch {
                    index,
                    found: row.len(),
                });
            }
        }
        Self::build(rows, |row| row.len())
    }

    /// Accepts scan rows carrying extra feature channels and keeps only the
    /// leading xyz (or xy) values.
    pub fn from_feature_rows(rows: &[Vec<f64>]) -> Result<Self, PerceptionError> {
        for (index, row) in rows.iter().enumerate() {
            if row.len() < 2 {
                return Err(PerceptionError::ShapeMismatch {
                    index,
                    found: row.len(),
                });
            }
        }
        Self::build(rows, |row| row.len().min(3))
    }

    fn build(rows: &[Vec<f64>], width: impl Fn(&[f64]) -> usize) -> Result<Self, PerceptionError> {
        let expected = rows.first().map_or(2, |row| width(row.as_slice()));
        let mut points = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let found = width(row.as_slice());
            if found != expected {
                return Err(PerceptionError::InconsistentDimensions {
                    index,
                    expected,
                    found,
                });
            }
            let coords = &row[..found];
            if coords.iter().any(|c| !c.is_finite()) {
                return Err(PerceptionError::NonFiniteCoordinate { index });
            }
            let z = if found == 3 { coords[2] } else { 0.0 };
            points.push(Point3::new(coords[0], coords[1], z));
        }

        let dims = if expected == 3 {
            Dimensionality::Spatial
        } else {
            Dimensionality::Planar
        };
        Ok(PointCloud { points, dims })
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the cloud holds no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dimensionality of the source rows
    pub fn dimensionality(&self) -> Dimensionality {
        self.dims
    }

    /// Points in input order
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }
}

/// Serialized scan: point rows plus an optional, index-aligned label array
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledScan {
    /// Rows of x, y[, z, features...]
    pub points: Vec<Vec<f64>>,
    /// One class per point; absent means every point is a wall
    #[serde(default)]
    pub labels: Option<Vec<u8>>,
}

impl LabeledScan {
    /// Loads a scan from a YAML file
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let scan: LabeledScan = serde_yaml::from_reader(file)?;
        info!("Loaded scan with {} points from {}", scan.points.len(), path.display());
        Ok(scan)
    }

    /// Writes the scan to a YAML file
    pub fn save(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        let file = File::create(path.as_ref())?;
        serde_yaml::to_writer(file, self)?;
        Ok(())
    }

    /// Point cloud view of the rows (extra feature channels dropped)
    pub fn cloud(&self) -> Result<PointCloud, PerceptionError> {
        PointCloud::from_feature_rows(&self.points)
    }
}

/// Projection parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Cells per side (`G`)
    pub grid_size: usize,
    /// World units per cell (`r`)
    pub resolution: f64,
    /// Inclusive `(zmin, zmax)` band applied to 3D points
    pub height_band: Option<(f64, f64)>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        ProjectionConfig {
            grid_size: 40,
            resolution: 0.2,
            height_band: Some((0.1, 2.5)),
        }
    }
}

impl ProjectionConfig {
    /// Checks the parameters describe a usable grid
    pub fn validate(&self) -> Result<(), PerceptionError> {
        if self.grid_size == 0 {
            return Err(PerceptionError::InvalidConfig("grid_size must be positive".into()));
        }
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(PerceptionError::InvalidConfig(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        if self.world_size() <= EDGE_EPSILON {
            return Err(PerceptionError::InvalidConfig(format!(
                "world extent {} is smaller than the edge margin",
                self.world_size()
            )));
        }
        if let Some((zmin, zmax)) = self.height_band {
            if zmin.is_nan() || zmax.is_nan() || zmin > zmax {
                return Err(PerceptionError::InvalidConfig(format!(
                    "height band ({zmin}, {zmax}) is empty"
                )));
            }
        }
        Ok(())
    }

    /// Side length of the mapped area in world units
    pub fn world_size(&self) -> f64 {
        self.grid_size as f64 * self.resolution
    }

    fn within_band(&self, z: f64) -> bool {
        self.height_band
            .map_or(true, |(zmin, zmax)| z >= zmin && z <= zmax)
    }
}

/// Projects labeled points onto a `G×G` occupancy grid.
///
/// Points outside the height band are dropped with their labels, the rest are
/// shifted to a zero origin and scaled uniformly so the larger axis fills the
/// grid. Cells are written in input order, so the last point to land in a cell
/// decides its class. An empty (or fully filtered) cloud yields an all-zero grid.
pub fn project(
    cloud: &PointCloud,
    labels: Option<&[u8]>,
    config: &ProjectionConfig,
) -> Result<OccupancyGrid, PerceptionError> {
    config.validate()?;

    if let Some(labels) = labels {
        if labels.len() != cloud.len() {
            return Err(PerceptionError::LabelCountMismatch {
                points: cloud.len(),
                labels: labels.len(),
            });
        }
        for &label in labels {
            SemanticClass::try_from(label)?;
        }
    }

    let size = config.grid_size;
    let filter_height = cloud.dimensionality() == Dimensionality::Spatial;

    let kept: Vec<(Vector2<f64>, u8)> = cloud
        .points()
        .iter()
        .enumerate()
        .filter(|(_, p)| !filter_height || config.within_band(p.z))
        .map(|(i, p)| {
            let label = labels.map_or(DEFAULT_LABEL, |labels| labels[i]);
            (Vector2::new(p.x, p.y), label)
        })
        .collect();

    if kept.is_empty() {
        debug!("No points left after height filtering, returning empty grid");
        return Ok(Grid::filled(size, 0));
    }

    let min = kept
        .iter()
        .fold(Vector2::repeat(f64::INFINITY), |acc, (p, _)| acc.inf(p));
    let extent = kept
        .iter()
        .fold(Vector2::zeros(), |acc: Vector2<f64>, (p, _)| acc.sup(&(p - min)));

    let upper = config.world_size() - EDGE_EPSILON;
    let largest = extent.max();
    if !largest.is_finite() {
        return Err(PerceptionError::UnboundedExtent);
    }

    let mut grid = Grid::filled(size, 0u8);
    for (p, label) in &kept {
        // All points coincide: offsets stay at zero so everything lands in one cell.
        let unit = if largest > 0.0 { (p - min) / largest } else { Vector2::zeros() };
        let scaled = (unit * upper).map(|c| c.clamp(0.0, upper));
        let col = cell_index(scaled.x, config.resolution, size);
        let row = cell_index(scaled.y, config.resolution, size);
        grid.set(row, col, *label);
    }

    info!(
        "Projected {}/{} points onto {}x{} grid ({} occupied cells)",
        kept.len(),
        cloud.len(),
        size,
        size,
        size * size - grid.count(0)
    );
    Ok(grid)
}

#[inline]
fn cell_index(coord: f64, resolution: f64, size: usize) -> usize {
    ((coord / resolution).floor() as usize).min(size - 1)
}
