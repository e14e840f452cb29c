// core/grid.rs

// Square cell matrix shared by the occupancy map and the navigation grid.
// Row-major storage, indexed as (row, col) == (y, x).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Nested rows that do not form a square
#[derive(Debug, Error, PartialEq, Eq)]
#[error("row {row} has {found} cells, expected {expected}")]
pub struct NotSquare {
    /// Index of the first offending row
    pub row: usize,
    /// Cells in that row
    pub found: usize,
    /// Row count, which every row length must match
    pub expected: usize,
}

/// Square `size × size` grid stored row-major. Serialized as nested rows;
/// deserialization goes through the same square check as [`Grid::from_rows`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<Vec<T>>",
    into = "Vec<Vec<T>>",
    bound(serialize = "T: Copy + Serialize", deserialize = "T: Copy + Deserialize<'de>")
)]
pub struct Grid<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    /// Creates a grid with every cell set to `fill`
    pub fn filled(size: usize, fill: T) -> Self {
        Grid {
            size,
            cells: vec![fill; size * size],
        }
    }

    /// Builds a grid from nested rows, or `None` if the rows are not square
    pub fn from_rows(rows: &[Vec<T>]) -> Option<Self> {
        Self::check_square(rows).ok()?;
        let cells = rows.iter().flat_map(|row| row.iter().copied()).collect();
        Some(Grid {
            size: rows.len(),
            cells,
        })
    }

    fn check_square(rows: &[Vec<T>]) -> Result<(), NotSquare> {
        let expected = rows.len();
        match rows.iter().position(|row| row.len() != expected) {
            Some(row) => Err(NotSquare {
                row,
                found: rows[row].len(),
                expected,
            }),
            None => Ok(()),
        }
    }

    /// Cells per side
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Value at (row, col); `None` outside the grid
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row < self.size && col < self.size {
            Some(self.cells[row * self.size + col])
        } else {
            None
        }
    }

    /// Writes `value` at (row, col). Out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        if row < self.size && col < self.size {
            self.cells[row * self.size + col] = value;
        }
    }

    /// Row-major iterator over all cells
    pub fn cells(&self) -> impl Iterator<Item = T> + '_ {
        self.cells.iter().copied()
    }

    /// Iterator of ((row, col), value)
    pub fn indexed_cells(&self) -> impl Iterator<Item = ((usize, usize), T)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &v)| ((i / size, i % size), v))
    }

    /// Nested rows, converting each cell with `f`
    pub fn rows_map<U>(&self, f: impl Fn(T) -> U) -> Vec<Vec<U>> {
        if self.size == 0 {
            return Vec::new();
        }
        self.cells
            .chunks(self.size)
            .map(|row| row.iter().map(|&v| f(v)).collect())
            .collect()
    }

    /// Nested rows of the raw cell values
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.rows_map(|v| v)
    }
}

impl<T: Copy> TryFrom<Vec<Vec<T>>> for Grid<T> {
    type Error = NotSquare;

    fn try_from(rows: Vec<Vec<T>>) -> Result<Self, Self::Error> {
        Self::check_square(&rows)?;
        Ok(Grid {
            size: rows.len(),
            cells: rows.into_iter().flatten().collect(),
        })
    }
}

impl<T: Copy> From<Grid<T>> for Vec<Vec<T>> {
    fn from(grid: Grid<T>) -> Self {
        grid.to_rows()
    }
}

impl<T: Copy + PartialEq> Grid<T> {
    /// Number of cells holding `value`
    pub fn count(&self, value: T) -> usize {
        self.cells.iter().filter(|&&v| v == value).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert!(Grid::from_rows(&[vec![0u8, 1], vec![2]]).is_none());
        assert!(Grid::from_rows(&[vec![0u8, 1, 2], vec![0, 1, 2]]).is_none());
    }

    #[test]
    fn rows_round_trip_preserves_layout() {
        let rows = vec![vec![1u8, 2], vec![3, 4]];
        let grid = Grid::from_rows(&rows).unwrap();
        assert_eq!(grid.get(1, 0), Some(3));
        assert_eq!(grid.to_rows(), rows);
    }

    #[test]
    fn yaml_uses_nested_rows() {
        let mut grid = Grid::filled(2, 0u8);
        grid.set(1, 0, 5);
        let text = serde_yaml::to_string(&grid).unwrap();
        let back: Grid<u8> = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, grid);
        assert_eq!(back.get(1, 0), Some(5));
    }

    #[test]
    fn yaml_with_mismatched_rows_is_rejected() {
        assert!(serde_yaml::from_str::<Grid<u8>>("[[1, 2], [3]]").is_err());
        assert!(serde_yaml::from_str::<Grid<u8>>("[[1, 2, 3]]").is_err());
        // the old struct layout cannot smuggle in a short cell buffer
        assert!(serde_yaml::from_str::<Grid<u8>>("size: 4\ncells: [1]").is_err());
    }

    #[test]
    fn ragged_rows_report_first_bad_row() {
        let rows = vec![vec![0u8, 0, 0], vec![0, 0, 0], vec![0, 0]];
        assert_eq!(
            Grid::try_from(rows),
            Err(NotSquare {
                row: 2,
                found: 2,
                expected: 3
            })
        );
    }

    #[test]
    fn out_of_range_access_is_ignored() {
        let mut grid = Grid::filled(2, 0u8);
        grid.set(5, 5, 9);
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.count(0), 4);
    }
}
