use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Cell ({row}, {col}) is out of bounds for grid size ({rows}, {cols})")]
    OutOfBounds {
        row: i64,
        col: i64,
        rows: usize,
        cols: usize,
    },
}

/// Represents errors raised while parsing a map description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapFormatError {
    #[error("Map description is empty")]
    Empty,
    #[error("Map description must start with a row and a column count")]
    MissingDimensions,
    #[error("Token {index} ('{token}') is not an integer")]
    InvalidToken { index: usize, token: String },
    #[error("Map dimensions ({rows}, {cols}) must both be positive")]
    ZeroDimension { rows: i64, cols: i64 },
    #[error("Map dimensions ({rows}, {cols}) are too large")]
    TooLarge { rows: usize, cols: usize },
    #[error("Map declares {expected} cells but supplies {found}")]
    CellCountMismatch { expected: usize, found: usize },
    #[error("Unknown cell code {code} at ({row}, {col})")]
    UnknownCellCode { code: i64, row: usize, col: usize },
}

/// A generic 2D grid structure.
///
/// Stores elements of type `T` in a flat vector using row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled by a generator function.
    ///
    /// The generator function `f` takes `(row, col)` coordinates and returns the
    /// value for that cell. Generation stops at the first error.
    pub fn try_from_generator<F, E>(rows: usize, cols: usize, mut f: F) -> Result<Self, E>
    where
        F: FnMut(usize, usize) -> Result<T, E>,
    {
        let mut cells = Vec::with_capacity(rows.saturating_mul(cols));
        for row in 0..rows {
            for col in 0..cols {
                cells.push(f(row, col)?);
            }
        }
        Ok(Grid { rows, cols, cells })
    }

    /// Returns the number of rows in the grid.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns in the grid.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Converts signed (row, col) coordinates to a flat vector index.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    #[inline]
    pub fn coords_to_index(&self, row: i64, col: i64) -> Option<usize> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    /// Gets a reference to the cell at the given coordinates, or an
    /// `OutOfBounds` error naming the offending indices.
    pub fn get(&self, row: i64, col: i64) -> Result<&T, GridError> {
        self.coords_to_index(row, col)
            .and_then(|index| self.cells.get(index))
            .ok_or(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
    }

    /// Returns an iterator that yields `((row, col), &T)` for each cell in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| ((index / cols, index % cols), cell))
    }
}

/// What occupies one map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Floor,
    Wall,
    Door,
    Spawn,
    KeyA,
    KeyB,
}

impl CellKind {
    /// Maps a numeric cell code from a map description. Codes 0 and 1 are both floor.
    pub fn from_code(code: i64) -> Option<CellKind> {
        match code {
            0 | 1 => Some(CellKind::Floor),
            2 => Some(CellKind::Wall),
            3 => Some(CellKind::Door),
            4 => Some(CellKind::Spawn),
            5 => Some(CellKind::KeyA),
            6 => Some(CellKind::KeyB),
            _ => None,
        }
    }

    /// Walls and doors stop the player.
    #[inline]
    pub fn is_blocking(self) -> bool {
        matches!(self, CellKind::Wall | CellKind::Door)
    }

    #[inline]
    pub fn is_key(self) -> bool {
        matches!(self, CellKind::KeyA | CellKind::KeyB)
    }
}

/// The level layout. Built once from a map description and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMap {
    grid: Grid<CellKind>,
}

impl TileMap {
    /// Parses a map description.
    ///
    /// The description is a whitespace separated list of integers: the row
    /// count, the column count, then exactly `rows * cols` cell codes in
    /// row-major order. Line breaks carry no meaning.
    pub fn parse(description: &str) -> Result<TileMap, MapFormatError> {
        let values = description
            .split_whitespace()
            .enumerate()
            .map(|(index, token)| {
                token
                    .parse::<i64>()
                    .map_err(|_| MapFormatError::InvalidToken {
                        index,
                        token: token.to_string(),
                    })
            })
            .collect::<Result<Vec<i64>, _>>()?;

        let (rows, cols, codes) = match values.as_slice() {
            [] => return Err(MapFormatError::Empty),
            [_] => return Err(MapFormatError::MissingDimensions),
            [rows, cols, codes @ ..] => (*rows, *cols, codes),
        };
        if rows <= 0 || cols <= 0 {
            return Err(MapFormatError::ZeroDimension { rows, cols });
        }

        let (rows, cols) = (rows as usize, cols as usize);
        let expected = rows
            .checked_mul(cols)
            .ok_or(MapFormatError::TooLarge { rows, cols })?;
        if codes.len() != expected {
            return Err(MapFormatError::CellCountMismatch {
                expected,
                found: codes.len(),
            });
        }

        let grid = Grid::try_from_generator(rows, cols, |row, col| {
            let code = codes[row * cols + col];
            CellKind::from_code(code).ok_or(MapFormatError::UnknownCellCode { code, row, col })
        })?;
        info!(rows, cols, "map loaded");
        Ok(TileMap { grid })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    /// Looks up a cell. Indices are signed so callers can pass floor/ceil of
    /// world coordinates directly; anything outside the declared dimensions
    /// is an error, never a neighbouring cell.
    pub fn cell_at(&self, row: i64, col: i64) -> Result<CellKind, GridError> {
        self.grid.get(row, col).copied()
    }

    /// Iterates `((row, col), kind)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), CellKind)> + '_ {
        self.grid.enumerate().map(|(coords, kind)| (coords, *kind))
    }

    /// Finds the last cell in row-major order matching `pred`.
    pub fn find_last<P>(&self, mut pred: P) -> Option<((usize, usize), CellKind)>
    where
        P: FnMut(CellKind) -> bool,
    {
        self.cells().filter(|(_, kind)| pred(*kind)).last()
    }
}

impl FromStr for TileMap {
    type Err = MapFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TileMap::parse(s)
    }
}
