//! crates/floorplan_core/src/grid.rs
//!
//! The rectangular floor-plan grid.
//!
//! Every operation that changes a square returns a new `Grid` and leaves the
//! receiver untouched. A grid is always fully populated: `cells.len() == rows`
//! and every row holds exactly `cols` squares whose coordinates match their
//! position.

use crate::domain::{ProductId, Square, SquareType};

/// Errors raised by grid construction and square lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Grid dimensions must be positive, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("Square ({row}, {col}) is outside a {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

/// Errors raised while reading a persisted layout.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Layout is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Layout has no squares")]
    Empty,
    #[error("Layout row {row} has {found} squares, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Square at ({row}, {col}) claims to be at ({claimed_row}, {claimed_col})")]
    Misplaced {
        row: usize,
        col: usize,
        claimed_row: usize,
        claimed_col: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<Square>>,
}

impl Grid {
    /// Builds a grid of empty squares.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidDimensions { rows, cols });
        }
        let cells = (0..rows)
            .map(|row| (0..cols).map(|col| Square::empty(row, col)).collect())
            .collect();
        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cells(&self) -> &[Vec<Square>] {
        &self.cells
    }

    pub fn square(&self, row: usize, col: usize) -> Option<&Square> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    /// Iterates the squares in row-major order.
    pub fn squares(&self) -> impl Iterator<Item = &Square> {
        self.cells.iter().flatten()
    }

    pub fn contains_product(&self, product_id: &ProductId) -> bool {
        self.squares().any(|square| square.holds(product_id))
    }

    /// Returns a copy with square `(row, col)` set to `kind`.
    pub fn with_square_type(
        &self,
        row: usize,
        col: usize,
        kind: SquareType,
    ) -> Result<Self, GridError> {
        self.with_square(row, col, |square| square.kind = kind)
    }

    /// Returns a copy where `product_id` is removed from square `(row, col)`
    /// if present, or appended otherwise.
    pub fn with_product_toggled(
        &self,
        row: usize,
        col: usize,
        product_id: &ProductId,
    ) -> Result<Self, GridError> {
        self.with_square(row, col, |square| {
            if square.holds(product_id) {
                square.product_ids.retain(|id| id != product_id);
            } else {
                square.product_ids.push(product_id.clone());
            }
        })
    }

    /// Returns a copy where no square references `product_id`.
    pub fn without_product(&self, product_id: &ProductId) -> Self {
        let mut next = self.clone();
        for square in next.cells.iter_mut().flatten() {
            square.product_ids.retain(|id| id != product_id);
        }
        next
    }

    /// Replaces the grid with a fresh one of the new size. Nothing from the
    /// current layout is carried over.
    pub fn resized(&self, rows: usize, cols: usize) -> Result<Self, GridError> {
        Self::new(rows, cols)
    }

    /// The canonical persisted form: the row-major `cells` array as JSON.
    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.cells)
    }

    /// Parses the persisted form, rejecting anything that is not a fully
    /// rectangular grid with consistent coordinates.
    pub fn deserialize(text: &str) -> Result<Self, ParseError> {
        let cells: Vec<Vec<Square>> = serde_json::from_str(text)?;
        let cols = cells.first().map(Vec::len).unwrap_or(0);
        if cells.is_empty() || cols == 0 {
            return Err(ParseError::Empty);
        }

        for (row, squares) in cells.iter().enumerate() {
            if squares.len() != cols {
                return Err(ParseError::Ragged {
                    row,
                    expected: cols,
                    found: squares.len(),
                });
            }
            for (col, square) in squares.iter().enumerate() {
                if square.row != row || square.col != col {
                    return Err(ParseError::Misplaced {
                        row,
                        col,
                        claimed_row: square.row,
                        claimed_col: square.col,
                    });
                }
            }
        }

        Ok(Self {
            rows: cells.len(),
            cols,
            cells,
        })
    }

    fn with_square(
        &self,
        row: usize,
        col: usize,
        edit: impl FnOnce(&mut Square),
    ) -> Result<Self, GridError> {
        let mut next = self.clone();
        let square = next
            .cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })?;
        edit(square);
        Ok(next)
    }
}
