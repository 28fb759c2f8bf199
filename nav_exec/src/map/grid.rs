//! # Grid
//!
//! Growable 2D cell store. Cells are indexed `[row][col]` with rows pointing
//! down. The grid remembers where the world origin (the robot's first cell)
//! sits, so that growing in any direction never moves the logical origin.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

use comms_if::eqpt::nav::Entity;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Index of a single cell. Signed so that positions just off the grid can be
/// represented before the grid grows to fit them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellIndex {
    pub row: isize,
    pub col: isize,
}

/// Amount the existing contents moved by when the grid grew. Any stored grid
/// coordinate must be offset by this much to keep pointing at the same place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Shift {
    pub rows: isize,
    pub cols: isize,
}

/// The cell store.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Array2<Cell>,

    /// Number of entries in the backtrack window referring to each cell.
    visits: Array2<u8>,

    /// Grid index of the world origin
    origin: CellIndex,

    /// Growth beyond this many cells is an allocation failure
    max_cells: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Contents of a cell.
///
/// The discriminants are the wire codes used in map snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Cell {
    Free = 0,
    Obstacle = 1,
    RobotFootprint = 2,
    /// Blocked because it is within the robot's half extent of an obstacle
    Inflated = 3,
    Plant = 4,
}

/// Errors raised by grid access.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("Cell ({}, {}) is outside the {rows}x{cols} grid", .index.row, .index.col)]
    OutOfBounds {
        index: CellIndex,
        rows: usize,
        cols: usize,
    },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CellIndex {
    pub fn new(row: isize, col: isize) -> Self {
        Self { row, col }
    }

    /// The cell containing the fractional grid position `(x, y)`.
    ///
    /// Rounds half away from zero.
    pub fn from_position(x: f64, y: f64) -> Self {
        Self {
            row: y.round() as isize,
            col: x.round() as isize,
        }
    }

    /// Manhattan distance to another cell.
    pub fn manhattan(&self, other: &CellIndex) -> isize {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    pub fn shifted(&self, shift: Shift) -> Self {
        Self {
            row: self.row + shift.rows,
            col: self.col + shift.cols,
        }
    }
}

impl Shift {
    pub fn is_zero(&self) -> bool {
        self.rows == 0 && self.cols == 0
    }
}

impl Cell {
    /// The code of this cell in snapshots
    pub fn code(self) -> i32 {
        self as i32
    }

    /// The cell with the given snapshot code, if there is one.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Cell::Free),
            1 => Some(Cell::Obstacle),
            2 => Some(Cell::RobotFootprint),
            3 => Some(Cell::Inflated),
            4 => Some(Cell::Plant),
            _ => None,
        }
    }

    /// Cells which can never be entered.
    pub fn is_hard_blocked(self) -> bool {
        matches!(self, Cell::Obstacle | Cell::Inflated)
    }

    /// Cells which can be entered at a penalty.
    pub fn is_soft(self) -> bool {
        matches!(self, Cell::Plant)
    }

    /// Cells with nothing in them.
    pub fn is_vacant(self) -> bool {
        matches!(self, Cell::Free | Cell::RobotFootprint)
    }

    /// Cells which seed inflation.
    pub fn is_inflation_source(self) -> bool {
        matches!(self, Cell::Obstacle | Cell::Plant)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Free
    }
}

impl From<Entity> for Cell {
    fn from(entity: Entity) -> Self {
        match entity {
            Entity::Obstacle => Cell::Obstacle,
            Entity::Plant => Cell::Plant,
        }
    }
}

impl Grid {
    /// Create a new empty grid. Dimensions are clamped to at least one cell.
    pub fn new(rows: usize, cols: usize, origin: CellIndex, max_cells: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);

        if rows.saturating_mul(cols) > max_cells {
            util::raise_error!(
                "Cannot allocate a {}x{} grid, the limit is {} cells",
                rows,
                cols,
                max_cells
            );
        }

        Self {
            cells: Array2::from_elem((rows, cols), Cell::Free),
            visits: Array2::zeros((rows, cols)),
            origin,
            max_cells,
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    /// Grid index of the world origin
    pub fn origin(&self) -> CellIndex {
        self.origin
    }

    pub fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }

    /// Pure bounds predicate.
    pub fn is_inside(&self, index: CellIndex) -> bool {
        self.to_usize(index).is_some()
    }

    /// Read a cell, failing if it is outside the grid.
    pub fn get(&self, index: CellIndex) -> Result<Cell, GridError> {
        let idx = self.checked(index)?;
        Ok(self.cells[idx])
    }

    /// Write a cell, failing if it is outside the grid.
    pub fn set(&mut self, index: CellIndex, cell: Cell) -> Result<(), GridError> {
        let idx = self.checked(index)?;
        self.cells[idx] = cell;
        Ok(())
    }

    /// True if the cell is inside the grid and currently in the backtrack
    /// window.
    pub fn is_visited(&self, index: CellIndex) -> bool {
        match self.to_usize(index) {
            Some(idx) => self.visits[idx] > 0,
            None => false,
        }
    }

    pub(crate) fn add_visit(&mut self, index: CellIndex) {
        if let Some(idx) = self.to_usize(index) {
            self.visits[idx] = self.visits[idx].saturating_add(1);
        }
    }

    pub(crate) fn remove_visit(&mut self, index: CellIndex) {
        if let Some(idx) = self.to_usize(index) {
            self.visits[idx] = self.visits[idx].saturating_sub(1);
        }
    }

    pub(crate) fn clear_visits(&mut self) {
        self.visits.fill(0);
    }

    /// Replace every cell of one kind with another.
    pub(crate) fn replace_all(&mut self, from: Cell, to: Cell) {
        self.cells.mapv_inplace(|c| if c == from { to } else { c });
    }

    /// Grow the grid so that `index` is addressable.
    ///
    /// Each exceeded side is padded by `max(prealloc_cells, overflow)`. The
    /// existing contents and the origin move by the returned shift, which is
    /// zero if the index already fits.
    ///
    /// Growing past the cell limit is unrecoverable.
    pub fn ensure_fit(&mut self, index: CellIndex, prealloc_cells: usize) -> Shift {
        let rows = self.rows() as isize;
        let cols = self.cols() as isize;

        let pad = |overflow: isize| -> usize {
            if overflow > 0 {
                (overflow as usize).max(prealloc_cells)
            } else {
                0
            }
        };

        let pad_top = pad(-index.row);
        let pad_bottom = pad(index.row - rows + 1);
        let pad_left = pad(-index.col);
        let pad_right = pad(index.col - cols + 1);

        if pad_top + pad_bottom + pad_left + pad_right == 0 {
            return Shift::default();
        }

        let new_rows = self
            .rows()
            .checked_add(pad_top)
            .and_then(|r| r.checked_add(pad_bottom));
        let new_cols = self
            .cols()
            .checked_add(pad_left)
            .and_then(|c| c.checked_add(pad_right));

        let (new_rows, new_cols) = match (new_rows, new_cols) {
            (Some(r), Some(c)) if r.checked_mul(c).map_or(false, |n| n <= self.max_cells) => (r, c),
            _ => util::raise_error!(
                "Cannot grow the {}x{} grid to fit ({}, {}), the limit is {} cells",
                self.rows(),
                self.cols(),
                index.row,
                index.col,
                self.max_cells
            ),
        };

        let old_rows = self.rows();
        let old_cols = self.cols();

        let mut cells = Array2::from_elem((new_rows, new_cols), Cell::Free);
        cells
            .slice_mut(s![
                pad_top..pad_top + old_rows,
                pad_left..pad_left + old_cols
            ])
            .assign(&self.cells);

        let mut visits = Array2::zeros((new_rows, new_cols));
        visits
            .slice_mut(s![
                pad_top..pad_top + old_rows,
                pad_left..pad_left + old_cols
            ])
            .assign(&self.visits);

        self.cells = cells;
        self.visits = visits;

        let shift = Shift {
            rows: pad_top as isize,
            cols: pad_left as isize,
        };
        self.origin = self.origin.shifted(shift);

        debug!(
            "Grid grown from {}x{} to {}x{} (shift {:?})",
            old_rows, old_cols, new_rows, new_cols, shift
        );

        shift
    }

    fn to_usize(&self, index: CellIndex) -> Option<(usize, usize)> {
        if index.row < 0 || index.col < 0 {
            return None;
        }

        let (r, c) = (index.row as usize, index.col as usize);
        if r < self.rows() && c < self.cols() {
            Some((r, c))
        } else {
            None
        }
    }

    fn checked(&self, index: CellIndex) -> Result<(usize, usize), GridError> {
        self.to_usize(index).ok_or(GridError::OutOfBounds {
            index,
            rows: self.rows(),
            cols: self.cols(),
        })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
