//! # Map state
//!
//! Everything the map owns, without the locking or the event fan-out the
//! [`Map`](super::Map) facade adds. Pose, footprint and inflation behaviour
//! are implemented on this struct in their own modules.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::warn;
use nalgebra::Vector2;

use comms_if::eqpt::nav::MapSnapshot;

use super::{Cell, CellIndex, Footprint, Grid, MapParams, Pose, Shift};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The map's data.
#[derive(Debug, Clone)]
pub struct MapState {
    pub(crate) params: MapParams,

    pub(crate) grid: Grid,

    pub(crate) pose: Pose,

    /// Target in fractional grid coordinates
    pub(crate) target: Option<Vector2<f64>>,

    pub(crate) footprint: Footprint,

    /// Padding used on each side when the grid has to grow.
    pub(crate) prealloc_cells: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MapState {
    /// Create a map covering the given world extent, with the robot in the
    /// centre cell.
    pub fn new(width_cm: f64, height_cm: f64, mut params: MapParams) -> Self {
        if params.precision_cm < 1 {
            warn!(
                "Map precision of {} cm/cell is invalid, using 1 cm/cell",
                params.precision_cm
            );
            params.precision_cm = 1;
        }

        if !width_cm.is_finite() || !height_cm.is_finite() {
            warn!(
                "Map extent {} x {} cm is not finite, creating a single cell map",
                width_cm, height_cm
            );
        }

        let precision = params.precision_cm as f64;

        // NaN and negative extents saturate to zero, and the grid clamps to one cell
        let cols = (width_cm / precision).floor() as usize;
        let rows = (height_cm / precision).floor() as usize;
        let (rows, cols) = (rows.max(1), cols.max(1));

        let origin = CellIndex::new((rows / 2) as isize, (cols / 2) as isize);
        let grid = Grid::new(rows, cols, origin, params.max_grid_cells);
        let pose = Pose::new(
            Vector2::new(origin.col as f64, origin.row as f64),
            util::maths::norm_deg_360(params.initial_heading_deg),
        );
        let footprint = Footprint::new(params.backtrack_window);

        let mut state = Self {
            params,
            grid,
            pose,
            target: None,
            footprint,
            prealloc_cells: 0,
        };

        state.stamp(origin);

        state
    }

    pub fn params(&self) -> &MapParams {
        &self.params
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn target(&self) -> Option<Vector2<f64>> {
        self.target
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    pub fn precision_cm(&self) -> f64 {
        self.params.precision_cm as f64
    }

    /// The cell the robot is currently in.
    pub fn current_cell(&self) -> CellIndex {
        self.pose.cell()
    }

    /// Grow the grid if needed so that `index` is addressable, moving every
    /// stored grid coordinate along with the contents.
    pub(crate) fn ensure_fit(&mut self, index: CellIndex) -> Shift {
        let shift = self.grid.ensure_fit(index, self.prealloc_cells);

        if !shift.is_zero() {
            self.pose.shift(shift);

            if let Some(t) = self.target.as_mut() {
                t.x += shift.cols as f64;
                t.y += shift.rows as f64;
            }

            self.footprint.shift(shift);
        }

        shift
    }

    /// Write a cell, growing the grid to fit it first. Returns where the cell
    /// ended up after any growth.
    pub(crate) fn write_cell(&mut self, index: CellIndex, cell: Cell) -> CellIndex {
        let index = index.shifted(self.ensure_fit(index));

        // Inside after the fit, so the write can't fail
        if let Err(e) = self.grid.set(index, cell) {
            warn!("Write to {:?} failed after fitting the grid: {}", index, e);
        }

        index
    }

    /// Set the padding hint used when the grid grows.
    pub(crate) fn set_prealloc_cm(&mut self, prealloc_cm: i32) {
        self.prealloc_cells = (prealloc_cm.max(0) / self.params.precision_cm) as usize;
    }

    /// Convert centimetre offsets from the start point (X right, Y up) into
    /// fractional grid coordinates.
    pub fn world_to_grid(&self, x_cm: f64, y_cm: f64) -> Vector2<f64> {
        let origin = self.grid.origin();
        let precision = self.precision_cm();

        Vector2::new(
            origin.col as f64 + x_cm / precision,
            origin.row as f64 - y_cm / precision,
        )
    }

    /// Convert fractional grid coordinates into centimetre offsets from the
    /// start point (X right, Y up).
    pub fn grid_to_world(&self, x: f64, y: f64) -> Vector2<f64> {
        let origin = self.grid.origin();
        let precision = self.precision_cm();

        Vector2::new(
            (x - origin.col as f64) * precision,
            (origin.row as f64 - y) * precision,
        )
    }

    /// Serialisable copy of the grid and the robot's position.
    pub fn snapshot(&self) -> MapSnapshot {
        let array = self
            .grid
            .cells()
            .outer_iter()
            .map(|row| row.iter().map(|c| c.code()).collect())
            .collect();

        MapSnapshot {
            array,
            current_x: self.pose.position.x,
            current_y: self.pose.position.y,
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            precision: self.params.precision_cm,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = MapState::new(200.0, 100.0, MapParams::default());

        assert_eq!(state.grid().rows(), 25);
        assert_eq!(state.grid().cols(), 50);
        assert_eq!(state.current_cell(), CellIndex::new(12, 25));
        assert_eq!(state.grid().origin(), CellIndex::new(12, 25));
        assert_eq!(state.pose().heading_deg, 90.0);
        assert_eq!(
            state.grid().get(state.current_cell()),
            Ok(Cell::RobotFootprint)
        );
        assert!(state.target().is_none());
    }

    #[test]
    fn test_degenerate_extent() {
        let state = MapState::new(std::f64::NAN, -20.0, MapParams::default());

        assert_eq!((state.grid().rows(), state.grid().cols()), (1, 1));
        assert_eq!(state.current_cell(), CellIndex::new(0, 0));
    }

    #[test]
    fn test_growth_moves_everything() {
        let mut state = MapState::new(40.0, 40.0, MapParams::default());
        state.target = Some(Vector2::new(2.0, 3.0));
        let before = state.current_cell();

        let idx = state.write_cell(CellIndex::new(-2, -1), Cell::Obstacle);

        assert_eq!(idx, CellIndex::new(0, 0));
        assert_eq!(state.grid().get(idx), Ok(Cell::Obstacle));
        assert_eq!(state.current_cell(), CellIndex::new(before.row + 2, before.col + 1));
        assert_eq!(state.target(), Some(Vector2::new(3.0, 5.0)));
        assert_eq!(state.footprint().window().back(), Some(&state.current_cell()));
        assert!(state.grid().is_visited(state.current_cell()));
        assert!(state.grid().is_inside(state.current_cell()));
    }

    #[test]
    fn test_world_grid_conversion() {
        let state = MapState::new(200.0, 200.0, MapParams::default());

        assert_eq!(state.world_to_grid(0.0, 0.0), Vector2::new(25.0, 25.0));
        assert_eq!(state.world_to_grid(20.0, 8.0), Vector2::new(30.0, 23.0));
        assert_eq!(state.grid_to_world(30.0, 23.0), Vector2::new(20.0, 8.0));
    }

    #[test]
    fn test_snapshot() {
        let mut state = MapState::new(12.0, 8.0, MapParams::default());
        state.write_cell(CellIndex::new(0, 0), Cell::Plant);

        let snap = state.snapshot();

        assert_eq!((snap.rows, snap.cols), (2, 3));
        assert_eq!(snap.array, vec![vec![4, 0, 0], vec![0, 2, 0]]);
        assert_eq!((snap.current_x, snap.current_y), (1.0, 1.0));
        assert_eq!(snap.precision, 4);
    }
}
