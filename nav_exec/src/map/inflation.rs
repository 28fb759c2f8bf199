//! # Obstacle inflation
//!
//! Obstacles and plants are grown by the robot's half extent so that the
//! planner can treat the robot as a point. Grown cells are marked
//! [`Cell::Inflated`], which keeps them distinct from the sources so that
//! inflation can be redone from scratch when the robot size changes.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, warn};

use comms_if::eqpt::nav::Entity;

use super::{Cell, CellIndex, GridError, MapState};

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MapState {
    /// Record an entity seen straight ahead at `distance_cm`.
    ///
    /// Reports landing outside the grid are rejected rather than growing the
    /// grid, since sensor ranges are short compared to the map.
    pub(crate) fn report_obstacle(
        &mut self,
        entity: Entity,
        distance_cm: f64,
    ) -> Result<CellIndex, GridError> {
        if !distance_cm.is_finite() {
            return Err(GridError::DegenerateGeometry(format!(
                "cannot place an entity {} cm away",
                distance_cm
            )));
        }

        let cells = (distance_cm / self.precision_cm()).round();
        let reach = self.pose.direction() * cells;
        let index = CellIndex::from_position(
            self.pose.position.x + reach.x,
            self.pose.position.y + reach.y,
        );

        if !self.grid.is_inside(index) {
            warn!(
                "{:?} at {} cm lands outside the grid at {:?}, ignoring",
                entity, distance_cm, index
            );
            return Err(GridError::OutOfBounds {
                index,
                rows: self.grid.rows(),
                cols: self.grid.cols(),
            });
        }

        self.grid.set(index, Cell::from(entity))?;
        self.inflate();

        debug!("{:?} added at {:?}", entity, index);

        Ok(index)
    }

    /// Block every free cell within the inflation radius of an obstacle or
    /// plant. Footprint cells keep their mark. Sources are read from a
    /// snapshot taken before any cell is blocked, so inflated cells never
    /// seed further inflation.
    pub(crate) fn inflate(&mut self) {
        let r = self.footprint.radius_cells as isize;
        if r == 0 {
            return;
        }

        let snapshot = self.grid.cells().clone();

        for ((row, col), cell) in snapshot.indexed_iter() {
            if !cell.is_inflation_source() {
                continue;
            }

            let (row, col) = (row as isize, col as isize);
            for dr in -r..=r {
                for dc in -r..=r {
                    let index = CellIndex::new(row + dr, col + dc);
                    if self.grid.get(index) == Ok(Cell::Free) {
                        self.grid.set(index, Cell::Inflated).ok();
                    }
                }
            }
        }
    }

    /// Clear all inflation and redo it with the current radius.
    pub(crate) fn reinflate(&mut self) {
        self.grid.replace_all(Cell::Inflated, Cell::Free);
        self.inflate();
    }

    /// Set the robot's body size and reinflate the map. Returns the new
    /// inflation radius.
    pub(crate) fn set_robot_size(&mut self, width_cm: i32, height_cm: i32) -> usize {
        let radius = self
            .footprint
            .set_size(width_cm, height_cm, self.params.precision_cm);

        // The body envelope around the robot must be addressable
        let current = self.current_cell();
        self.fit_footprint(current);
        self.reinflate();

        debug!(
            "Robot size set to {}x{} cm, inflation radius {} cells",
            width_cm, height_cm, radius
        );

        radius
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
