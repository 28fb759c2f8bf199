//! # Pose tracking
//!
//! Dead reckoning of the robot's position in fractional grid coordinates.
//! The pose is only ever changed by [`MapState::apply_motion`] and
//! [`MapState::apply_turn`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use nalgebra::Vector2;
use serde::Serialize;

use util::maths::norm_deg_360;

use super::{CellIndex, GridError, MapState, Shift};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Position and heading of the robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose {
    /// Fractional grid position, `x` along the columns and `y` down the rows.
    pub position: Vector2<f64>,

    /// Heading in [0, 360) degrees, counter-clockwise from +X.
    pub heading_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose {
    pub fn new(position: Vector2<f64>, heading_deg: f64) -> Self {
        Self {
            position,
            heading_deg,
        }
    }

    /// The cell the robot is in.
    pub fn cell(&self) -> CellIndex {
        CellIndex::from_position(self.position.x, self.position.y)
    }

    /// Unit vector along the heading in grid coordinates. Rows point down so
    /// the Y component is negated.
    pub fn direction(&self) -> Vector2<f64> {
        let heading_rad = self.heading_deg.to_radians();
        Vector2::new(heading_rad.cos(), -heading_rad.sin())
    }

    pub(crate) fn shift(&mut self, shift: Shift) {
        self.position.x += shift.cols as f64;
        self.position.y += shift.rows as f64;
    }
}

impl MapState {
    /// Advance the robot by `distance_cm` along `heading_deg`.
    ///
    /// The motion is split into `max(2, ceil(|distance| / (precision / 2)))`
    /// equal sub-steps so that no cell the robot passes through is skipped.
    /// Each sub-step grows the grid as needed and stamps the robot's
    /// footprint. Negative distances drive backwards.
    pub(crate) fn apply_motion(&mut self, distance_cm: f64, heading_deg: f64) -> Result<(), GridError> {
        if !distance_cm.is_finite() || !heading_deg.is_finite() {
            return Err(GridError::DegenerateGeometry(format!(
                "cannot move {} cm along {} deg",
                distance_cm, heading_deg
            )));
        }

        let precision = self.precision_cm();
        let subdivisions = ((distance_cm.abs() / (precision / 2.0)).ceil() as usize).max(2);
        let step_cells = distance_cm / precision / subdivisions as f64;
        let step = Pose::new(Vector2::zeros(), heading_deg).direction() * step_cells;

        for _ in 0..subdivisions {
            self.pose.position += step;

            let cell = self.fit_footprint(self.pose.cell());
            self.stamp(cell);
        }

        trace!(
            "Moved {} cm along {:.1} deg to ({:.3}, {:.3})",
            distance_cm,
            heading_deg,
            self.pose.position.x,
            self.pose.position.y
        );

        Ok(())
    }

    /// Turn the robot by `delta_deg`, counter-clockwise positive. Returns the
    /// new heading.
    pub(crate) fn apply_turn(&mut self, delta_deg: f64) -> Result<f64, GridError> {
        if !delta_deg.is_finite() {
            return Err(GridError::DegenerateGeometry(format!(
                "cannot turn by {} deg",
                delta_deg
            )));
        }

        self.pose.heading_deg = norm_deg_360(self.pose.heading_deg + delta_deg);

        trace!("Turned {} deg to {:.1} deg", delta_deg, self.pose.heading_deg);

        Ok(self.pose.heading_deg)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
