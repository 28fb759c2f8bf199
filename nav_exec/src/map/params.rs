//! Parameters structure for the map

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the occupancy grid and its planner.
///
/// Missing keys take their default values, so an empty table is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapParams {
    // ---- GRID ----
    /// Size of a cell.
    ///
    /// Units: centimetres per cell
    pub precision_cm: i32,

    /// Growth of the grid beyond this many cells is unrecoverable.
    pub max_grid_cells: usize,

    // ---- POSE ----
    /// Heading of the robot when the map is created, counter-clockwise from +X.
    ///
    /// Units: degrees
    pub initial_heading_deg: f64,

    // ---- PLANNING ----
    /// Number of recently visited cells kept for backtrack prevention.
    pub backtrack_window: usize,

    /// Distance from the target at which it is considered reached.
    ///
    /// Units: cells
    pub arrival_threshold_cells: f64,

    /// Cost of entering a plant cell, a free cell costs 1.
    pub soft_obstacle_cost: f64,

    /// Radius around the robot searched for alternate start cells when no
    /// path exists from the current cell.
    ///
    /// Units: cells
    pub alt_start_radius_cells: isize,
}

impl Default for MapParams {
    fn default() -> Self {
        Self {
            precision_cm: 4,
            max_grid_cells: 16_777_216,
            initial_heading_deg: 90.0,
            backtrack_window: 4,
            arrival_threshold_cells: 0.5,
            soft_obstacle_cost: 100.0,
            alt_start_radius_cells: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
