//! Parameters structure for NavCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::map::MapParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Navigation control.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavCtrlParams {
    // ---- WORLD ----
    /// Width of the area covered by the map when it is created. The map
    /// grows beyond this as the robot explores.
    ///
    /// Units: centimetres
    pub world_width_cm: f64,

    /// Height of the area covered by the map when it is created.
    ///
    /// Units: centimetres
    pub world_height_cm: f64,

    // ---- ROBOT ----
    /// Width of the robot's body.
    ///
    /// Units: centimetres
    pub robot_width_cm: i32,

    /// Length of the robot's body.
    ///
    /// Units: centimetres
    pub robot_height_cm: i32,

    // ---- MAP ----
    pub map: MapParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for NavCtrlParams {
    fn default() -> Self {
        Self {
            world_width_cm: 400.0,
            world_height_cm: 400.0,
            robot_width_cm: 0,
            robot_height_cm: 0,
            map: MapParams::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
