//! # Navigation Executable Parameters
//!
//! This module provide parameters for the navigation executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{nav_ctrl::NavCtrlParams, sim_drive::SimDriveParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavExecParams {
    /// Simulated time between two cycles
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Execution stops after this many cycles even if the script hasn't ended
    pub max_cycles: u64,

    /// Save the final map snapshot as JSON in the session directory
    pub save_snapshot: bool,

    /// Save the final map as a PNG in the session directory
    pub render_png: bool,

    /// Navigation control parameters, including the map's
    pub nav_ctrl: NavCtrlParams,

    /// Simulated drive and sensor
    pub sim: SimDriveParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for NavExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.1,
            max_cycles: 2000,
            save_snapshot: true,
            render_png: true,
            nav_ctrl: NavCtrlParams::default(),
            sim: SimDriveParams::default(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
