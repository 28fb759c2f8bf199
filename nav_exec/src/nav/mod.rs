//! # Navigation
//!
//! Works out the next incremental motion toward the map's target. The
//! strategies are tried in order:
//!
//! 1. Arrival and reachability checks on the target.
//! 2. A straight line of sight to the target, possibly cut short before the
//!    first blocked cell.
//! 3. A* over the grid from the robot's cell.
//! 4. A* from nearby cells the robot can hop to, for when its own cell is
//!    blocked or boxed in.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod astar;
mod planner;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;

use comms_if::eqpt::nav::Motion;

use crate::map::TargetClearReason;

pub use astar::find_path;
pub use planner::plan;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Result of a planning step.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    /// The motion for the drive to execute
    pub motion: Motion,

    /// Which strategy produced the motion
    pub strategy: Strategy,

    /// Where the motion ends, in fractional grid coordinates, if it moves
    pub waypoint: Option<Vector2<f64>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The planning strategies, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    /// No target is set
    NoTarget,

    /// Within the arrival threshold of the target
    Arrived,

    /// The target cell is off the grid or blocked
    TargetBlocked,

    /// Straight to the target
    LineOfSight,

    /// Straight toward the target, stopping short of the first blocked cell
    PartialLineOfSight,

    /// First step of an A* path from the robot's cell
    AStar,

    /// Hop to a nearby cell from which A* finds a path
    AlternateStart,

    /// Nothing found a way to the target
    NoPath,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PlanOutcome {
    pub(crate) fn terminal(strategy: Strategy) -> Self {
        let motion = match strategy {
            Strategy::TargetBlocked | Strategy::NoPath => Motion::unreachable(),
            _ => Motion::done(),
        };

        Self {
            motion,
            strategy,
            waypoint: None,
        }
    }
}

impl Strategy {
    /// The reason the target is dropped after this strategy, if it is.
    pub fn clears_target(&self) -> Option<TargetClearReason> {
        match self {
            Strategy::Arrived => Some(TargetClearReason::Arrived),
            Strategy::TargetBlocked | Strategy::NoPath => Some(TargetClearReason::Unreachable),
            _ => None,
        }
    }
}
