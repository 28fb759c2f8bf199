//! # Navigation library.
//!
//! This library allows other crates in the workspace, and the executables in this crate, to
//! access the mapping and planning engine.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Occupancy grid map - dead reckons the robot and records what it has seen
pub mod map;

/// Navigation - plans the next motion toward the target
pub mod nav;

/// Navigation control module - cyclic wrapper applying telecommands to the map
pub mod nav_ctrl;

/// Executable parameters
pub mod params;

/// Debug rendering of the map
pub mod render;

/// Simulated drive and sensor, closing the loop without hardware
pub mod sim_drive;
