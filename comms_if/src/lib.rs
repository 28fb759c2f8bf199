//! # Communications interface crate.
//!
//! Provides the common interfaces between the navigation engine, its collaborators (drivers,
//! sensors, vision) and the telecommand sources.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Data exchanged with the navigation equipment (motions, map snapshots, entities)
pub mod eqpt;
