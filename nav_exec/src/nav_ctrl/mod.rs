//! Navigation control module
//!
//! Cyclic module wrapping the [`Map`](crate::map::Map). Each cycle it applies
//! the telecommands received since the last one, then plans the next motion
//! toward the target.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

use crate::map::MapError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during NavCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum NavCtrlError {
    #[error("NavCtrl has not been initialised")]
    NotInitialised,

    #[error("Could not create the NavCtrl archives: {0}")]
    ArchiveInitError(String),

    #[error("Map error: {0}")]
    MapError(#[from] MapError),
}
