//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::env::{self, VarError};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Environment variable pointing at the root of the software tree, which
/// contains the `params`, `scripts` and `sessions` directories.
pub const SW_ROOT_ENV_VAR: &str = "GRID_NAV_SW_ROOT";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Basic information about the platform the software is running on.
#[derive(Debug, Clone)]
pub struct HostInfo {
    pub os: &'static str,
    pub arch: &'static str,
    pub family: &'static str,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the root directory of the software tree.
pub fn get_sw_root() -> Result<PathBuf, VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}

/// Retrieve information about the host.
pub fn get_host_info() -> HostInfo {
    HostInfo {
        os: env::consts::OS,
        arch: env::consts::ARCH,
        family: env::consts::FAMILY,
    }
}
