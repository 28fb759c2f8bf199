//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged between the navigation engine
//! and the collaborators driving it.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod nav;
