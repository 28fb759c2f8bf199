//! # Map events
//!
//! Observers (displays, loggers, the control loop) subscribe to the map and
//! receive a [`MapEvent`] for every change, in the order the changes were
//! made.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::mpsc::{channel, Receiver, Sender};

use log::trace;
use serde::Serialize;

use comms_if::eqpt::nav::Entity;

use super::CellIndex;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Fan-out of events to every live subscriber.
#[derive(Debug, Default)]
pub(crate) struct EventBus {
    subscribers: Vec<Sender<MapEvent>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A change to the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MapEvent {
    /// Emitted after every change, once the more specific event (if any) has
    /// been sent.
    Updated,

    /// The robot drove straight by the given distance.
    Moved { distance_cm: i32 },

    /// The robot turned.
    Turned { delta_deg: f64, heading_deg: f64 },

    /// The grid grew to the given size.
    Grown { rows: usize, cols: usize },

    /// An obstacle or plant was placed in a cell.
    ObstacleAdded { entity: Entity, cell: CellIndex },

    /// The robot's body size changed.
    RobotResized {
        width_cm: i32,
        height_cm: i32,
        inflation_radius_cells: usize,
    },

    /// A new target was set, in fractional grid coordinates.
    TargetSet { x: f64, y: f64 },

    /// The target was removed.
    TargetCleared { reason: TargetClearReason },
}

/// Why a target stopped being pursued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetClearReason {
    Arrived,
    Unreachable,
    Cancelled,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl EventBus {
    pub fn subscribe(&mut self) -> Receiver<MapEvent> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Send an event to every subscriber, dropping those whose receiver has
    /// gone away.
    pub fn emit(&mut self, event: MapEvent) {
        trace!("Map event: {:?}", event);

        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn num_subscribers(&self) -> usize {
        self.subscribers.len()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
