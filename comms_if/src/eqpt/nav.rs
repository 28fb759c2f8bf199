//! # Navigation Equipment Interface
//!
//! Structures passed between the map/planner and the collaborators around it: the entities which
//! can be reported to the map, the motion commands the planner hands to the drive, and the
//! serialised form of the map.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Angles with a magnitude at or below this value are not worth commanding a turn for.
pub const HAS_ANGLE_THRESHOLD_DEG: f64 = 1e-3;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The next incremental motion toward the current target.
///
/// The drive is expected to turn by `angle_deg` (if `has_angle`) and then drive straight for
/// `distance_cm`, before asking the planner for the next motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Motion {
    /// Distance to drive after turning, rounded to the nearest centimetre.
    pub distance_cm: i32,

    /// Turn relative to the current heading, in (-180, 180] degrees. Positive is counter-clockwise.
    pub angle_deg: f64,

    /// There is nothing left to do: either no target is set or the target has been reached.
    pub done: bool,

    /// The target cannot be reached from the current position.
    pub unreachable: bool,

    /// The angle is large enough to be worth executing.
    pub has_angle: bool,
}

/// Serialised form of the map, as produced for persistence and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshot {
    /// Cell codes indexed `[row][col]`, see `Entity` and the map's cell codes.
    pub array: Vec<Vec<i32>>,

    /// Fractional column of the robot.
    pub current_x: f64,

    /// Fractional row of the robot.
    pub current_y: f64,

    pub rows: usize,

    pub cols: usize,

    /// Centimetres per cell.
    pub precision: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Something a sensor can report as being in front of the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entity {
    /// A hard obstacle which must never be driven into.
    Obstacle,

    /// A plant, which may be driven over but at a heavy penalty.
    Plant,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Motion {
    /// Motion reporting that there is nothing more to do.
    pub fn done() -> Self {
        Self {
            done: true,
            ..Default::default()
        }
    }

    /// Motion reporting that the target cannot be reached.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    /// An actionable motion, `has_angle` is derived from the angle's magnitude.
    pub fn new(distance_cm: i32, angle_deg: f64) -> Self {
        Self {
            distance_cm,
            angle_deg,
            done: false,
            unreachable: false,
            has_angle: angle_deg.abs() > HAS_ANGLE_THRESHOLD_DEG,
        }
    }

    /// Returns true if the drive has something to execute for this motion.
    pub fn is_actionable(&self) -> bool {
        !self.done && !self.unreachable && (self.distance_cm != 0 || self.has_angle)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_motion_has_angle() {
        assert!(!Motion::new(10, 0.0).has_angle);
        assert!(!Motion::new(10, 0.0005).has_angle);
        assert!(Motion::new(10, -0.5).has_angle);
        assert!(Motion::new(0, 90.0).is_actionable());
        assert!(!Motion::new(0, 0.0).is_actionable());
        assert!(!Motion::done().is_actionable());
        assert!(!Motion::unreachable().is_actionable());
    }

    #[test]
    fn test_snapshot_field_names() {
        let snapshot = MapSnapshot {
            array: vec![vec![0, 1], vec![2, 4]],
            current_x: 1.0,
            current_y: 0.5,
            rows: 2,
            cols: 2,
            precision: 4,
        };

        let val = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(val["currentX"], 1.0);
        assert_eq!(val["currentY"], 0.5);
        assert_eq!(val["array"][1][1], 4);
        assert_eq!(val["precision"], 4);
    }
}
