//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface. Telecommands are the instructions fed to the navigation engine,
//! either by the collaborators around it (drive feedback, obstacle sensors,
//! vision) or replayed from a script.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use thiserror::Error;

// Internal
use crate::eqpt::nav::Entity;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static TC_TYPES: [&str; 7] = [
    "MOVED",
    "TURN",
    "ADD",
    "TARGET",
    "ROBOT_SIZE",
    "CLEAR_TARGET",
    "CLEAR_VISITS",
];

static TYPE_HAS_NO_PAYLOAD: [&str; 2] = ["CLEAR_TARGET", "CLEAR_VISITS"];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the navigation engine.
///
/// The JSON form is `{"type": "<TYPE>", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Tc {
    /// The robot has driven straight for the given distance.
    #[serde(rename = "MOVED")]
    Moved { distance_cm: i32 },

    /// The robot has turned by the given angle, counter-clockwise positive.
    #[serde(rename = "TURN")]
    Turn { angle_deg: f64 },

    /// An entity has been detected straight ahead at the given distance.
    #[serde(rename = "ADD")]
    Add { entity: Entity, distance_cm: i32 },

    /// Set the navigation target.
    ///
    /// `x` and `y` are fractional grid coordinates, unless `world` is set in
    /// which case they are centimetre offsets from the robot's starting point
    /// (X right, Y up).
    #[serde(rename = "TARGET")]
    Target {
        x: f64,
        y: f64,
        #[serde(default)]
        world: bool,
    },

    /// Set the robot's body size.
    #[serde(rename = "ROBOT_SIZE")]
    RobotSize { width_cm: i32, height_cm: i32 },

    /// Abandon the current target.
    #[serde(rename = "CLEAR_TARGET")]
    ClearTarget,

    /// Forget the recently visited cells.
    #[serde(rename = "CLEAR_VISITS")]
    ClearVisits,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC has an invalid type ({0})")]
    InvalidType(String),

    #[error("TC of type {0} is expected to have a payload but it doesn't")]
    MissingPayload(String),

    #[error("TC of type {0} has an invalid payload: {1}")]
    InvalidPayload(String, serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        // Parse the JSON string into a value
        let val: Value = serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)?;

        // Get the type of the TC
        let tc_type = match val["type"].as_str() {
            Some(s) => s.to_string(),
            None => {
                return Err(TcParseError::InvalidType(String::from(
                    "Expected \"type\" to be a string",
                )))
            }
        };

        if !TC_TYPES.contains(&tc_type.as_str()) {
            return Err(TcParseError::InvalidType(format!(
                "{} is not a recognised TC type",
                tc_type
            )));
        }

        // If the payload is null and the type should have one an error is
        // returned
        if val["payload"].is_null() && !TYPE_HAS_NO_PAYLOAD.contains(&tc_type.as_str()) {
            return Err(TcParseError::MissingPayload(tc_type));
        }

        // Payload-less types are rebuilt without the payload key so that a
        // null payload doesn't trip up the deserialiser.
        let val = if TYPE_HAS_NO_PAYLOAD.contains(&tc_type.as_str()) {
            serde_json::json!({ "type": tc_type })
        } else {
            val
        };

        serde_json::from_value(val).map_err(|e| TcParseError::InvalidPayload(tc_type, e))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_tcs() {
        assert_eq!(
            Tc::from_json(r#"{"type": "MOVED", "payload": {"distance_cm": 12}}"#).unwrap(),
            Tc::Moved { distance_cm: 12 }
        );
        assert_eq!(
            Tc::from_json(r#"{"type": "ADD", "payload": {"entity": "Plant", "distance_cm": 8}}"#)
                .unwrap(),
            Tc::Add {
                entity: Entity::Plant,
                distance_cm: 8
            }
        );
        assert_eq!(
            Tc::from_json(r#"{"type": "TARGET", "payload": {"x": 30.0, "y": 30.0}}"#).unwrap(),
            Tc::Target {
                x: 30.0,
                y: 30.0,
                world: false
            }
        );
        assert_eq!(
            Tc::from_json(r#"{"type": "CLEAR_TARGET"}"#).unwrap(),
            Tc::ClearTarget
        );
        assert_eq!(
            Tc::from_json(r#"{"type": "CLEAR_VISITS", "payload": null}"#).unwrap(),
            Tc::ClearVisits
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Tc::from_json("{\"type\": "),
            Err(TcParseError::InvalidJson(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"type": "DRIVE", "payload": {}}"#),
            Err(TcParseError::InvalidType(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"type": 3}"#),
            Err(TcParseError::InvalidType(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"type": "TURN"}"#),
            Err(TcParseError::MissingPayload(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"type": "TURN", "payload": {"angle": 3.0}}"#),
            Err(TcParseError::InvalidPayload(_, _))
        ));
    }

    #[test]
    fn test_serialise_matches_parse() {
        let tc = Tc::RobotSize {
            width_cm: 20,
            height_cm: 30,
        };
        let json = serde_json::to_string(&tc).unwrap();

        assert_eq!(Tc::from_json(&json).unwrap(), tc);
    }
}
