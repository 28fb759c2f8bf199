//! # Simulated drive
//!
//! Stands in for the robot's drive and obstacle sensor. Motions are executed
//! against a simple world model and the results come back as telecommands,
//! exactly as the real drive and sensors would report them.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use comms_if::{
    eqpt::nav::{Entity, Motion},
    tc::Tc,
};
use util::maths::{norm_deg_360, wrap_deg_180};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Something which can carry out a [`Motion`].
pub trait MotionExecutor {
    /// Execute the motion, returning the feedback telecommands in the order
    /// they happened.
    fn execute(&mut self, motion: &Motion) -> Vec<Tc>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the simulated drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimDriveParams {
    /// Longest straight move reported in one piece.
    ///
    /// Units: centimetres
    pub max_step_cm: i32,

    /// How far ahead the sensor sees.
    ///
    /// Units: centimetres
    pub sensor_range_cm: f64,

    /// Half of the sensor's field of view.
    ///
    /// Units: degrees
    pub sensor_half_angle_deg: f64,

    /// The drive stops a move when an obstacle ahead is closer than this.
    ///
    /// Units: centimetres
    pub stop_distance_cm: f64,

    /// The hidden world the sensor discovers.
    pub entities: Vec<SimEntity>,
}

/// An entity in the simulated world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimEntity {
    pub entity: Entity,

    /// Offset right of the start point.
    ///
    /// Units: centimetres
    pub x_cm: f64,

    /// Offset up from the start point.
    ///
    /// Units: centimetres
    pub y_cm: f64,
}

/// The simulated drive, tracking the robot's true pose.
#[derive(Debug, Clone)]
pub struct SimDrive {
    params: SimDriveParams,

    /// Position relative to the start point, X right and Y up.
    ///
    /// Units: centimetres
    position_cm: Vector2<f64>,

    heading_deg: f64,

    /// Entities which have already been reported
    reported: Vec<bool>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimDriveParams {
    fn default() -> Self {
        Self {
            max_step_cm: 8,
            sensor_range_cm: 40.0,
            sensor_half_angle_deg: 10.0,
            stop_distance_cm: 8.0,
            entities: Vec::new(),
        }
    }
}

impl SimDrive {
    /// Create a drive at the start point facing `heading_deg`.
    pub fn new(params: SimDriveParams, heading_deg: f64) -> Self {
        let reported = vec![false; params.entities.len()];

        Self {
            params,
            position_cm: Vector2::zeros(),
            heading_deg: norm_deg_360(heading_deg),
            reported,
        }
    }

    /// True position, relative to the start point.
    pub fn position_cm(&self) -> Vector2<f64> {
        self.position_cm
    }

    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    /// Report any entities in view which haven't been reported yet.
    pub fn sense(&mut self) -> Vec<Tc> {
        let mut tcs = Vec::new();

        for (i, e) in self.params.entities.iter().enumerate() {
            if self.reported[i] {
                continue;
            }

            if let Some(distance_cm) = self.distance_in_view(e) {
                debug!("Sensor sees {:?} at {:.1} cm", e.entity, distance_cm);

                self.reported[i] = true;
                tcs.push(Tc::Add {
                    entity: e.entity,
                    distance_cm: distance_cm.round() as i32,
                });
            }
        }

        tcs
    }

    /// Distance to the entity if it is inside the sensor's view.
    fn distance_in_view(&self, e: &SimEntity) -> Option<f64> {
        let rel = Vector2::new(e.x_cm, e.y_cm) - self.position_cm;
        let distance_cm = rel.norm();

        if distance_cm > self.params.sensor_range_cm {
            return None;
        }

        let bearing_deg = rel.y.atan2(rel.x).to_degrees();
        if wrap_deg_180(bearing_deg - self.heading_deg).abs() > self.params.sensor_half_angle_deg {
            return None;
        }

        Some(distance_cm)
    }

    /// True if a hard obstacle ahead is inside the stopping distance.
    fn is_blocked(&self, step_cm: f64) -> bool {
        self.params
            .entities
            .iter()
            .filter(|e| e.entity == Entity::Obstacle)
            .filter_map(|e| self.distance_in_view(e))
            .any(|d| d < step_cm + self.params.stop_distance_cm)
    }
}

impl MotionExecutor for SimDrive {
    fn execute(&mut self, motion: &Motion) -> Vec<Tc> {
        let mut tcs = Vec::new();

        if !motion.is_actionable() {
            return tcs;
        }

        if motion.has_angle {
            self.heading_deg = norm_deg_360(self.heading_deg + motion.angle_deg);
            tcs.push(Tc::Turn {
                angle_deg: motion.angle_deg,
            });
        }
        tcs.extend(self.sense());

        let max_step_cm = self.params.max_step_cm.max(1);
        let direction = motion.distance_cm.signum();
        let mut remaining_cm = motion.distance_cm.abs();

        while remaining_cm > 0 {
            let step_cm = remaining_cm.min(max_step_cm);

            if direction > 0 && self.is_blocked(step_cm as f64) {
                debug!("Obstacle ahead, stopping with {} cm to go", remaining_cm);
                break;
            }

            let heading_rad = self.heading_deg.to_radians();
            self.position_cm += Vector2::new(heading_rad.cos(), heading_rad.sin())
                * (direction * step_cm) as f64;
            remaining_cm -= step_cm;

            tcs.push(Tc::Moved {
                distance_cm: direction * step_cm,
            });
            tcs.extend(self.sense());
        }

        trace!(
            "SimDrive at ({:.1}, {:.1}) cm heading {:.1} deg",
            self.position_cm.x,
            self.position_cm.y,
            self.heading_deg
        );

        tcs
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn drive(entities: Vec<SimEntity>) -> SimDrive {
        SimDrive::new(
            SimDriveParams {
                entities,
                ..Default::default()
            },
            90.0,
        )
    }

    #[test]
    fn test_turn_then_move_in_steps() {
        let mut d = drive(vec![]);

        let tcs = d.execute(&Motion::new(20, -90.0));

        assert_eq!(
            tcs,
            vec![
                Tc::Turn { angle_deg: -90.0 },
                Tc::Moved { distance_cm: 8 },
                Tc::Moved { distance_cm: 8 },
                Tc::Moved { distance_cm: 4 },
            ]
        );
        assert_eq!(d.heading_deg(), 0.0);
        assert!((d.position_cm() - Vector2::new(20.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_reverse() {
        let mut d = drive(vec![]);

        let tcs = d.execute(&Motion::new(-10, 0.0));

        assert_eq!(
            tcs,
            vec![Tc::Moved { distance_cm: -8 }, Tc::Moved { distance_cm: -2 }]
        );
        assert!((d.position_cm() - Vector2::new(0.0, -10.0)).norm() < 1e-9);
    }

    #[test]
    fn test_nothing_to_do() {
        let mut d = drive(vec![]);

        assert!(d.execute(&Motion::done()).is_empty());
        assert!(d.execute(&Motion::unreachable()).is_empty());
        assert_eq!(d.position_cm(), Vector2::zeros());
    }

    #[test]
    fn test_obstacle_reported_and_stops() {
        let mut d = drive(vec![SimEntity {
            entity: Entity::Obstacle,
            x_cm: 0.0,
            y_cm: 30.0,
        }]);

        let tcs = d.execute(&Motion::new(40, 0.0));

        // Stops once the next step would end inside the stopping distance
        assert_eq!(
            tcs,
            vec![
                Tc::Add {
                    entity: Entity::Obstacle,
                    distance_cm: 30
                },
                Tc::Moved { distance_cm: 8 },
                Tc::Moved { distance_cm: 8 },
            ]
        );
        assert!((d.position_cm().y - 16.0).abs() < 1e-9);

        // Already reported
        assert!(d.sense().is_empty());
    }

    #[test]
    fn test_plants_do_not_stop_the_drive() {
        let mut d = drive(vec![SimEntity {
            entity: Entity::Plant,
            x_cm: 0.0,
            y_cm: 20.0,
        }]);

        let tcs = d.execute(&Motion::new(24, 0.0));

        assert_eq!(tcs.len(), 4);
        assert_eq!(
            tcs[0],
            Tc::Add {
                entity: Entity::Plant,
                distance_cm: 20
            }
        );
        assert!((d.position_cm().y - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_view() {
        let mut d = drive(vec![SimEntity {
            entity: Entity::Obstacle,
            x_cm: 30.0,
            y_cm: 0.0,
        }]);

        assert!(d.sense().is_empty());

        let tcs = d.execute(&Motion::new(0, -90.0));
        assert_eq!(
            tcs,
            vec![
                Tc::Turn { angle_deg: -90.0 },
                Tc::Add {
                    entity: Entity::Obstacle,
                    distance_cm: 30
                },
            ]
        );
    }
}
