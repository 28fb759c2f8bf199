//! Implementations for the NavCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

// Internal
use super::{NavCtrlError, NavCtrlParams};
use crate::{
    map::{Map, MapError},
    nav::Strategy,
};
use comms_if::{eqpt::nav::Motion, tc::Tc};
use util::{
    archive::{Archived, Archiver},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Navigation control module state
#[derive(Default)]
pub struct NavCtrl {
    pub(crate) params: NavCtrlParams,

    map: Option<Arc<Map>>,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) output: Option<Motion>,
    arch_output: Archiver,
}

/// Input data to Navigation Control.
#[derive(Default)]
pub struct InputData {
    /// Telecommands received since the last cycle, in the order they arrived.
    pub tcs: Vec<Tc>,
}

/// Status report for NavCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    pub state: NavState,

    /// The strategy which produced this cycle's motion
    pub strategy: Option<Strategy>,

    pub num_tcs_applied: usize,

    /// TCs the map refused, such as obstacles reported off the grid
    pub num_tcs_rejected: usize,

    pub rows: usize,
    pub cols: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// What navigation is doing.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub enum NavState {
    /// No target
    Idle,

    /// Driving toward the target
    Seeking,

    /// The target was reached this cycle
    Arrived,

    /// The target was found to be unreachable this cycle
    Unreachable,
}

impl Default for NavState {
    fn default() -> Self {
        NavState::Idle
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for NavCtrl {
    type InitData = NavCtrlParams;
    type InitError = NavCtrlError;

    type InputData = InputData;
    type OutputData = Motion;
    type StatusReport = StatusReport;
    type ProcError = NavCtrlError;

    /// Initialise the NavCtrl module.
    ///
    /// Builds the map from the parameters. Archives are only written if a
    /// session is given.
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: Option<&Session>,
    ) -> Result<(), Self::InitError> {
        let map = Map::with_params(
            init_data.world_width_cm,
            init_data.world_height_cm,
            init_data.map.clone(),
        );

        if init_data.robot_width_cm > 0 || init_data.robot_height_cm > 0 {
            map.set_robot_size_cm(init_data.robot_width_cm, init_data.robot_height_cm)?;
        }

        // Initialise the archivers
        if let Some(session) = session {
            self.arch_report = Archiver::from_path(session, "nav_ctrl/status_report.csv")
                .map_err(|e| NavCtrlError::ArchiveInitError(e.to_string()))?;
            self.arch_output = Archiver::from_path(session, "nav_ctrl/motion.csv")
                .map_err(|e| NavCtrlError::ArchiveInitError(e.to_string()))?;
        }

        debug!(
            "NavCtrl archiving {}",
            if self.arch_report.is_enabled() {
                "enabled"
            } else {
                "disabled"
            }
        );

        self.params = init_data;
        self.map = Some(Arc::new(map));
        self.report = StatusReport::default();
        self.output = None;

        Ok(())
    }

    /// Perform cyclic processing of Navigation Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let map = self.map.clone().ok_or(NavCtrlError::NotInitialised)?;

        let prev_state = self.report.state;

        // Clear the status report
        self.report = StatusReport::default();

        for tc in input_data.tcs.iter() {
            match exec_tc(&map, tc) {
                Ok(()) => self.report.num_tcs_applied += 1,
                // Map refusals are the sender's problem, keep going
                Err(MapError::GridError(e)) => {
                    warn!("NavCtrl rejected {:?}: {}", tc, e);
                    self.report.num_tcs_rejected += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let outcome = map.plan()?;

        self.report.strategy = Some(outcome.strategy);
        self.report.state = match outcome.strategy {
            Strategy::NoTarget => NavState::Idle,
            Strategy::Arrived => NavState::Arrived,
            Strategy::TargetBlocked | Strategy::NoPath => NavState::Unreachable,
            _ => NavState::Seeking,
        };
        let (rows, cols) = map.dims()?;
        self.report.rows = rows;
        self.report.cols = cols;

        if self.report.state != prev_state {
            match self.report.state {
                NavState::Arrived => info!("Target reached"),
                NavState::Unreachable => info!("Target is unreachable ({:?})", outcome.strategy),
                NavState::Seeking if prev_state != NavState::Seeking => info!("Seeking target"),
                _ => (),
            }
        }

        debug!(
            "NavCtrl output: {:?} via {:?}",
            outcome.motion, outcome.strategy
        );

        self.output = Some(outcome.motion);

        Ok((outcome.motion, self.report))
    }
}

impl Archived for NavCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)?;

        if let Some(output) = self.output {
            self.arch_output.serialise(output)?;
        }

        Ok(())
    }
}

impl NavCtrl {
    /// The map, once initialised. Share it with observers such as displays.
    pub fn map(&self) -> Option<Arc<Map>> {
        self.map.clone()
    }

    /// The last status report.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Apply a single telecommand to the map.
fn exec_tc(map: &Map, tc: &Tc) -> Result<(), MapError> {
    match *tc {
        Tc::Moved { distance_cm } => map.moved(distance_cm),
        Tc::Turn { angle_deg } => map.turn(angle_deg),
        Tc::Add {
            entity,
            distance_cm,
        } => map.add(entity, distance_cm).map(|_| ()),
        Tc::Target { x, y, world: false } => map.set_target_location(x, y),
        Tc::Target { x, y, world: true } => map.set_target_world(x, y),
        Tc::RobotSize {
            width_cm,
            height_cm,
        } => map.set_robot_size_cm(width_cm, height_cm),
        Tc::ClearTarget => map.clear_target(),
        Tc::ClearVisits => map.clear_recent_visits(),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::nav::Entity;

    fn nav_ctrl() -> NavCtrl {
        let mut nc = NavCtrl::default();
        nc.init(
            NavCtrlParams {
                world_width_cm: 200.0,
                world_height_cm: 200.0,
                ..Default::default()
            },
            None,
        )
        .unwrap();
        nc
    }

    fn input(tcs: Vec<Tc>) -> InputData {
        InputData { tcs }
    }

    #[test]
    fn test_not_initialised() {
        let mut nc = NavCtrl::default();

        assert!(matches!(
            nc.proc(&InputData::default()),
            Err(NavCtrlError::NotInitialised)
        ));
        assert!(nc.map().is_none());
    }

    #[test]
    fn test_idle_without_target() {
        let mut nc = nav_ctrl();
        let (motion, report) = nc.proc(&InputData::default()).unwrap();

        assert!(motion.done);
        assert_eq!(report.state, NavState::Idle);
        assert_eq!(report.strategy, Some(Strategy::NoTarget));
        assert_eq!((report.rows, report.cols), (50, 50));
    }

    #[test]
    fn test_seek_and_arrive() {
        let mut nc = nav_ctrl();

        let (motion, report) = nc
            .proc(&input(vec![Tc::Target {
                x: 30.0,
                y: 30.0,
                world: false,
            }]))
            .unwrap();
        assert_eq!(report.state, NavState::Seeking);
        assert_eq!(report.num_tcs_applied, 1);
        assert_eq!(motion.distance_cm, 28);

        // Drive feedback
        let (motion, report) = nc
            .proc(&input(vec![
                Tc::Turn {
                    angle_deg: motion.angle_deg,
                },
                Tc::Moved {
                    distance_cm: motion.distance_cm,
                },
            ]))
            .unwrap();
        assert!(motion.done);
        assert_eq!(report.state, NavState::Arrived);
        assert_eq!(report.num_tcs_applied, 2);

        let (_, report) = nc.proc(&InputData::default()).unwrap();
        assert_eq!(report.state, NavState::Idle);
    }

    #[test]
    fn test_world_target() {
        let mut nc = nav_ctrl();
        nc.proc(&input(vec![Tc::Target {
            x: 0.0,
            y: 40.0,
            world: true,
        }]))
        .unwrap();

        let map = nc.map().unwrap();
        assert_eq!(
            map.target().unwrap(),
            Some(nalgebra::Vector2::new(25.0, 15.0))
        );
    }

    #[test]
    fn test_rejected_tcs_counted() {
        let mut nc = nav_ctrl();

        let (_, report) = nc
            .proc(&input(vec![
                Tc::Add {
                    entity: Entity::Obstacle,
                    distance_cm: 1000,
                },
                Tc::Add {
                    entity: Entity::Plant,
                    distance_cm: 12,
                },
                Tc::ClearVisits,
            ]))
            .unwrap();

        assert_eq!(report.num_tcs_applied, 2);
        assert_eq!(report.num_tcs_rejected, 1);
    }

    #[test]
    fn test_unreachable_target() {
        let mut nc = nav_ctrl();

        let (motion, report) = nc
            .proc(&input(vec![
                Tc::Add {
                    entity: Entity::Obstacle,
                    distance_cm: 20,
                },
                Tc::Target {
                    x: 25.0,
                    y: 20.0,
                    world: false,
                },
            ]))
            .unwrap();

        assert!(motion.unreachable);
        assert_eq!(report.state, NavState::Unreachable);
        assert_eq!(nc.map().unwrap().target().unwrap(), None);
    }

    #[test]
    fn test_robot_size_from_params() {
        let mut nc = NavCtrl::default();
        nc.init(
            NavCtrlParams {
                world_width_cm: 200.0,
                world_height_cm: 200.0,
                robot_width_cm: 16,
                robot_height_cm: 8,
                ..Default::default()
            },
            None,
        )
        .unwrap();

        let map = nc.map().unwrap();
        let radius = map.inspect(|s| s.footprint().radius_cells()).unwrap();
        assert_eq!(radius, 2);
    }
}
