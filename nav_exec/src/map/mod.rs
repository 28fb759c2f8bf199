//! # Map
//!
//! Occupancy grid of the robot's surroundings. The map dead-reckons the
//! robot's pose from drive feedback, records obstacles reported by the
//! sensors and plans the next motion toward a target.
//!
//! [`Map`] is the thread safe facade over [`MapState`]. Every operation takes
//! the map's single lock for its whole duration, so operations are atomic
//! with respect to each other and events are delivered in the order the
//! changes were made.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod events;
mod footprint;
mod grid;
mod inflation;
mod params;
mod pose;
mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{mpsc::Receiver, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use nalgebra::Vector2;

use comms_if::eqpt::nav::{Entity, MapSnapshot, Motion};

use crate::nav::{self, PlanOutcome};

pub use events::{MapEvent, TargetClearReason};
pub(crate) use events::EventBus;
pub use footprint::Footprint;
pub use grid::{Cell, CellIndex, Grid, GridError, Shift};
pub use params::MapParams;
pub use pose::Pose;
pub use state::MapState;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Thread safe map.
///
/// Share between threads with an `Arc<Map>`.
#[derive(Debug)]
pub struct Map {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    state: MapState,
    bus: EventBus,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors returned by map operations.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Grid error: {0}")]
    GridError(#[from] GridError),

    #[error("The map lock was poisoned by a panicking thread")]
    PoisonError,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T> From<PoisonError<T>> for MapError {
    fn from(_: PoisonError<T>) -> Self {
        MapError::PoisonError
    }
}

impl Map {
    /// Create a map covering the given world extent with default parameters.
    pub fn new(width_cm: f64, height_cm: f64) -> Self {
        Self::with_params(width_cm, height_cm, MapParams::default())
    }

    /// Create a map covering the given world extent.
    pub fn with_params(width_cm: f64, height_cm: f64, params: MapParams) -> Self {
        let state = MapState::new(width_cm, height_cm, params);

        info!(
            "Map created: {}x{} cells at {} cm/cell",
            state.grid().rows(),
            state.grid().cols(),
            state.params().precision_cm
        );

        Self {
            inner: Mutex::new(Inner {
                state,
                bus: EventBus::default(),
            }),
        }
    }

    /// Receive an event for every subsequent change to the map.
    ///
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> Result<Receiver<MapEvent>, MapError> {
        let mut guard = self.lock()?;
        let rx = guard.bus.subscribe();
        debug!("Map now has {} subscribers", guard.bus.num_subscribers());

        Ok(rx)
    }

    /// The robot drove straight along its heading by `distance_cm`.
    ///
    /// Non-finite geometry is logged and ignored.
    pub fn moved(&self, distance_cm: i32) -> Result<(), MapError> {
        self.lock()?.moved(distance_cm);
        Ok(())
    }

    /// As [`Map::moved`], first setting how much extra room the grid makes
    /// on each side when it has to grow.
    pub fn moved_with_prealloc(&self, distance_cm: i32, prealloc_cm: i32) -> Result<(), MapError> {
        let mut guard = self.lock()?;
        guard.state.set_prealloc_cm(prealloc_cm);
        guard.moved(distance_cm);
        Ok(())
    }

    /// The robot turned by `angle_deg`, counter-clockwise positive.
    pub fn turn(&self, angle_deg: f64) -> Result<(), MapError> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        let heading_deg = match inner.state.apply_turn(angle_deg) {
            Ok(h) => h,
            Err(e) => {
                warn!("Ignoring turn: {}", e);
                return Ok(());
            }
        };

        inner.bus.emit(MapEvent::Turned {
            delta_deg: angle_deg,
            heading_deg,
        });
        inner.bus.emit(MapEvent::Updated);

        Ok(())
    }

    /// An entity was seen straight ahead at `distance_cm`.
    ///
    /// Returns the cell it was placed in, or `OutOfBounds` if that lies
    /// outside the grid, in which case nothing changes.
    pub fn add(&self, entity: Entity, distance_cm: i32) -> Result<CellIndex, MapError> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        let cell = inner.state.report_obstacle(entity, distance_cm as f64)?;

        inner.bus.emit(MapEvent::ObstacleAdded { entity, cell });
        inner.bus.emit(MapEvent::Updated);

        Ok(cell)
    }

    /// Write a cell directly, growing the grid if needed. Obstacles and
    /// plants written this way are inflated like reported ones.
    ///
    /// Returns where the cell ended up after any growth.
    pub fn write_cell(&self, index: CellIndex, cell: Cell) -> Result<CellIndex, MapError> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        let dims = (inner.state.grid().rows(), inner.state.grid().cols());
        let index = inner.state.write_cell(index, cell);

        match cell {
            Cell::Obstacle | Cell::Plant => {
                inner.state.inflate();
                inner.bus.emit(MapEvent::ObstacleAdded {
                    entity: if cell == Cell::Plant {
                        Entity::Plant
                    } else {
                        Entity::Obstacle
                    },
                    cell: index,
                });
            }
            _ => (),
        }

        inner.emit_growth(dims);
        inner.bus.emit(MapEvent::Updated);

        Ok(index)
    }

    /// Set the navigation target in fractional grid coordinates.
    ///
    /// `(-1, -1)` clears the target. Non-finite coordinates are ignored.
    pub fn set_target_location(&self, x: f64, y: f64) -> Result<(), MapError> {
        if x == -1.0 && y == -1.0 {
            return self.clear_target();
        }

        if !x.is_finite() || !y.is_finite() {
            warn!("Ignoring non-finite target ({}, {})", x, y);
            return Ok(());
        }

        self.lock()?.set_target(x, y);
        Ok(())
    }

    /// Set the navigation target in centimetres from the robot's starting
    /// point (X right, Y up).
    pub fn set_target_world(&self, x_cm: f64, y_cm: f64) -> Result<(), MapError> {
        if !x_cm.is_finite() || !y_cm.is_finite() {
            warn!("Ignoring non-finite target ({} cm, {} cm)", x_cm, y_cm);
            return Ok(());
        }

        let mut guard = self.lock()?;
        let target = guard.state.world_to_grid(x_cm, y_cm);
        guard.set_target(target.x, target.y);

        Ok(())
    }

    /// Abandon the current target, if any.
    pub fn clear_target(&self) -> Result<(), MapError> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        if inner.state.target.take().is_some() {
            info!("Target cleared");
            inner.bus.emit(MapEvent::TargetCleared {
                reason: TargetClearReason::Cancelled,
            });
            inner.bus.emit(MapEvent::Updated);
        }

        Ok(())
    }

    /// Set the robot's body size, which sets how far obstacles are inflated.
    pub fn set_robot_size_cm(&self, width_cm: i32, height_cm: i32) -> Result<(), MapError> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        let dims = (inner.state.grid().rows(), inner.state.grid().cols());
        let inflation_radius_cells = inner.state.set_robot_size(width_cm, height_cm);

        inner.bus.emit(MapEvent::RobotResized {
            width_cm,
            height_cm,
            inflation_radius_cells,
        });
        inner.emit_growth(dims);
        inner.bus.emit(MapEvent::Updated);

        Ok(())
    }

    /// Forget the recently visited cells, allowing the robot to go back the
    /// way it came.
    pub fn clear_recent_visits(&self) -> Result<(), MapError> {
        let mut guard = self.lock()?;
        guard.state.clear_recent_visits();
        guard.bus.emit(MapEvent::Updated);

        Ok(())
    }

    /// The next motion toward the target.
    pub fn next_motion(&self) -> Result<Motion, MapError> {
        Ok(self.plan()?.motion)
    }

    /// Plan the next motion, reporting which strategy produced it.
    ///
    /// A reached or unreachable target is cleared.
    pub fn plan(&self) -> Result<PlanOutcome, MapError> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        let outcome = nav::plan(&inner.state);

        if let Some(reason) = outcome.strategy.clears_target() {
            if inner.state.target.take().is_some() {
                inner.bus.emit(MapEvent::TargetCleared { reason });
                inner.bus.emit(MapEvent::Updated);
            }
        }

        Ok(outcome)
    }

    /// Current pose of the robot.
    pub fn pose(&self) -> Result<Pose, MapError> {
        Ok(*self.lock()?.state.pose())
    }

    /// Current target in fractional grid coordinates.
    pub fn target(&self) -> Result<Option<Vector2<f64>>, MapError> {
        Ok(self.lock()?.state.target())
    }

    /// Grid dimensions as `(rows, cols)`.
    pub fn dims(&self) -> Result<(usize, usize), MapError> {
        let guard = self.lock()?;
        Ok((guard.state.grid().rows(), guard.state.grid().cols()))
    }

    /// Read a cell.
    pub fn cell(&self, index: CellIndex) -> Result<Cell, MapError> {
        Ok(self.lock()?.state.grid().get(index)?)
    }

    /// True if the cell is inside the grid.
    pub fn is_inside(&self, index: CellIndex) -> Result<bool, MapError> {
        Ok(self.lock()?.state.grid().is_inside(index))
    }

    /// True if the cell is in the recent visit window.
    pub fn is_recently_visited(&self, index: CellIndex) -> Result<bool, MapError> {
        Ok(self.lock()?.state.grid().is_visited(index))
    }

    /// True if entering the cell would return to the one visited just before
    /// the current cell.
    pub fn is_immediate_backtrack(&self, index: CellIndex) -> Result<bool, MapError> {
        Ok(self.lock()?.state.is_immediate_backtrack(index))
    }

    /// See [`MapState::world_to_grid`].
    pub fn world_to_grid(&self, x_cm: f64, y_cm: f64) -> Result<Vector2<f64>, MapError> {
        Ok(self.lock()?.state.world_to_grid(x_cm, y_cm))
    }

    /// See [`MapState::grid_to_world`].
    pub fn grid_to_world(&self, x: f64, y: f64) -> Result<Vector2<f64>, MapError> {
        Ok(self.lock()?.state.grid_to_world(x, y))
    }

    /// Serialisable copy of the map.
    pub fn snapshot(&self) -> Result<MapSnapshot, MapError> {
        Ok(self.lock()?.state.snapshot())
    }

    /// The snapshot as JSON.
    pub fn map_as_json(&self) -> Result<serde_json::Value, MapError> {
        let snapshot = self.snapshot()?;

        // A snapshot is plain numbers and vectors so always serialises
        Ok(serde_json::to_value(snapshot).unwrap_or(serde_json::Value::Null))
    }

    /// Run a closure with read access to the whole state, under the lock.
    pub fn inspect<R, F: FnOnce(&MapState) -> R>(&self, f: F) -> Result<R, MapError> {
        Ok(f(&self.lock()?.state))
    }

    fn lock(&self) -> Result<MutexGuard<Inner>, MapError> {
        Ok(self.inner.lock()?)
    }
}

impl Inner {
    fn set_target(&mut self, x: f64, y: f64) {
        self.state.target = Some(Vector2::new(x, y));
        info!("Target set to ({:.2}, {:.2})", x, y);

        self.bus.emit(MapEvent::TargetSet { x, y });
        self.bus.emit(MapEvent::Updated);
    }

    fn moved(&mut self, distance_cm: i32) {
        let dims = (self.state.grid().rows(), self.state.grid().cols());
        let heading_deg = self.state.pose().heading_deg;

        if let Err(e) = self.state.apply_motion(distance_cm as f64, heading_deg) {
            warn!("Ignoring motion of {} cm: {}", distance_cm, e);
            return;
        }

        self.bus.emit(MapEvent::Moved { distance_cm });
        self.emit_growth(dims);
        self.bus.emit(MapEvent::Updated);
    }

    fn emit_growth(&mut self, (rows, cols): (usize, usize)) {
        let now = (self.state.grid().rows(), self.state.grid().cols());
        if now != (rows, cols) {
            self.bus.emit(MapEvent::Grown {
                rows: now.0,
                cols: now.1,
            });
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::nav::Strategy;
    use std::sync::Arc;
    use std::thread;

    /// 50x50 cell map with the robot at (25, 25) facing up.
    fn map() -> Map {
        Map::new(200.0, 200.0)
    }

    /// Execute a motion the way the drive would, feeding it back to the map.
    fn execute(map: &Map, motion: &Motion) {
        if motion.has_angle {
            map.turn(motion.angle_deg).unwrap();
        }
        map.moved(motion.distance_cm).unwrap();
    }

    fn drain(rx: &Receiver<MapEvent>) -> Vec<MapEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_clear_line_arrival() {
        let map = map();
        let rx = map.subscribe().unwrap();
        map.set_target_location(30.0, 30.0).unwrap();

        let motion = map.next_motion().unwrap();
        assert_eq!(motion.distance_cm, 28);
        assert!((motion.angle_deg + 135.0).abs() < 1e-6);
        assert!(motion.has_angle && !motion.done && !motion.unreachable);

        execute(&map, &motion);
        assert!((map.pose().unwrap().heading_deg - 315.0).abs() < 1e-6);

        let motion = map.next_motion().unwrap();
        assert!(motion.done);
        assert!(!motion.unreachable);
        assert_eq!(map.target().unwrap(), None);

        let events = drain(&rx);
        assert_eq!(
            events.iter().rev().nth(1),
            Some(&MapEvent::TargetCleared {
                reason: TargetClearReason::Arrived
            })
        );

        // Nothing more to do
        assert!(map.next_motion().unwrap().done);
    }

    #[test]
    fn test_obstacle_on_path_is_avoided() {
        let map = map();
        map.write_cell(CellIndex::new(25, 30), Cell::Obstacle).unwrap();
        map.set_target_location(35.0, 25.0).unwrap();

        let mut arrived = false;
        for _ in 0..50 {
            let outcome = map.plan().unwrap();
            assert!(
                !outcome.motion.unreachable,
                "Unreachable via {:?}",
                outcome.strategy
            );

            if outcome.motion.done {
                assert_eq!(outcome.strategy, Strategy::Arrived);
                arrived = true;
                break;
            }

            execute(&map, &outcome.motion);
            assert_ne!(
                map.pose().unwrap().cell(),
                CellIndex::new(25, 30),
                "Drove into the obstacle"
            );
        }

        assert!(arrived);
    }

    #[test]
    fn test_blocked_target_is_unreachable() {
        let map = map();
        let rx = map.subscribe().unwrap();
        map.write_cell(CellIndex::new(40, 40), Cell::Obstacle).unwrap();
        map.set_target_location(40.2, 39.9).unwrap();

        let motion = map.next_motion().unwrap();
        assert!(motion.unreachable);
        assert!(!motion.done);
        assert_eq!(map.target().unwrap(), None);
        assert!(drain(&rx).contains(&MapEvent::TargetCleared {
            reason: TargetClearReason::Unreachable
        }));
    }

    #[test]
    fn test_enclosed_is_unreachable() {
        let map = map();
        for (row, col) in [(24, 25), (26, 25), (25, 24), (25, 26)].iter() {
            map.write_cell(CellIndex::new(*row, *col), Cell::Inflated)
                .unwrap();
        }

        for (x, y) in [(40.0, 40.0), (5.0, 25.0), (25.0, 3.0)].iter() {
            map.set_target_location(*x, *y).unwrap();
            let motion = map.next_motion().unwrap();
            assert!(motion.unreachable, "({}, {}) reachable", x, y);
            assert!(!motion.done);
        }
    }

    #[test]
    fn test_robot_cell_survives_inflation() {
        let map = map();
        map.moved(8).unwrap();
        map.set_robot_size_cm(8, 8).unwrap();

        // One cell ahead, so the robot's cell is inside the halo
        map.add(Entity::Obstacle, 4).unwrap();

        let current = map.pose().unwrap().cell();
        assert_eq!(current, CellIndex::new(23, 25));
        assert_eq!(map.cell(current).unwrap(), Cell::RobotFootprint);
        assert_eq!(map.cell(CellIndex::new(23, 24)).unwrap(), Cell::Inflated);

        let json = map.map_as_json().unwrap();
        assert_eq!(json["array"][23][25], 2);
        assert_eq!(json["array"][24][25], 2);
    }

    #[test]
    fn test_growth_keeps_robot_and_target() {
        let map = Map::new(40.0, 40.0);
        let rx = map.subscribe().unwrap();
        map.set_target_location(2.0, 8.0).unwrap();

        // Drive up and off the top of the 10x10 grid
        map.moved_with_prealloc(60, 20).unwrap();

        let (rows, cols) = map.dims().unwrap();
        let pose = map.pose().unwrap();
        assert!(rows > 10);
        assert_eq!(cols, 10);
        assert!(map.is_inside(pose.cell()).unwrap());

        // Shift is whatever was padded on top, which moves the target too
        let shift = (rows - 10) as f64;
        assert_eq!(map.target().unwrap(), Some(Vector2::new(2.0, 8.0 + shift)));
        let origin = map.inspect(|s| s.grid().origin()).unwrap();
        assert_eq!(origin, CellIndex::new(5 + shift as isize, 5));

        // The robot is 15 cells above the origin in world terms
        let world = map.grid_to_world(pose.position.x, pose.position.y).unwrap();
        assert!(world.x.abs() < 1e-6);
        assert!((world.y - 60.0).abs() < 1e-6);

        let events = drain(&rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, MapEvent::Grown { cols: 10, .. })));
    }

    #[test]
    fn test_event_order() {
        let map = map();
        let rx = map.subscribe().unwrap();

        map.moved(8).unwrap();
        map.turn(45.0).unwrap();
        map.add(Entity::Plant, 8).unwrap();
        map.set_robot_size_cm(8, 8).unwrap();

        assert_eq!(
            drain(&rx),
            vec![
                MapEvent::Moved { distance_cm: 8 },
                MapEvent::Updated,
                MapEvent::Turned {
                    delta_deg: 45.0,
                    heading_deg: 135.0
                },
                MapEvent::Updated,
                MapEvent::ObstacleAdded {
                    entity: Entity::Plant,
                    cell: CellIndex::new(22, 24)
                },
                MapEvent::Updated,
                MapEvent::RobotResized {
                    width_cm: 8,
                    height_cm: 8,
                    inflation_radius_cells: 1
                },
                MapEvent::Updated,
            ]
        );
    }

    #[test]
    fn test_add_outside_rejected() {
        let map = map();
        let before = map.snapshot().unwrap();

        assert!(matches!(
            map.add(Entity::Obstacle, 1000),
            Err(MapError::GridError(GridError::OutOfBounds { .. }))
        ));
        assert_eq!(map.snapshot().unwrap(), before);
    }

    #[test]
    fn test_degenerate_inputs_ignored() {
        let map = map();
        let before = map.pose().unwrap();

        map.turn(std::f64::NAN).unwrap();
        map.set_target_location(std::f64::INFINITY, 3.0).unwrap();

        assert_eq!(map.pose().unwrap(), before);
        assert_eq!(map.target().unwrap(), None);
    }

    #[test]
    fn test_sentinel_clears_target() {
        let map = map();
        map.set_target_location(10.0, 10.0).unwrap();
        map.set_target_location(-1.0, -1.0).unwrap();

        assert_eq!(map.target().unwrap(), None);
        assert!(map.next_motion().unwrap().done);
    }

    #[test]
    fn test_world_target() {
        let map = map();
        map.set_target_world(20.0, 8.0).unwrap();

        assert_eq!(map.target().unwrap(), Some(Vector2::new(30.0, 23.0)));
    }

    #[test]
    fn test_clear_recent_visits() {
        let map = map();
        map.moved(8).unwrap();

        assert!(map.is_recently_visited(CellIndex::new(25, 25)).unwrap());
        assert!(map.is_immediate_backtrack(CellIndex::new(24, 25)).unwrap());

        map.clear_recent_visits().unwrap();

        assert!(!map.is_recently_visited(CellIndex::new(25, 25)).unwrap());
        assert!(!map.is_immediate_backtrack(CellIndex::new(24, 25)).unwrap());
    }

    #[test]
    fn test_map_as_json() {
        let map = Map::new(12.0, 8.0);
        let json = map.map_as_json().unwrap();

        assert_eq!(json["rows"], 2);
        assert_eq!(json["cols"], 3);
        assert_eq!(json["precision"], 4);
        assert_eq!(json["currentX"], 1.0);
        assert_eq!(json["currentY"], 1.0);
        assert_eq!(json["array"][1][1], 2);
    }

    #[test]
    fn test_planned_moves_never_backtrack() {
        // A long window records every cell a motion crosses, while only the
        // last two entries decide what counts as backtracking
        let map = Map::with_params(
            200.0,
            200.0,
            MapParams {
                backtrack_window: 4096,
                ..Default::default()
            },
        );
        map.set_robot_size_cm(4, 4).unwrap();
        for (row, col) in [(20, 25), (21, 27), (18, 23), (15, 26), (16, 29), (12, 24)].iter() {
            map.write_cell(CellIndex::new(*row, *col), Cell::Obstacle)
                .unwrap();
        }
        map.write_cell(CellIndex::new(14, 22), Cell::Plant).unwrap();
        map.set_target_location(26.0, 8.0).unwrap();

        for _ in 0..100 {
            let target_cell = match map.target().unwrap() {
                Some(t) => CellIndex::from_position(t.x, t.y),
                None => break,
            };

            let outcome = map.plan().unwrap();
            if !outcome.motion.is_actionable() {
                break;
            }

            let (previous, visited) = map
                .inspect(|s| {
                    let window = s.footprint().window();
                    let previous = window.len().checked_sub(2).map(|i| window[i]);
                    (previous, window.len())
                })
                .unwrap();

            execute(&map, &outcome.motion);

            let crossed: Vec<CellIndex> = map
                .inspect(|s| s.footprint().window().iter().skip(visited).copied().collect())
                .unwrap();

            if let Some(previous) = previous {
                assert!(
                    previous == target_cell || !crossed.contains(&previous),
                    "{:?} drove back through {:?} on its way along {:?}",
                    outcome.strategy,
                    previous,
                    crossed
                );
            }
        }
    }

    #[test]
    fn test_concurrent_access() {
        let map = Arc::new(map());
        map.set_target_location(40.0, 10.0).unwrap();

        let mut handles = Vec::new();

        let m = map.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..50 {
                m.moved(4).unwrap();
                m.turn(10.0).unwrap();
            }
        }));

        let m = map.clone();
        handles.push(thread::spawn(move || {
            for i in 0..50 {
                // Reports can land off the grid, which is fine here
                m.add(Entity::Obstacle, 12 + (i % 5)).ok();
            }
        }));

        let m = map.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..50 {
                m.next_motion().unwrap();
            }
        }));

        let m = map.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..50 {
                let snap = m.snapshot().unwrap();
                assert_eq!(snap.array.len(), snap.rows);
                assert!(snap.array.iter().all(|r| r.len() == snap.cols));
                let cell = CellIndex::from_position(snap.current_x, snap.current_y);
                assert!(cell.row >= 0 && (cell.row as usize) < snap.rows);
                assert!(cell.col >= 0 && (cell.col as usize) < snap.cols);
            }
        }));

        for h in handles {
            h.join().unwrap();
        }

        let pose = map.pose().unwrap();
        assert!(map.is_inside(pose.cell()).unwrap());
        assert!((pose.heading_deg - util::maths::norm_deg_360(90.0 + 500.0)).abs() < 1e-6);
    }

    #[test]
    fn test_poisoned_lock_reported() {
        let map = Arc::new(map());

        let m = map.clone();
        let result = thread::spawn(move || {
            m.inspect(|_| panic!("observer failed")).ok();
        })
        .join();
        assert!(result.is_err());

        assert!(matches!(map.moved(4), Err(MapError::PoisonError)));
        assert!(matches!(map.next_motion(), Err(MapError::PoisonError)));
    }
}
