//! # Planner
//!
//! Chooses the next motion toward the target. Planning never changes the
//! map, dropping a reached or unreachable target is left to the caller.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info, trace};
use nalgebra::Vector2;

use comms_if::eqpt::nav::Motion;
use util::maths::get_ang_dist_deg;

use super::{astar::find_path, PlanOutcome, Strategy};
use crate::map::{Cell, CellIndex, MapState};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One sample along a straight line.
struct Crossing {
    point: Vector2<f64>,
    cell: CellIndex,

    /// Cells beside a diagonal step into `cell`
    corners: Option<[CellIndex; 2]>,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Work out the next motion toward the target.
pub fn plan(state: &MapState) -> PlanOutcome {
    let target = match state.target() {
        Some(t) => t,
        None => return PlanOutcome::terminal(Strategy::NoTarget),
    };

    let position = state.pose().position;

    if (target - position).norm() <= state.params().arrival_threshold_cells {
        info!("Arrived at target ({:.2}, {:.2})", target.x, target.y);
        return PlanOutcome::terminal(Strategy::Arrived);
    }

    let target_cell = CellIndex::from_position(target.x, target.y);
    match state.grid().get(target_cell) {
        Ok(c) if !c.is_hard_blocked() => (),
        _ => {
            info!(
                "Target ({:.2}, {:.2}) is blocked or off the map, unreachable",
                target.x, target.y
            );
            return PlanOutcome::terminal(Strategy::TargetBlocked);
        }
    }

    if let Some(outcome) = line_of_sight(state, target, target_cell) {
        return outcome;
    }

    let current = state.current_cell();
    let current_usable = matches!(state.grid().get(current), Ok(c) if !c.is_hard_blocked());
    if current_usable {
        if let Some(path) = find_path(state, current, target_cell) {
            if let Some(next) = path.get(1) {
                if let Some(outcome) = step_toward(state, cell_centre(*next), Strategy::AStar) {
                    return outcome;
                }
            }
        }
    }

    if let Some(outcome) = alternate_start(state, target_cell) {
        return outcome;
    }

    info!(
        "No path to target ({:.2}, {:.2}), unreachable",
        target.x, target.y
    );
    PlanOutcome::terminal(Strategy::NoPath)
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Try to drive straight at the target.
///
/// Samples are taken every half cell or so, and a diagonal step between
/// samples also needs both cells beside the corner it cuts to be clear. A
/// blocked line still gives a motion, but only if the last clear sample is in
/// a different cell to the robot. A shorter partial move is refused even if
/// it rounds to a non-zero distance, leaving the A* step to get out of the
/// cell.
fn line_of_sight(
    state: &MapState,
    target: Vector2<f64>,
    target_cell: CellIndex,
) -> Option<PlanOutcome> {
    let position = state.pose().position;
    let current = state.current_cell();
    let delta = target - position;

    let mut last_clear: Option<Vector2<f64>> = None;
    let mut blocked = false;

    for crossing in crossings(position, delta) {
        let corners_clear = crossing.corners.iter().flatten().all(|corner| {
            *corner == current || is_clear(state, *corner, target_cell)
        });

        // The robot is already in its own cell whatever is in it
        let cell = crossing.cell;
        if !corners_clear || (cell != current && !is_clear(state, cell, target_cell)) {
            blocked = true;
            break;
        }

        last_clear = Some(crossing.point);
    }

    if !blocked {
        trace!("Line of sight to target is clear");
        return step_toward(state, target, Strategy::LineOfSight);
    }

    let point = last_clear?;
    if CellIndex::from_position(point.x, point.y) == current {
        trace!("Line of sight blocked immediately");
        return None;
    }

    debug!(
        "Line of sight blocked, moving to ({:.2}, {:.2})",
        point.x, point.y
    );
    step_toward(state, point, Strategy::PartialLineOfSight)
}

/// Look for a nearby cell to hop to from which the target can be reached.
///
/// Candidates are vacant cells within the search radius of the robot which
/// it can drive straight to. The cheapest by hop distance plus path length
/// is used.
fn alternate_start(state: &MapState, target_cell: CellIndex) -> Option<PlanOutcome> {
    let radius = state.params().alt_start_radius_cells.max(0);
    let precision = state.precision_cm();
    let position = state.pose().position;
    let current = state.current_cell();

    let mut best: Option<(f64, CellIndex)> = None;

    for row in (current.row - radius)..=(current.row + radius) {
        for col in (current.col - radius)..=(current.col + radius) {
            let candidate = CellIndex::new(row, col);

            if (cell_centre(candidate) - position).norm() > radius as f64 {
                continue;
            }
            if !matches!(state.grid().get(candidate), Ok(c) if c.is_vacant()) {
                continue;
            }
            if candidate != target_cell && state.is_immediate_backtrack(candidate) {
                continue;
            }
            if !is_hop_clear(state, candidate, target_cell) {
                continue;
            }

            let path = match find_path(state, candidate, target_cell) {
                Some(p) => p,
                None => continue,
            };

            let next = first_actionable(&path, current);
            let hop_cm = (cell_centre(next) - position).norm() * precision;
            let cost = hop_cm + (path.len() - 1) as f64 * precision;

            if best.map_or(true, |(c, _)| cost < c) {
                best = Some((cost, next));
            }
        }
    }

    let (cost, next) = best?;

    debug!(
        "Alternate start found, heading for {:?} (cost {:.1} cm)",
        next, cost
    );

    step_toward(state, cell_centre(next), Strategy::AlternateStart)
}

/// The first cell of a path worth driving to from `current`.
fn first_actionable(path: &[CellIndex], current: CellIndex) -> CellIndex {
    match (path.first(), path.get(1)) {
        (Some(first), Some(second)) if *first == current => *second,
        (Some(first), _) => *first,
        (None, _) => current,
    }
}

/// True if the robot can drive straight from its position to `to`.
///
/// A robot already inside an inflated region may drive out through it, but
/// not into another one. The hop never passes back through the cell visited
/// before the current one, unless that cell is the target.
fn is_hop_clear(state: &MapState, to: CellIndex, target_cell: CellIndex) -> bool {
    let position = state.pose().position;
    let current = state.current_cell();

    let mut escaping = !matches!(state.grid().get(current), Ok(c) if c.is_vacant());

    for crossing in crossings(position, cell_centre(to) - position) {
        let corners_clear = crossing.corners.iter().flatten().all(|corner| {
            *corner == current || is_hop_cell_clear(state, *corner, target_cell, escaping)
        });
        if !corners_clear {
            return false;
        }

        let cell = crossing.cell;
        if cell == current {
            continue;
        }

        if !is_hop_cell_clear(state, cell, target_cell, escaping) {
            return false;
        }
        if matches!(state.grid().get(cell), Ok(c) if c.is_vacant()) {
            escaping = false;
        }
    }

    true
}

/// A cell a hop may cross.
fn is_hop_cell_clear(
    state: &MapState,
    index: CellIndex,
    target_cell: CellIndex,
    escaping: bool,
) -> bool {
    if index != target_cell && state.is_immediate_backtrack(index) {
        return false;
    }

    match state.grid().get(index) {
        Ok(Cell::Inflated) => escaping,
        Ok(c) => c.is_vacant(),
        Err(_) => false,
    }
}

/// A cell the straight line planners may drive through.
fn is_clear(state: &MapState, index: CellIndex, target_cell: CellIndex) -> bool {
    match state.grid().get(index) {
        Ok(c) if c.is_hard_blocked() || c.is_soft() => false,
        Ok(_) => index == target_cell || !state.is_immediate_backtrack(index),
        Err(_) => false,
    }
}

/// Points along `delta` from `start`, excluding the start and including the
/// end, spaced at most half a cell apart.
fn sample_line(start: Vector2<f64>, delta: Vector2<f64>) -> impl Iterator<Item = Vector2<f64>> {
    let samples = ((2.0 * delta.x.abs().max(delta.y.abs())).ceil() as usize).max(2);

    (1..=samples).map(move |i| start + delta * (i as f64 / samples as f64))
}

/// The samples of a straight line with the cells they land in.
///
/// Consecutive samples are never more than one cell apart on either axis, so
/// the line only touches the sampled cells and, where it steps diagonally,
/// the two cells either side of the corner it cuts.
fn crossings(start: Vector2<f64>, delta: Vector2<f64>) -> impl Iterator<Item = Crossing> {
    let mut prev = CellIndex::from_position(start.x, start.y);

    sample_line(start, delta).map(move |point| {
        let cell = CellIndex::from_position(point.x, point.y);

        let corners = if cell.row != prev.row && cell.col != prev.col {
            Some([
                CellIndex::new(prev.row, cell.col),
                CellIndex::new(cell.row, prev.col),
            ])
        } else {
            None
        };
        prev = cell;

        Crossing {
            point,
            cell,
            corners,
        }
    })
}

fn cell_centre(index: CellIndex) -> Vector2<f64> {
    Vector2::new(index.col as f64, index.row as f64)
}

/// Build the motion which takes the robot to `point`, or `None` if it rounds
/// to nothing.
fn step_toward(state: &MapState, point: Vector2<f64>, strategy: Strategy) -> Option<PlanOutcome> {
    let pose = state.pose();
    let delta = point - pose.position;

    let distance_cm = (delta.norm() * state.precision_cm()).round() as i32;
    if distance_cm == 0 {
        return None;
    }

    let bearing_deg = (-delta.y).atan2(delta.x).to_degrees();
    let motion = Motion::new(distance_cm, get_ang_dist_deg(pose.heading_deg, bearing_deg));

    trace!("{:?}: {:?}", strategy, motion);

    Some(PlanOutcome {
        motion,
        strategy,
        waypoint: Some(point),
    })
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
