//! # A* search
//!
//! 4-connected search over the map with a Manhattan heuristic. Free cells
//! cost 1 to enter and plants cost the configured soft obstacle penalty, so
//! the heuristic stays admissible.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::trace;
use ordered_float::OrderedFloat;

use crate::map::{CellIndex, MapState};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const NEIGHBOURS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

const NO_PARENT: usize = usize::MAX;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Find the cheapest path from `start` to `goal`, both included.
///
/// Hard blocked cells are never entered, nor is the cell the robot was in
/// just before its current one (unless that cell is the goal). Returns `None`
/// if the start is unusable or no path exists.
pub fn find_path(state: &MapState, start: CellIndex, goal: CellIndex) -> Option<Vec<CellIndex>> {
    let grid = state.grid();

    match grid.get(start) {
        Ok(c) if !c.is_hard_blocked() => (),
        _ => return None,
    }
    if !is_passable(state, goal, goal) {
        return None;
    }

    let cols = grid.cols();
    let num_cells = grid.rows() * cols;
    let flat = |c: CellIndex| c.row as usize * cols + c.col as usize;
    let unflat = |i: usize| CellIndex::new((i / cols) as isize, (i % cols) as isize);

    let soft_cost = state.params().soft_obstacle_cost.max(1.0);

    let mut cost = vec![f64::INFINITY; num_cells];
    let mut parent = vec![NO_PARENT; num_cells];
    let mut closed = vec![false; num_cells];
    let mut open = BinaryHeap::new();

    let start_i = flat(start);
    let goal_i = flat(goal);

    cost[start_i] = 0.0;
    open.push(Reverse((OrderedFloat(start.manhattan(&goal) as f64), start_i)));

    let mut num_expanded = 0usize;

    while let Some(Reverse((_, i))) = open.pop() {
        if closed[i] {
            continue;
        }
        closed[i] = true;
        num_expanded += 1;

        if i == goal_i {
            let mut path = vec![goal];
            let mut j = i;
            while parent[j] != NO_PARENT {
                j = parent[j];
                path.push(unflat(j));
            }
            path.reverse();

            trace!(
                "A* found a {} cell path from {:?} to {:?} ({} cells expanded)",
                path.len(),
                start,
                goal,
                num_expanded
            );

            return Some(path);
        }

        let cell = unflat(i);
        for (dr, dc) in NEIGHBOURS.iter() {
            let next = CellIndex::new(cell.row + dr, cell.col + dc);
            if !is_passable(state, next, goal) {
                continue;
            }

            let next_i = flat(next);
            if closed[next_i] {
                continue;
            }

            let step = match grid.get(next) {
                Ok(c) if c.is_soft() => soft_cost,
                _ => 1.0,
            };
            let next_cost = cost[i] + step;

            if next_cost < cost[next_i] {
                cost[next_i] = next_cost;
                parent[next_i] = i;
                open.push(Reverse((
                    OrderedFloat(next_cost + next.manhattan(&goal) as f64),
                    next_i,
                )));
            }
        }
    }

    trace!(
        "A* found no path from {:?} to {:?} ({} cells expanded)",
        start,
        goal,
        num_expanded
    );

    None
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// A cell the search may step into.
fn is_passable(state: &MapState, index: CellIndex, goal: CellIndex) -> bool {
    match state.grid().get(index) {
        Ok(c) if !c.is_hard_blocked() => index == goal || !state.is_immediate_backtrack(index),
        _ => false,
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::map::{Cell, MapParams};

    fn state() -> MapState {
        MapState::new(80.0, 80.0, MapParams::default())
    }

    fn is_connected(path: &[CellIndex]) -> bool {
        path.windows(2).all(|w| w[0].manhattan(&w[1]) == 1)
    }

    #[test]
    fn test_open_grid() {
        let s = state();
        let path = find_path(&s, CellIndex::new(10, 10), CellIndex::new(13, 15)).unwrap();

        assert_eq!(path.len(), 9);
        assert_eq!(path[0], CellIndex::new(10, 10));
        assert_eq!(path[8], CellIndex::new(13, 15));
        assert!(is_connected(&path));
    }

    #[test]
    fn test_start_is_goal() {
        let s = state();
        assert_eq!(
            find_path(&s, CellIndex::new(3, 3), CellIndex::new(3, 3)),
            Some(vec![CellIndex::new(3, 3)])
        );
    }

    #[test]
    fn test_around_wall() {
        let mut s = state();
        for row in 2..18 {
            s.grid.set(CellIndex::new(row, 10), Cell::Obstacle).unwrap();
        }

        let path = find_path(&s, CellIndex::new(10, 5), CellIndex::new(10, 15)).unwrap();

        assert!(is_connected(&path));
        assert!(path.iter().all(|c| c.col != 10 || c.row < 2 || c.row >= 18));
        assert_eq!(path.len(), 27);
    }

    #[test]
    fn test_plants_are_avoided_when_cheap_to() {
        let mut s = state();
        s.grid.set(CellIndex::new(5, 6), Cell::Plant).unwrap();

        let path = find_path(&s, CellIndex::new(5, 5), CellIndex::new(5, 7)).unwrap();

        assert_eq!(path.len(), 5);
        assert!(!path.contains(&CellIndex::new(5, 6)));
    }

    #[test]
    fn test_plants_are_crossed_when_only_way() {
        let mut s = state();
        for row in 0..20 {
            s.grid.set(CellIndex::new(row, 10), Cell::Plant).unwrap();
        }

        let path = find_path(&s, CellIndex::new(5, 8), CellIndex::new(5, 12)).unwrap();

        assert_eq!(path.len(), 5);
        assert!(path.contains(&CellIndex::new(5, 10)));
    }

    #[test]
    fn test_no_path() {
        let mut s = state();
        for (r, c) in [(4, 5), (6, 5), (5, 4), (5, 6)].iter() {
            s.grid.set(CellIndex::new(*r, *c), Cell::Inflated).unwrap();
        }

        assert!(find_path(&s, CellIndex::new(5, 5), CellIndex::new(15, 15)).is_none());
        assert!(find_path(&s, CellIndex::new(15, 15), CellIndex::new(4, 5)).is_none());
        assert!(find_path(&s, CellIndex::new(4, 5), CellIndex::new(15, 15)).is_none());
        assert!(find_path(&s, CellIndex::new(-1, 5), CellIndex::new(15, 15)).is_none());
    }

    #[test]
    fn test_backtrack_cell_excluded() {
        let mut s = state();

        // Robot came from (10, 9) into (10, 10)
        s.stamp(CellIndex::new(10, 9));
        s.stamp(CellIndex::new(10, 10));

        let path = find_path(&s, CellIndex::new(10, 10), CellIndex::new(10, 7)).unwrap();
        assert!(!path.contains(&CellIndex::new(10, 9)));
        assert_eq!(path.len(), 6);

        // Unless it's where we're going
        let path = find_path(&s, CellIndex::new(10, 10), CellIndex::new(10, 9)).unwrap();
        assert_eq!(path, vec![CellIndex::new(10, 10), CellIndex::new(10, 9)]);
    }
}
