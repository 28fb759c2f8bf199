//! # Footprint stamping
//!
//! Marks the cells covered by the robot's body and keeps the bounded window
//! of recently visited cells used to stop the planner oscillating between two
//! cells.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;

use log::trace;

use super::{Cell, CellIndex, MapState, Shift};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Robot size and visit history.
#[derive(Debug, Clone)]
pub struct Footprint {
    pub(crate) width_cm: i32,

    pub(crate) height_cm: i32,

    /// Half extent of the robot, rounded up to whole cells
    pub(crate) radius_cells: usize,

    /// Most recent visit at the back
    window: VecDeque<CellIndex>,

    capacity: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Footprint {
    pub fn new(capacity: usize) -> Self {
        Self {
            width_cm: 0,
            height_cm: 0,
            radius_cells: 0,
            window: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn radius_cells(&self) -> usize {
        self.radius_cells
    }

    pub fn size_cm(&self) -> (i32, i32) {
        (self.width_cm, self.height_cm)
    }

    /// Recently visited cells, oldest first.
    pub fn window(&self) -> &VecDeque<CellIndex> {
        &self.window
    }

    /// Set the body size, returning the new radius.
    ///
    /// The radius is `ceil(max(width, height) / (2 * precision))`.
    pub(crate) fn set_size(&mut self, width_cm: i32, height_cm: i32, precision_cm: i32) -> usize {
        self.width_cm = width_cm.max(0);
        self.height_cm = height_cm.max(0);

        let max_dim = self.width_cm.max(self.height_cm) as usize;
        let cell_span = 2 * precision_cm.max(1) as usize;

        self.radius_cells = (max_dim + cell_span - 1) / cell_span;
        self.radius_cells
    }

    pub(crate) fn shift(&mut self, shift: Shift) {
        for cell in self.window.iter_mut() {
            *cell = cell.shifted(shift);
        }
    }
}

impl MapState {
    /// Grow the grid so that the whole body around `centre` fits. Returns the
    /// centre after any growth.
    pub(crate) fn fit_footprint(&mut self, centre: CellIndex) -> CellIndex {
        let r = self.footprint.radius_cells as isize;

        let centre = centre.shifted(self.ensure_fit(CellIndex::new(centre.row - r, centre.col - r)));
        centre.shifted(self.ensure_fit(CellIndex::new(centre.row + r, centre.col + r)))
    }

    /// Record that the robot is in `centre`.
    ///
    /// Repeated stamps of the same cell are ignored. Otherwise the vacant
    /// cells under the body are marked as footprint and the cell enters the
    /// visit window, pushing out the oldest entry once the window is full.
    pub(crate) fn stamp(&mut self, centre: CellIndex) {
        if self.footprint.window.back() == Some(&centre) {
            return;
        }

        let r = self.footprint.radius_cells as isize;
        for row in (centre.row - r)..=(centre.row + r) {
            for col in (centre.col - r)..=(centre.col + r) {
                let index = CellIndex::new(row, col);
                if let Ok(cell) = self.grid.get(index) {
                    if cell == Cell::Free {
                        self.grid.set(index, Cell::RobotFootprint).ok();
                    }
                }
            }
        }

        if self.footprint.capacity == 0 {
            return;
        }

        self.footprint.window.push_back(centre);
        self.grid.add_visit(centre);

        while self.footprint.window.len() > self.footprint.capacity {
            if let Some(expired) = self.footprint.window.pop_front() {
                self.grid.remove_visit(expired);
            }
        }

        trace!("Stamped {:?}, window {:?}", centre, self.footprint.window);
    }

    /// True if entering `index` would return to the cell visited immediately
    /// before the current one.
    pub fn is_immediate_backtrack(&self, index: CellIndex) -> bool {
        let len = self.footprint.window.len();

        len >= 2 && self.footprint.window[len - 2] == index
    }

    /// Forget all recent visits.
    pub(crate) fn clear_recent_visits(&mut self) {
        self.footprint.window.clear();
        self.grid.clear_visits();
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::map::MapParams;

    fn state() -> MapState {
        MapState::new(200.0, 200.0, MapParams::default())
    }

    #[test]
    fn test_radius() {
        let mut fp = Footprint::new(4);

        assert_eq!(fp.set_size(0, 0, 4), 0);
        assert_eq!(fp.set_size(8, 4, 4), 1);
        assert_eq!(fp.set_size(9, 4, 4), 2);
        assert_eq!(fp.set_size(10, 24, 4), 3);
        assert_eq!(fp.set_size(-5, -5, 4), 0);
    }

    #[test]
    fn test_window_is_bounded() {
        let mut s = state();

        for col in 26..40 {
            s.stamp(CellIndex::new(25, col));
            assert!(s.footprint().window().len() <= 4);
        }

        let expected: Vec<_> = (36..40).map(|c| CellIndex::new(25, c)).collect();
        assert_eq!(s.footprint().window().iter().copied().collect::<Vec<_>>(), expected);

        // Markers exactly match the window
        assert!(!s.grid().is_visited(CellIndex::new(25, 35)));
        assert!(!s.grid().is_visited(CellIndex::new(25, 25)));
        for c in &expected {
            assert!(s.grid().is_visited(*c));
        }
    }

    #[test]
    fn test_repeated_stamp_ignored() {
        let mut s = state();
        s.stamp(CellIndex::new(25, 26));
        s.stamp(CellIndex::new(25, 26));

        assert_eq!(s.footprint().window().len(), 2);
    }

    #[test]
    fn test_revisited_cell_keeps_marker() {
        let mut s = state();

        // 25 -> 26 -> 25 -> 26 -> 27 leaves 25 in the window once after the oldest expires
        s.stamp(CellIndex::new(25, 26));
        s.stamp(CellIndex::new(25, 25));
        s.stamp(CellIndex::new(25, 26));
        s.stamp(CellIndex::new(25, 27));

        assert!(s.grid().is_visited(CellIndex::new(25, 25)));
        assert!(s.grid().is_visited(CellIndex::new(25, 26)));
    }

    #[test]
    fn test_immediate_backtrack() {
        let mut s = state();
        assert!(!s.is_immediate_backtrack(CellIndex::new(25, 25)));

        s.stamp(CellIndex::new(25, 26));
        assert!(s.is_immediate_backtrack(CellIndex::new(25, 25)));
        assert!(!s.is_immediate_backtrack(CellIndex::new(25, 26)));

        s.stamp(CellIndex::new(25, 27));
        assert!(s.is_immediate_backtrack(CellIndex::new(25, 26)));
        assert!(!s.is_immediate_backtrack(CellIndex::new(25, 25)));

        s.clear_recent_visits();
        assert!(!s.is_immediate_backtrack(CellIndex::new(25, 26)));
        assert!(!s.grid().is_visited(CellIndex::new(25, 27)));
    }

    #[test]
    fn test_body_stamp() {
        let mut s = state();
        s.footprint.set_size(8, 8, 4);
        s.grid.set(CellIndex::new(29, 31), Cell::Obstacle).unwrap();

        s.stamp(CellIndex::new(30, 30));

        for row in 29..=31 {
            for col in 29..=31 {
                let expected = if (row, col) == (29, 31) {
                    Cell::Obstacle
                } else {
                    Cell::RobotFootprint
                };
                assert_eq!(s.grid().get(CellIndex::new(row, col)), Ok(expected));
            }
        }
    }
}
