//! Latest pointer position
//!
//! Pointer events arrive from the UI boundary at any time; the simulation
//! reads whatever was recorded last when a tick begins. Clones share the same
//! slot, so the UI can hold one while the session holds another.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    latest: Rc<Cell<Vec2>>,
    accepting: Rc<Cell<bool>>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer move; ignored while no run is in progress and for
    /// non-finite coordinates
    pub fn record(&self, pos: Vec2) {
        if !crate::is_finite_point(pos) {
            log::warn!("Ignoring non-finite pointer position {:?}", pos);
            return;
        }
        if self.accepting.get() {
            self.latest.set(pos);
        }
    }

    /// Latest recorded position
    pub fn latest(&self) -> Vec2 {
        self.latest.get()
    }

    /// Start or stop accepting pointer moves
    pub fn set_accepting(&self, accepting: bool) {
        self.accepting.set(accepting);
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_value_wins() {
        let tracker = InputTracker::new();
        tracker.set_accepting(true);
        tracker.record(Vec2::new(1.0, 2.0));
        tracker.record(Vec2::new(3.0, 4.0));
        assert_eq!(tracker.latest(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_ignored_when_not_accepting() {
        let tracker = InputTracker::new();
        tracker.record(Vec2::new(9.0, 9.0));
        assert_eq!(tracker.latest(), Vec2::ZERO);
    }

    #[test]
    fn test_non_finite_moves_rejected() {
        let tracker = InputTracker::new();
        tracker.set_accepting(true);
        tracker.record(Vec2::new(3.0, 4.0));
        tracker.record(Vec2::new(f32::NAN, 5.0));
        tracker.record(Vec2::new(1.0, f32::NEG_INFINITY));
        assert_eq!(tracker.latest(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_clones_share_the_slot() {
        let session_side = InputTracker::new();
        let ui_side = session_side.clone();
        session_side.set_accepting(true);
        ui_side.record(Vec2::new(5.0, 6.0));
        assert_eq!(session_side.latest(), Vec2::new(5.0, 6.0));
    }
}
