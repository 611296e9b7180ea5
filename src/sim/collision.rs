//! Collision checks between the pointer and everything else
//!
//! Both checks are strict: touching exactly at the radius is a miss.

use glam::Vec2;

use super::state::{PowerUp, Pursuer};
use crate::distance;

/// First pursuer (in iteration order) strictly inside `capture_radius`
pub fn find_capture(pursuers: &[Pursuer], pointer: Vec2, capture_radius: f32) -> Option<u32> {
    pursuers
        .iter()
        .find(|p| distance(p.pos, pointer) < capture_radius)
        .map(|p| p.id)
}

/// Index of the power-up the pointer collects this tick.
///
/// At most one per tick; when several overlap the pointer the first in
/// iteration order wins, which is the oldest since power-ups stay sorted by id.
pub fn find_pickup(power_ups: &[PowerUp], pointer: Vec2, pickup_radius: f32) -> Option<usize> {
    power_ups
        .iter()
        .position(|p| distance(p.pos, pointer) < pickup_radius)
}
