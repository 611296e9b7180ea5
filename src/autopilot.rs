//! Demo/idle mode pointer
//!
//! Plays the game from a snapshot: runs from the pursuers (nearest ones weigh
//! most), keeps off the walls, and goes for the nearest power-up while nothing
//! is close.

use glam::Vec2;

use crate::session::Snapshot;
use crate::sim::GamePhase;

#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    /// Pointer travel per 16ms frame
    pub max_step: f32,
    /// Nearest pursuer farther than this: safe to chase pickups
    pub safe_distance: f32,
    /// Wall repulsion band
    pub margin: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            max_step: 12.0,
            safe_distance: 150.0,
            margin: 60.0,
        }
    }
}

impl Autopilot {
    /// Where the pointer should be after `dt_ms`
    pub fn steer(&self, snap: &Snapshot, dt_ms: f32) -> Vec2 {
        let pointer = snap.pointer;
        if snap.phase != GamePhase::Playing {
            return pointer;
        }

        let nearest = snap
            .pursuers
            .iter()
            .map(|p| p.pos.distance(pointer))
            .fold(f32::INFINITY, f32::min);

        let target_pickup = if nearest > self.safe_distance {
            snap.power_ups
                .iter()
                .min_by(|a, b| {
                    a.pos
                        .distance(pointer)
                        .partial_cmp(&b.pos.distance(pointer))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|p| p.pos)
        } else {
            None
        };

        let dir = match target_pickup {
            // Go get the pickup!
            Some(pos) => (pos - pointer).normalize_or_zero(),
            None => {
                let away = self.flee(snap) + self.wall_push(snap);
                if away.length_squared() > 0.0 {
                    away.normalize()
                } else {
                    // Boxed in symmetrically; break the tie toward the centre
                    (snap.viewport.center() - pointer).normalize_or(Vec2::X)
                }
            }
        };

        let step = self.max_step * (dt_ms.max(0.0) / crate::consts::NOMINAL_FRAME_MS);
        let next = pointer + dir * step;
        next.clamp(
            Vec2::ZERO,
            Vec2::new(snap.viewport.width, snap.viewport.height),
        )
    }

    /// Sum of unit vectors away from each pursuer, weighted by 1/distance
    fn flee(&self, snap: &Snapshot) -> Vec2 {
        snap.pursuers
            .iter()
            .map(|p| {
                let offset = snap.pointer - p.pos;
                let dist = offset.length().max(1.0);
                offset.normalize_or_zero() / dist
            })
            .sum()
    }

    /// Push back from edges closer than `margin`, same 1/distance scale
    fn wall_push(&self, snap: &Snapshot) -> Vec2 {
        let p = snap.pointer;
        let (w, h) = (snap.viewport.width, snap.viewport.height);
        let push = |d: f32| {
            if d < self.margin {
                1.0 / d.max(1.0)
            } else {
                0.0
            }
        };
        Vec2::new(push(p.x) - push(w - p.x), push(p.y) - push(h - p.y))
    }
}
