//! Pursuit engine
//!
//! Pursuers close a fixed fraction of their remaining distance to the pointer
//! every nominal frame, scaled by the real frame length:
//!
//! `pos += (target - pos) * speed * (dt / nominal_frame)`
//!
//! This is an exponential approach, not a velocity: pursuers slow down as they
//! get close and never overshoot while the factor stays below 1.

use glam::Vec2;

use super::state::Pursuer;

/// Fraction of the remaining distance closed this frame, capped at 1
#[inline]
pub fn approach_factor(speed: f32, dt_ms: f32, nominal_frame_ms: f32) -> f32 {
    if dt_ms <= 0.0 {
        return 0.0;
    }
    (speed * (dt_ms / nominal_frame_ms)).min(1.0)
}

/// Position after one step toward `target`
#[inline]
pub fn step_toward(pos: Vec2, target: Vec2, speed: f32, dt_ms: f32, nominal_frame_ms: f32) -> Vec2 {
    pos + (target - pos) * approach_factor(speed, dt_ms, nominal_frame_ms)
}

/// Move every pursuer toward `target`
pub fn advance_pursuers(pursuers: &mut [Pursuer], target: Vec2, dt_ms: f32, nominal_frame_ms: f32) {
    for pursuer in pursuers.iter_mut() {
        pursuer.pos = step_toward(pursuer.pos, target, pursuer.speed, dt_ms, nominal_frame_ms);
    }
}

/// First pursuer whose state cannot be trusted, with a description
pub fn find_invalid_pursuer(pursuers: &[Pursuer]) -> Option<String> {
    pursuers.iter().find_map(|p| {
        if !crate::is_finite_point(p.pos) {
            Some(format!("pursuer {} has non-finite position {:?}", p.id, p.pos))
        } else if !p.speed.is_finite() || p.speed <= 0.0 {
            Some(format!("pursuer {} has invalid speed {}", p.id, p.speed))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FRAME: f32 = 16.0;

    #[test]
    fn test_one_nominal_frame() {
        let pos = step_toward(Vec2::ZERO, Vec2::new(100.0, 0.0), 0.04, 16.0, FRAME);
        assert!((pos.x - 4.0).abs() < 1e-5);
        assert_eq!(pos.y, 0.0);
    }

    #[test]
    fn test_zero_dt_does_not_move() {
        let pos = step_toward(Vec2::new(5.0, 5.0), Vec2::new(100.0, 0.0), 0.04, 0.0, FRAME);
        assert_eq!(pos, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_long_frame_lands_on_target_instead_of_overshooting() {
        let target = Vec2::new(50.0, -20.0);
        let pos = step_toward(Vec2::ZERO, target, 0.12, 1000.0, FRAME);
        assert_eq!(pos, target);
    }

    #[test]
    fn test_double_frame_moves_twice_as_far() {
        let one = step_toward(Vec2::ZERO, Vec2::new(100.0, 0.0), 0.04, 16.0, FRAME);
        let two = step_toward(Vec2::ZERO, Vec2::new(100.0, 0.0), 0.04, 32.0, FRAME);
        assert!((two.x - 2.0 * one.x).abs() < 1e-4);
    }

    #[test]
    fn test_advance_moves_every_pursuer() {
        let mut pursuers = vec![
            Pursuer { id: 1, pos: Vec2::ZERO, speed: 0.1 },
            Pursuer { id: 2, pos: Vec2::new(200.0, 0.0), speed: 0.05 },
        ];
        advance_pursuers(&mut pursuers, Vec2::new(100.0, 0.0), 16.0, FRAME);
        assert!((pursuers[0].pos.x - 10.0).abs() < 1e-4);
        assert!((pursuers[1].pos.x - 195.0).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_pursuers_are_reported() {
        let nan = [Pursuer { id: 7, pos: Vec2::new(f32::NAN, 0.0), speed: 0.04 }];
        assert!(find_invalid_pursuer(&nan).unwrap().contains("pursuer 7"));

        let stalled = [Pursuer { id: 8, pos: Vec2::ZERO, speed: 0.0 }];
        assert!(find_invalid_pursuer(&stalled).is_some());

        let fine = [Pursuer { id: 9, pos: Vec2::ZERO, speed: 0.04 }];
        assert!(find_invalid_pursuer(&fine).is_none());
    }

    proptest! {
        #[test]
        fn prop_never_overshoots(
            px in -1000.0f32..1000.0, py in -1000.0f32..1000.0,
            tx in -1000.0f32..1000.0, ty in -1000.0f32..1000.0,
            speed in 0.01f32..0.12, dt in 0.0f32..200.0,
        ) {
            let pos = Vec2::new(px, py);
            let target = Vec2::new(tx, ty);
            let next = step_toward(pos, target, speed, dt, FRAME);
            prop_assert!(next.distance(target) <= pos.distance(target) + 1e-3);
        }

        #[test]
        fn prop_matches_the_approach_law(
            px in -500.0f32..500.0, tx in -500.0f32..500.0,
            speed in 0.01f32..0.12, dt in 1.0f32..100.0,
        ) {
            let factor = speed * dt / FRAME;
            prop_assume!(factor < 1.0);
            let next = step_toward(Vec2::new(px, 0.0), Vec2::new(tx, 0.0), speed, dt, FRAME);
            let expected = px + (tx - px) * factor;
            prop_assert!((next.x - expected).abs() < 1e-2);
        }
    }
}
