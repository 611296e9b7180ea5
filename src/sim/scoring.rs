//! Score cadence, difficulty curve and pursuer escalation

use super::spawner::random_point;
use super::state::{GameEvent, GameState, PowerUp, PowerUpKind, Pursuer};
use crate::tuning::Tuning;

/// Pursuer speed for a given score, clamped to the tuning bounds
pub fn difficulty_for_score(score: u64, tuning: &Tuning) -> f32 {
    let raw = tuning.base_difficulty + score as f32 * tuning.difficulty_per_point;
    raw.clamp(tuning.base_difficulty, tuning.max_difficulty)
}

/// True when going from `old` to `new` crosses a multiple of `step`
#[inline]
pub fn crosses_threshold(old: u64, new: u64, step: u64) -> bool {
    new / step > old / step
}

/// Fire the score cadence if a full interval has elapsed since the last one.
///
/// Fires at most once per call: a late frame earns a single increment, and the
/// cadence restarts from `now_ms`. The new difficulty is applied to every live
/// pursuer.
pub fn score_tick(
    state: &mut GameState,
    now_ms: f64,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> bool {
    if now_ms - state.last_score_tick_ms < tuning.score_interval_ms {
        return false;
    }

    let gain = u64::from(state.score_multiplier);
    state.last_score_tick_ms = now_ms;
    state.difficulty = difficulty_for_score(state.score.saturating_add(gain), tuning);
    for pursuer in &mut state.pursuers {
        pursuer.speed = state.difficulty;
    }
    add_score(state, gain, tuning, events);

    log::debug!(
        "Score tick: score={} difficulty={:.4} pursuers={}",
        state.score,
        state.difficulty,
        state.pursuers.len()
    );
    events.push(GameEvent::ScoreTick {
        score: state.score,
        difficulty: state.difficulty,
    });
    true
}

/// Add points and bring in a new pursuer when a threshold is crossed
pub fn add_score(
    state: &mut GameState,
    gain: u64,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    let old = state.score;
    state.score = old.saturating_add(gain);

    if crosses_threshold(old, state.score, tuning.pursuer_score_step) {
        let id = state.next_entity_id();
        let viewport = state.viewport;
        let pos = random_point(
            &mut state.rng,
            glam::Vec2::ZERO,
            glam::Vec2::new(viewport.width, viewport.height),
        );
        state.pursuers.push(Pursuer {
            id,
            pos,
            speed: state.difficulty,
        });
        log::info!(
            "New pursuer {} at ({:.0}, {:.0}), score {}, {} chasing",
            id,
            pos.x,
            pos.y,
            state.score,
            state.pursuers.len()
        );
        events.push(GameEvent::PursuerAdded {
            id,
            score: state.score,
        });
    }
}

/// Apply a collected power-up's effect
pub fn apply_power_up(
    state: &mut GameState,
    power_up: &PowerUp,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    match power_up.kind {
        PowerUpKind::Score => {
            add_score(state, u64::from(power_up.value), tuning, events);
        }
        PowerUpKind::Multiplier => {
            // Absolute: a weaker pickup replaces a stronger active multiplier
            state.score_multiplier = power_up.value.max(1);
        }
    }
    log::info!(
        "Collected {:?} power-up {} (value {}): score={} multiplier={}",
        power_up.kind,
        power_up.id,
        power_up.value,
        state.score,
        state.score_multiplier
    );
    events.push(GameEvent::PowerUpCollected {
        id: power_up.id,
        kind: power_up.kind,
        value: power_up.value,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Viewport;
    use glam::Vec2;
    use proptest::prelude::*;

    fn playing(now_ms: f64) -> (GameState, Tuning) {
        let tuning = Tuning::default();
        let mut state = GameState::new(7, Viewport::new(800.0, 600.0));
        state.begin("p", now_ms, &tuning);
        (state, tuning)
    }

    fn power_up(kind: PowerUpKind, value: u32) -> PowerUp {
        PowerUp {
            id: 99,
            pos: Vec2::ZERO,
            kind,
            value,
            color: "x".into(),
            lifetime_ms: 1000.0,
            created_at_ms: 0.0,
        }
    }

    #[test]
    fn test_difficulty_curve() {
        let tuning = Tuning::default();
        assert_eq!(difficulty_for_score(0, &tuning), 0.04);
        assert!((difficulty_for_score(100, &tuning) - 0.05).abs() < 1e-6);
        assert_eq!(difficulty_for_score(10_000, &tuning), 0.12);
        assert_eq!(difficulty_for_score(u64::MAX, &tuning), 0.12);
    }

    #[test]
    fn test_score_tick_needs_full_interval() {
        let (mut state, tuning) = playing(0.0);
        let mut events = Vec::new();

        assert!(!score_tick(&mut state, 999.0, &tuning, &mut events));
        assert!(score_tick(&mut state, 1000.0, &tuning, &mut events));
        assert_eq!(state.score, 1);
        // 999ms after the last tick: nothing
        assert!(!score_tick(&mut state, 1999.0, &tuning, &mut events));
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_late_frame_earns_one_increment() {
        let (mut state, tuning) = playing(0.0);
        let mut events = Vec::new();
        assert!(score_tick(&mut state, 5500.0, &tuning, &mut events));
        assert_eq!(state.score, 1);
        assert_eq!(state.last_score_tick_ms, 5500.0);
    }

    #[test]
    fn test_score_tick_uses_multiplier_and_speeds_up_everyone() {
        let (mut state, tuning) = playing(0.0);
        state.score = 100;
        state.score_multiplier = 3;
        let mut events = Vec::new();
        score_tick(&mut state, 1000.0, &tuning, &mut events);

        assert_eq!(state.score, 103);
        let expected = difficulty_for_score(103, &tuning);
        assert_eq!(state.difficulty, expected);
        assert!(state.pursuers.iter().all(|p| p.speed == expected));
    }

    #[test]
    fn test_pursuer_added_on_crossing_only() {
        let (mut state, tuning) = playing(0.0);
        let mut events = Vec::new();

        state.score = 48;
        add_score(&mut state, 1, &tuning, &mut events);
        assert_eq!(state.pursuers.len(), 1);

        add_score(&mut state, 1, &tuning, &mut events);
        assert_eq!(state.score, 50);
        assert_eq!(state.pursuers.len(), 2);

        add_score(&mut state, 3, &tuning, &mut events);
        assert_eq!(state.pursuers.len(), 2);

        // Jumping over two multiples still adds a single pursuer
        add_score(&mut state, 100, &tuning, &mut events);
        assert_eq!(state.score, 153);
        assert_eq!(state.pursuers.len(), 3);
        assert_eq!(
            events.iter().filter(|e| matches!(e, GameEvent::PursuerAdded { .. })).count(),
            2
        );
    }

    #[test]
    fn test_new_pursuer_is_on_screen_at_current_difficulty() {
        let (mut state, tuning) = playing(0.0);
        state.difficulty = 0.07;
        state.score = 49;
        add_score(&mut state, 1, &tuning, &mut Vec::new());

        let added = state.pursuers.last().unwrap();
        assert_eq!(added.speed, 0.07);
        assert!((0.0..=800.0).contains(&added.pos.x));
        assert!((0.0..=600.0).contains(&added.pos.y));
    }

    #[test]
    fn test_score_power_up_ignores_multiplier() {
        let (mut state, tuning) = playing(0.0);
        state.score_multiplier = 3;
        apply_power_up(&mut state, &power_up(PowerUpKind::Score, 10), &tuning, &mut Vec::new());
        assert_eq!(state.score, 10);
        assert_eq!(state.score_multiplier, 3);
    }

    #[test]
    fn test_multiplier_power_up_is_absolute() {
        let (mut state, tuning) = playing(0.0);
        apply_power_up(&mut state, &power_up(PowerUpKind::Multiplier, 3), &tuning, &mut Vec::new());
        assert_eq!(state.score_multiplier, 3);
        apply_power_up(&mut state, &power_up(PowerUpKind::Multiplier, 2), &tuning, &mut Vec::new());
        assert_eq!(state.score_multiplier, 2);
    }

    proptest! {
        #[test]
        fn prop_difficulty_monotonic_and_bounded(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let tuning = Tuning::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let d_lo = difficulty_for_score(lo, &tuning);
            let d_hi = difficulty_for_score(hi, &tuning);
            prop_assert!(d_lo <= d_hi);
            prop_assert!(d_lo >= tuning.base_difficulty && d_hi <= tuning.max_difficulty);
        }

        #[test]
        fn prop_threshold_matches_floor_rule(old in 0u64..10_000, gain in 0u64..200) {
            let new = old + gain;
            let crossed = crosses_threshold(old, new, 50);
            prop_assert_eq!(crossed, (old / 50) < (new / 50));
            if gain == 0 {
                prop_assert!(!crossed);
            }
        }
    }
}
