//! Per-frame simulation tick
//!
//! One tick is one atomic step: the pointer position and both clocks are read
//! once from `TickInput`, every derived change is applied to `GameState`, and
//! the events describing what happened are returned. Nothing in here panics or
//! returns an error: a state that cannot be trusted ends the run instead.

use glam::Vec2;

use super::collision::{find_capture, find_pickup};
use super::pursuit::{advance_pursuers, find_invalid_pursuer};
use super::scoring::{apply_power_up, score_tick};
use super::spawner::{expire, maybe_spawn};
use super::state::{GameEvent, GameOverReason, GamePhase, GameState};
use crate::tuning::Tuning;

/// Everything a tick reads from the outside world
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Latest pointer position recorded before this tick began
    pub pointer: Vec2,
    /// Monotonic display-frame timestamp (drives pursuit)
    pub frame_time_ms: f64,
    /// Wall-clock time (drives score, spawn and expiry cadences)
    pub now_ms: f64,
}

/// Result of a tick
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick, in the order they happened
    pub events: Vec<GameEvent>,
    /// Whether the run ended this tick
    pub game_over: bool,
}

impl TickResult {
    /// Whether the frame driver should schedule another tick
    pub fn keep_running(&self, state: &GameState) -> bool {
        !self.game_over && state.is_playing()
    }
}

/// Advance the game state by one display frame
pub fn tick(state: &mut GameState, input: &TickInput, tuning: &Tuning) -> TickResult {
    let mut result = TickResult::default();

    // Don't tick unless playing
    if state.phase != GamePhase::Playing {
        return result;
    }

    // First tick of a run has no previous frame to measure against
    let dt_ms = match state.last_frame_ms {
        Some(last) => (input.frame_time_ms - last).max(0.0),
        None => 0.0,
    };
    state.last_frame_ms = Some(input.frame_time_ms);
    state.ticks += 1;

    // Nothing moves on input or state that cannot be trusted
    let invalid = (!crate::is_finite_point(input.pointer))
        .then(|| format!("pointer position {:?} is not finite", input.pointer))
        .or_else(|| find_invalid_pursuer(&state.pursuers));
    if let Some(reason) = invalid {
        end_invalid(state, reason, &mut result);
        return result;
    }

    let events = &mut result.events;

    // Score cadence, difficulty, pursuer escalation
    score_tick(state, input.now_ms, tuning, events);

    // Power-up lifecycle
    maybe_spawn(state, input.now_ms, tuning, events);
    expire(state, input.now_ms, events);

    // Pursuit
    let dt = if dt_ms.is_finite() { dt_ms as f32 } else { 0.0 };
    let mut moved = state.pursuers.clone();
    advance_pursuers(&mut moved, input.pointer, dt, tuning.nominal_frame_ms);
    // A bad step is never committed; the last good positions stay frozen
    if let Some(reason) = find_invalid_pursuer(&moved) {
        end_invalid(state, reason, &mut result);
        return result;
    }
    state.pursuers = moved;

    // Capture is checked against post-movement positions; the state is frozen
    // at this moment
    if let Some(pursuer_id) = find_capture(&state.pursuers, input.pointer, tuning.capture_radius) {
        log::info!(
            "Captured by pursuer {} with score {} after {} ticks",
            pursuer_id,
            state.score,
            state.ticks
        );
        events.push(GameEvent::Captured { pursuer_id });
        state.end(GameOverReason::Captured { pursuer_id });
        result.game_over = true;
        return result;
    }

    // At most one pickup per tick
    if let Some(idx) = find_pickup(&state.power_ups, input.pointer, tuning.pickup_radius()) {
        let power_up = state.power_ups.remove(idx);
        apply_power_up(state, &power_up, tuning, events);
    }

    // Ensure deterministic ordering
    state.normalize_order();

    result
}

/// End the run on a violated invariant
fn end_invalid(state: &mut GameState, reason: String, result: &mut TickResult) {
    log::warn!("Ending run, invariant violated: {}", reason);
    result.events.push(GameEvent::InvariantViolated {
        reason: reason.clone(),
    });
    state.end(GameOverReason::InvariantViolation(reason));
    result.game_over = true;
}
