//! Power-up spawning and expiry
//!
//! One power-up appears every spawn interval, picked by a single weighted draw
//! over the tuning table and placed inside the padded screen rectangle. Each
//! power-up expires on its own lifetime.

use glam::Vec2;
use rand::Rng;

use super::state::{GameEvent, GameState, PowerUp};
use crate::tuning::{PowerUpSpec, Tuning};

/// Uniform point in `[min, max)`; a collapsed axis yields its midpoint
pub fn random_point<R: Rng>(rng: &mut R, min: Vec2, max: Vec2) -> Vec2 {
    let x = random_axis(rng, min.x, max.x);
    let y = random_axis(rng, min.y, max.y);
    Vec2::new(x, y)
}

fn random_axis<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        (lo + hi) / 2.0
    }
}

/// Walk the table accumulating weights and return the first entry whose
/// cumulative weight reaches `roll`. Falls back to the first entry when float
/// rounding leaves `roll` above the total.
pub fn pick_weighted(table: &[PowerUpSpec], roll: f64) -> Option<&PowerUpSpec> {
    let mut cumulative = 0.0;
    for spec in table {
        cumulative += spec.weight;
        if cumulative >= roll {
            return Some(spec);
        }
    }
    table.first()
}

/// Draw a table entry with probability proportional to its weight
pub fn draw_power_up<'a, R: Rng>(rng: &mut R, table: &'a [PowerUpSpec]) -> Option<&'a PowerUpSpec> {
    let total: f64 = table.iter().map(|s| s.weight).sum();
    let roll = rng.random::<f64>() * total;
    pick_weighted(table, roll)
}

/// Spawn a power-up if a full spawn interval has elapsed
pub fn maybe_spawn(state: &mut GameState, now_ms: f64, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    if now_ms - state.last_spawn_ms < tuning.spawn_interval_ms {
        return;
    }
    state.last_spawn_ms = now_ms;

    let Some(spec) = draw_power_up(&mut state.rng, &tuning.power_ups) else {
        return;
    };
    let spec = spec.clone();

    let pad = Vec2::splat(tuning.spawn_padding);
    let screen = Vec2::new(state.viewport.width, state.viewport.height);
    let pos = random_point(&mut state.rng, pad, screen - pad);

    let id = state.next_entity_id();
    log::debug!(
        "Spawned {:?} power-up {} (value {}, {}ms) at ({:.0}, {:.0})",
        spec.kind,
        id,
        spec.value,
        spec.lifetime_ms,
        pos.x,
        pos.y
    );
    state.power_ups.push(PowerUp {
        id,
        pos,
        kind: spec.kind,
        value: spec.value,
        color: spec.color,
        lifetime_ms: spec.lifetime_ms,
        created_at_ms: now_ms,
    });
    events.push(GameEvent::PowerUpSpawned {
        id,
        kind: spec.kind,
        value: spec.value,
    });
}

/// Drop every power-up whose age reached its lifetime
pub fn expire(state: &mut GameState, now_ms: f64, events: &mut Vec<GameEvent>) {
    state.power_ups.retain(|p| {
        if p.is_expired(now_ms) {
            log::debug!("Power-up {} expired", p.id);
            events.push(GameEvent::PowerUpExpired { id: p.id });
            false
        } else {
            true
        }
    });
}
