//! Text HUD
//!
//! Pull-based render step: reads one `Snapshot` per frame and produces the
//! lines a host UI (or the terminal runner) displays. Never touches live state.

use crate::session::{PowerUpView, Snapshot};
use crate::sim::{GameOverReason, GamePhase, PowerUpKind};

/// `Score: N | Speed: S`, plus the active multiplier when above 1
pub fn status_line(snap: &Snapshot) -> String {
    let mut line = format!(
        "Score: {} | Speed: {}",
        snap.score,
        speed_display(snap.difficulty)
    );
    if snap.score_multiplier > 1 {
        line.push_str(&format!(" | {}x", snap.score_multiplier));
    }
    line
}

/// Difficulty as a whole number (0.04 -> 40)
pub fn speed_display(difficulty: f32) -> i64 {
    (difficulty * 1000.0).round() as i64
}

/// Badge text drawn on a power-up
pub fn power_up_label(kind: PowerUpKind, value: u32) -> String {
    match kind {
        PowerUpKind::Multiplier => format!("{}x", value),
        PowerUpKind::Score => format!("+{}", value),
    }
}

/// Whole seconds left, rounded, never negative
pub fn seconds_left(remaining_ms: f64) -> u64 {
    if !remaining_ms.is_finite() || remaining_ms <= 0.0 {
        return 0;
    }
    (remaining_ms / 1000.0).round() as u64
}

fn power_up_line(p: &PowerUpView) -> String {
    format!(
        "{} {} ({}s) at ({:.0}, {:.0})",
        p.color,
        power_up_label(p.kind, p.value),
        seconds_left(p.remaining_ms),
        p.pos.x,
        p.pos.y
    )
}

/// Everything to show for the current phase
pub fn render_lines(snap: &Snapshot) -> Vec<String> {
    match snap.phase {
        GamePhase::Idle => vec![
            "Cursor Chase".to_string(),
            "Avoid the white circle for as long as you can!".to_string(),
            "The chaser gets faster over time.".to_string(),
        ],
        GamePhase::Playing => {
            let mut lines = vec![
                snap.player_name.clone(),
                status_line(snap),
                format!("Pursuers: {}", snap.pursuers.len()),
            ];
            lines.extend(snap.power_ups.iter().map(power_up_line));
            lines
        }
        GamePhase::GameOver => {
            let mut lines = vec![
                "Game Over!".to_string(),
                format!("Player: {}", snap.player_name),
                format!("Final score: {}", snap.score),
            ];
            if let Some(GameOverReason::InvariantViolation(reason)) = &snap.game_over_reason {
                lines.push(format!("Run aborted: {}", reason));
            }
            lines
        }
    }
}
