//! Cursor Chase - evade the pursuers for as long as you can
//!
//! Core modules:
//! - `sim`: Simulation core (pursuit, scoring, spawning, collisions, tick)
//! - `session`: Game lifecycle (idle, playing, game over) and collaborator wiring
//! - `platform`: Clock, frame driver, input tracking and storage
//! - `audio`: Named sound cues
//! - `highscores` / `game_over`: Score backend and the game-over flow
//! - `tuning` / `settings`: Data-driven balance and user preferences

pub mod audio;
pub mod autopilot;
pub mod error;
pub mod game_over;
pub mod highscores;
pub mod hud;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{NameError, ScoreError, StorageError, TuningError};
pub use session::{Session, Snapshot};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame length the pursuit law is expressed against
    pub const NOMINAL_FRAME_MS: f32 = 16.0;

    /// Capture distance between pointer and pursuer centre
    pub const CAPTURE_RADIUS: f32 = 30.0;
    /// Pointer hit radius used for pickups
    pub const POINTER_RADIUS: f32 = 20.0;
    /// Half of the rendered power-up width
    pub const POWER_UP_HALF_SIZE: f32 = 16.0;

    /// Score cadence
    pub const SCORE_INTERVAL_MS: f64 = 1000.0;
    /// Difficulty (pursuer speed) bounds and growth per point
    pub const BASE_DIFFICULTY: f32 = 0.04;
    pub const MAX_DIFFICULTY: f32 = 0.12;
    pub const DIFFICULTY_PER_POINT: f32 = 0.0001;
    /// A new pursuer joins every time the score crosses a multiple of this
    pub const PURSUER_SCORE_STEP: u64 = 50;

    /// Power-up cadence and placement
    pub const SPAWN_INTERVAL_MS: f64 = 5000.0;
    pub const SPAWN_PADDING: f32 = 100.0;

    /// Longest accepted player name
    pub const MAX_NAME_LEN: usize = 20;
    /// Leaderboard size
    pub const LEADERBOARD_SIZE: usize = 10;
}

/// Euclidean distance between two screen points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// True when both coordinates are finite
#[inline]
pub fn is_finite_point(p: Vec2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}
