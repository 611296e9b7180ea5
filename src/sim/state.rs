//! Game state and core simulation types
//!
//! `GameState` is the single source of truth for a run. It is mutated only by
//! `tick` and by `GameState::begin` (start/restart).

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a player name, simulation suspended
    #[default]
    Idle,
    /// Active gameplay, one tick per display frame
    Playing,
    /// Run ended, simulation suspended until restart
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// A pursuer reached the pointer
    Captured { pursuer_id: u32 },
    /// Simulation state became unusable (NaN position, bad speed)
    InvariantViolation(String),
}

/// Screen rectangle the game is played in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// An entity chasing the pointer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pursuer {
    pub id: u32,
    pub pos: Vec2,
    /// Fraction of the remaining distance closed per nominal frame
    pub speed: f32,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpKind {
    /// Flat score bonus, not affected by the multiplier
    Score,
    /// Replaces the active score multiplier
    Multiplier,
}

/// A collectible with a limited lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub pos: Vec2,
    pub kind: PowerUpKind,
    pub value: u32,
    pub color: String,
    pub lifetime_ms: f64,
    pub created_at_ms: f64,
}

impl PowerUp {
    #[inline]
    pub fn age_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.created_at_ms
    }

    #[inline]
    pub fn is_expired(&self, now_ms: f64) -> bool {
        self.age_ms(now_ms) >= self.lifetime_ms
    }

    /// Remaining lifetime (never negative)
    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        (self.lifetime_ms - self.age_ms(now_ms)).max(0.0)
    }
}

/// Something noteworthy that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The one-second score cadence fired
    ScoreTick { score: u64, difficulty: f32 },
    /// Score crossed a pursuer threshold
    PursuerAdded { id: u32, score: u64 },
    PowerUpSpawned { id: u32, kind: PowerUpKind, value: u32 },
    PowerUpExpired { id: u32 },
    PowerUpCollected { id: u32, kind: PowerUpKind, value: u32 },
    /// Pointer was caught; the run is over
    Captured { pursuer_id: u32 },
    /// State could not be trusted; the run is over
    InvariantViolated { reason: String },
}

/// Complete state of one session
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: GamePhase,
    pub score: u64,
    pub score_multiplier: u32,
    /// Current default pursuer speed, derived from score
    pub difficulty: f32,
    pub player_name: String,
    /// Live pursuers (ascending id)
    pub pursuers: Vec<Pursuer>,
    /// Live power-ups (ascending id, i.e. oldest first)
    pub power_ups: Vec<PowerUp>,
    /// Wall-clock time of the last score tick
    pub last_score_tick_ms: f64,
    /// Wall-clock time of the last power-up spawn
    pub last_spawn_ms: f64,
    /// Frame timestamp of the previous tick (None before the first tick)
    pub last_frame_ms: Option<f64>,
    pub viewport: Viewport,
    pub game_over_reason: Option<GameOverReason>,
    /// Ticks processed during the current run
    pub ticks: u64,
    pub seed: u64,
    pub rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create an idle session
    pub fn new(seed: u64, viewport: Viewport) -> Self {
        Self {
            phase: GamePhase::Idle,
            score: 0,
            score_multiplier: 1,
            difficulty: crate::consts::BASE_DIFFICULTY,
            player_name: String::new(),
            pursuers: Vec::new(),
            power_ups: Vec::new(),
            last_score_tick_ms: 0.0,
            last_spawn_ms: 0.0,
            last_frame_ms: None,
            viewport,
            game_over_reason: None,
            ticks: 0,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Enter `Playing` with a fresh run: score zeroed, multiplier reset,
    /// difficulty at base, one pursuer at screen centre, no power-ups.
    pub fn begin(&mut self, player_name: &str, now_ms: f64, tuning: &Tuning) {
        self.phase = GamePhase::Playing;
        self.score = 0;
        self.score_multiplier = 1;
        self.difficulty = tuning.base_difficulty;
        self.player_name = player_name.to_string();
        self.power_ups.clear();
        self.pursuers.clear();
        self.last_score_tick_ms = now_ms;
        self.last_spawn_ms = now_ms;
        self.last_frame_ms = None;
        self.game_over_reason = None;
        self.ticks = 0;

        let id = self.next_entity_id();
        self.pursuers.push(Pursuer {
            id,
            pos: self.viewport.center(),
            speed: tuning.base_difficulty,
        });
    }

    /// Enter `GameOver`; the state is frozen from here until the next `begin`
    pub fn end(&mut self, reason: GameOverReason) {
        self.phase = GamePhase::GameOver;
        self.game_over_reason = Some(reason);
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.pursuers.sort_by_key(|p| p.id);
        self.power_ups.sort_by_key(|p| p.id);
    }
}
