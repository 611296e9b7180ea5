//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of platform
//! concerns:
//! - Time only comes in through `TickInput`
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod pursuit;
pub mod scoring;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{find_capture, find_pickup};
pub use pursuit::{advance_pursuers, step_toward};
pub use scoring::difficulty_for_score;
pub use spawner::{draw_power_up, pick_weighted};
pub use state::{
    GameEvent, GameOverReason, GamePhase, GameState, PowerUp, PowerUpKind, Pursuer, Viewport,
};
pub use tick::{TickInput, TickResult, tick};
