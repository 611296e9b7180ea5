//! Data-driven game balance
//!
//! Every number the simulation reacts to lives here so a balance pass never
//! has to touch `sim`. `Tuning::default()` is the shipped balance.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;
use crate::sim::PowerUpKind;

/// One row of the power-up weight table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpSpec {
    pub kind: PowerUpKind,
    pub value: u32,
    pub lifetime_ms: f64,
    /// Relative draw weight (the shipped table sums to 1.0)
    pub weight: f64,
    /// Colour tag handed to the renderer
    pub color: String,
}

impl PowerUpSpec {
    fn new(kind: PowerUpKind, value: u32, lifetime_ms: f64, weight: f64, color: &str) -> Self {
        Self {
            kind,
            value,
            lifetime_ms,
            weight,
            color: color.to_string(),
        }
    }
}

/// Default power-up table
pub fn default_power_ups() -> Vec<PowerUpSpec> {
    vec![
        PowerUpSpec::new(PowerUpKind::Multiplier, 2, 7000.0, 0.30, "purple"),
        PowerUpSpec::new(PowerUpKind::Multiplier, 3, 5000.0, 0.20, "pink"),
        PowerUpSpec::new(PowerUpKind::Score, 10, 4000.0, 0.20, "green"),
        PowerUpSpec::new(PowerUpKind::Score, 50, 3000.0, 0.20, "blue"),
        PowerUpSpec::new(PowerUpKind::Score, 100, 2000.0, 0.10, "yellow"),
    ]
}

/// Game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Pursuit ===
    /// Frame length the per-frame approach factor is defined against
    pub nominal_frame_ms: f32,
    /// Pointer-to-pursuer distance that ends the run (strict `<`)
    pub capture_radius: f32,

    // === Scoring / difficulty ===
    pub score_interval_ms: f64,
    pub base_difficulty: f32,
    pub max_difficulty: f32,
    pub difficulty_per_point: f32,
    pub pursuer_score_step: u64,

    // === Power-ups ===
    pub spawn_interval_ms: f64,
    pub spawn_padding: f32,
    pub pointer_radius: f32,
    pub power_up_half_size: f32,
    pub power_ups: Vec<PowerUpSpec>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            nominal_frame_ms: NOMINAL_FRAME_MS,
            capture_radius: CAPTURE_RADIUS,

            score_interval_ms: SCORE_INTERVAL_MS,
            base_difficulty: BASE_DIFFICULTY,
            max_difficulty: MAX_DIFFICULTY,
            difficulty_per_point: DIFFICULTY_PER_POINT,
            pursuer_score_step: PURSUER_SCORE_STEP,

            spawn_interval_ms: SPAWN_INTERVAL_MS,
            spawn_padding: SPAWN_PADDING,
            pointer_radius: POINTER_RADIUS,
            power_up_half_size: POWER_UP_HALF_SIZE,
            power_ups: default_power_ups(),
        }
    }
}

impl Tuning {
    /// Storage key for a tuning override
    pub const STORAGE_KEY: &'static str = "cursor_chase_tuning";

    /// Pointer-to-power-up distance that collects it (strict `<`)
    #[inline]
    pub fn pickup_radius(&self) -> f32 {
        self.pointer_radius + self.power_up_half_size
    }

    /// Parse and validate a JSON tuning document; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load the tuning override from storage, falling back to defaults
    pub fn load(store: &impl crate::platform::KeyValueStore) -> Self {
        match store.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning override");
                    tuning
                }
                Err(e) => {
                    log::warn!("Ignoring tuning override: {}", e);
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Could not read tuning override: {}", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
            TuningError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if !(self.nominal_frame_ms > 0.0) {
            return Err(invalid("nominal_frame_ms", "must be positive"));
        }
        if !(self.capture_radius > 0.0) {
            return Err(invalid("capture_radius", "must be positive"));
        }
        if !(self.pointer_radius >= 0.0) || !(self.power_up_half_size >= 0.0) {
            return Err(invalid("pointer_radius", "pickup radii must not be negative"));
        }
        if !(self.score_interval_ms > 0.0) {
            return Err(invalid("score_interval_ms", "must be positive"));
        }
        if !(self.spawn_interval_ms > 0.0) {
            return Err(invalid("spawn_interval_ms", "must be positive"));
        }
        if !(self.spawn_padding >= 0.0) {
            return Err(invalid("spawn_padding", "must not be negative"));
        }
        if !(self.base_difficulty > 0.0) {
            return Err(invalid("base_difficulty", "must be positive"));
        }
        if !(self.max_difficulty >= self.base_difficulty) {
            return Err(invalid("max_difficulty", "must be at least base_difficulty"));
        }
        if !(self.difficulty_per_point >= 0.0) {
            return Err(invalid("difficulty_per_point", "must not be negative"));
        }
        if self.pursuer_score_step == 0 {
            return Err(invalid("pursuer_score_step", "must be at least 1"));
        }
        if self.power_ups.is_empty() {
            return Err(invalid("power_ups", "table is empty"));
        }
        for spec in &self.power_ups {
            if !(spec.weight > 0.0) || !spec.weight.is_finite() {
                return Err(invalid("power_ups", format!("weight {} is not positive", spec.weight)));
            }
            if !(spec.lifetime_ms > 0.0) {
                return Err(invalid("power_ups", "lifetime must be positive"));
            }
            if spec.kind == PowerUpKind::Multiplier && spec.value == 0 {
                return Err(invalid("power_ups", "multiplier value must be at least 1"));
            }
        }
        Ok(())
    }
}
