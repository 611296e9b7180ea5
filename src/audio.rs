//! Audio cues
//!
//! The session fires named cues at fixed transition points (run start,
//! capture, new pursuer, power-up pickup). Playback is fire-and-forget: a
//! sink never reports failure back to the game.
//!
//! On the web the cues are procedurally generated with the Web Audio API - no
//! external files needed. Natively they are only logged.

use crate::settings::Settings;

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Looping background track while a run is in progress
    Background,
    /// Pointer captured
    GameOver,
    /// A pursuer joined the chase
    NewPursuer,
    /// Score power-up collected
    ScoreBonus,
    /// Multiplier power-up collected
    MultiplierBonus,
}

impl Cue {
    pub const ALL: [Cue; 5] = [
        Cue::Background,
        Cue::GameOver,
        Cue::NewPursuer,
        Cue::ScoreBonus,
        Cue::MultiplierBonus,
    ];

    /// Looping cues keep playing until stopped
    pub fn is_loop(self) -> bool {
        matches!(self, Cue::Background)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Cue::Background => "background",
            Cue::GameOver => "game-over",
            Cue::NewPursuer => "new-pursuer",
            Cue::ScoreBonus => "score-bonus",
            Cue::MultiplierBonus => "multiplier-bonus",
        }
    }
}

/// Where cues go
pub trait AudioSink {
    fn play(&mut self, cue: Cue);
    fn stop(&mut self, cue: Cue);

    fn stop_all(&mut self) {
        for cue in Cue::ALL {
            self.stop(cue);
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<AudioContext>,
    /// Nodes of the running background loop
    #[cfg(target_arch = "wasm32")]
    background: Vec<OscillatorNode>,
    #[cfg(not(target_arch = "wasm32"))]
    background: bool,
    sfx_volume: f32,
    music_volume: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl AudioManager {
    #[cfg(target_arch = "wasm32")]
    pub fn new(settings: &Settings) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            background: Vec::new(),
            sfx_volume: settings.effective_sfx_volume(),
            music_volume: settings.effective_music_volume(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(settings: &Settings) -> Self {
        Self {
            background: false,
            sfx_volume: settings.effective_sfx_volume(),
            music_volume: settings.effective_music_volume(),
        }
    }

    /// Pick up changed volume/mute preferences
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sfx_volume = settings.effective_sfx_volume();
        self.music_volume = settings.effective_music_volume();
        if self.music_volume <= 0.0 {
            self.stop(Cue::Background);
        }
    }

    fn volume_for(&self, cue: Cue) -> f32 {
        if cue.is_loop() {
            self.music_volume
        } else {
            self.sfx_volume
        }
    }

    /// Whether the background loop is running
    #[cfg(not(target_arch = "wasm32"))]
    pub fn background_playing(&self) -> bool {
        self.background
    }

    #[cfg(target_arch = "wasm32")]
    pub fn background_playing(&self) -> bool {
        !self.background.is_empty()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AudioSink for AudioManager {
    fn play(&mut self, cue: Cue) {
        let vol = self.volume_for(cue);
        if vol <= 0.0 {
            return;
        }
        if cue.is_loop() {
            if self.background {
                return;
            }
            self.background = true;
        }
        log::debug!("Audio cue {} (volume {:.2})", cue.as_str(), vol);
    }

    fn stop(&mut self, cue: Cue) {
        if cue.is_loop() && self.background {
            self.background = false;
            log::debug!("Audio cue {} stopped", cue.as_str());
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl AudioSink for AudioManager {
    fn play(&mut self, cue: Cue) {
        let vol = self.volume_for(cue);
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = self.ctx.clone() else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            Cue::Background => self.start_background(&ctx, vol),
            Cue::GameOver => self.play_game_over(&ctx, vol),
            Cue::NewPursuer => self.play_new_pursuer(&ctx, vol),
            Cue::ScoreBonus => self.play_score_bonus(&ctx, vol),
            Cue::MultiplierBonus => self.play_multiplier_bonus(&ctx, vol),
        }
    }

    fn stop(&mut self, cue: Cue) {
        // One-shot cues stop on their own
        if cue.is_loop() {
            for osc in self.background.drain(..) {
                osc.stop().ok();
            }
        }
    }
}

// === Sound generators ===
#[cfg(target_arch = "wasm32")]
impl AudioManager {
    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Background - low pulsing drone, runs until stopped
    fn start_background(&mut self, ctx: &AudioContext, vol: f32) {
        if !self.background.is_empty() {
            return;
        }
        let t = ctx.current_time();
        for (freq, osc_type, level) in [
            (55.0, OscillatorType::Sine, 0.35),
            (82.5, OscillatorType::Triangle, 0.15),
        ] {
            if let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) {
                gain.gain().set_value_at_time(0.001, t).ok();
                gain.gain()
                    .linear_ramp_to_value_at_time(vol * level, t + 1.0)
                    .ok();
                osc.start().ok();
                self.background.push(osc);
            }
        }
    }

    /// Game over - sad descending
    fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
            let delay = i as f64 * 0.2;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.4).ok();
            }
        }
    }

    /// New pursuer - rising warning siren
    fn play_new_pursuer(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.5)
            .ok();
        osc.frequency().set_value_at_time(220.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(660.0, t + 0.25)
            .ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(330.0, t + 0.5)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.55).ok();
    }

    /// Score bonus - happy ding
    fn play_score_bonus(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [600.0, 800.0, 1000.0].iter().enumerate() {
            let delay = i as f64 * 0.08;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.2).ok();
            }
        }
    }

    /// Multiplier bonus - celebratory
    fn play_multiplier_bonus(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [500.0, 600.0, 700.0, 800.0, 1000.0].iter().enumerate() {
            let delay = i as f64 * 0.08;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }
    }
}
