//! Game session lifecycle
//!
//! Owns the `GameState` and wires the simulation to its collaborators: pointer
//! input, the per-frame callback, audio cues and the name store.
//!
//! Idle -> Playing (start) -> GameOver (capture) -> Playing (restart)
//!
//! The host calls `on_frame` from its display-frame callback. A frame is only
//! ticked if this session requested it; every path that ends or pauses the
//! run cancels the pending request.

use glam::Vec2;
use serde::Serialize;

use crate::audio::{AudioSink, Cue};
use crate::consts::MAX_NAME_LEN;
use crate::error::NameError;
use crate::platform::{FrameLoop, FrameSource, InputTracker, KeyValueStore, NameStore};
use crate::sim::{
    GameEvent, GameOverReason, GamePhase, GameState, PowerUpKind, Pursuer, TickInput, TickResult,
    Viewport, tick,
};
use crate::tuning::Tuning;

/// Trim and check a player name from the start screen
pub fn validate_player_name(raw: &str) -> Result<String, NameError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(NameError::TooLong { max: MAX_NAME_LEN });
    }
    Ok(name.to_string())
}

/// Construction parameters
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub tuning: Tuning,
    pub viewport: Viewport,
    pub seed: u64,
}

/// A power-up as the render step sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerUpView {
    pub id: u32,
    pub pos: Vec2,
    pub kind: PowerUpKind,
    pub value: u32,
    pub color: String,
    pub remaining_ms: f64,
}

/// Immutable copy of everything a frame renders
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phase: GamePhase,
    pub player_name: String,
    pub score: u64,
    pub score_multiplier: u32,
    pub difficulty: f32,
    pub pointer: Vec2,
    pub pursuers: Vec<Pursuer>,
    pub power_ups: Vec<PowerUpView>,
    pub viewport: Viewport,
    pub game_over_reason: Option<GameOverReason>,
}

/// One player's game, from start screen to game over and back
pub struct Session<A: AudioSink, S: KeyValueStore, F: FrameSource> {
    state: GameState,
    tuning: Tuning,
    input: InputTracker,
    frames: FrameLoop<F>,
    audio: A,
    store: S,
    /// Wall-clock time the run was suspended at
    suspended_at: Option<f64>,
    /// Set by `teardown`; nothing ticks or reschedules until the next `start`
    torn_down: bool,
}

impl<A: AudioSink, S: KeyValueStore, F: FrameSource> Session<A, S, F> {
    pub fn new(config: SessionConfig, audio: A, store: S, frames: F) -> Self {
        log::info!(
            "Session created (seed {}, {}x{})",
            config.seed,
            config.viewport.width,
            config.viewport.height
        );
        let mut state = GameState::new(config.seed, config.viewport);
        state.difficulty = config.tuning.base_difficulty;
        Self {
            state,
            tuning: config.tuning,
            input: InputTracker::new(),
            frames: FrameLoop::new(frames),
            audio,
            store,
            suspended_at: None,
            torn_down: false,
        }
    }

    /// Begin a run for `raw_name`. Valid from any phase; a run in progress is
    /// replaced.
    pub fn start(&mut self, raw_name: &str, now_ms: f64) -> Result<(), NameError> {
        let name = validate_player_name(raw_name)?;
        self.store.persist_player_name(&name);

        self.frames.stop();
        self.suspended_at = None;
        self.torn_down = false;
        self.state.begin(&name, now_ms, &self.tuning);
        self.input.set_accepting(true);

        self.audio.stop(Cue::Background);
        self.audio.play(Cue::Background);
        self.frames.schedule();

        log::info!("Game started for {}", name);
        Ok(())
    }

    /// Start again with the current (or last saved) player name
    pub fn restart(&mut self, now_ms: f64) -> Result<(), NameError> {
        let name = if self.state.player_name.is_empty() {
            self.saved_player_name().unwrap_or_default()
        } else {
            self.state.player_name.clone()
        };
        self.start(&name, now_ms)
    }

    /// Display-frame callback
    pub fn on_frame(&mut self, frame_time_ms: f64, now_ms: f64) -> TickResult {
        if !self.frames.complete() || self.torn_down {
            // Stale callback of a stopped loop
            return TickResult::default();
        }

        let input = TickInput {
            pointer: self.input.latest(),
            frame_time_ms,
            now_ms,
        };
        let result = tick(&mut self.state, &input, &self.tuning);

        for event in &result.events {
            match event {
                GameEvent::PursuerAdded { .. } => self.audio.play(Cue::NewPursuer),
                GameEvent::PowerUpCollected { kind, .. } => self.audio.play(match kind {
                    PowerUpKind::Score => Cue::ScoreBonus,
                    PowerUpKind::Multiplier => Cue::MultiplierBonus,
                }),
                _ => {}
            }
        }

        if result.keep_running(&self.state) {
            self.frames.schedule();
        } else {
            self.finish_run();
        }
        result
    }

    fn finish_run(&mut self) {
        self.frames.stop();
        self.input.set_accepting(false);
        self.audio.stop(Cue::Background);
        if self.state.is_game_over() {
            self.audio.play(Cue::GameOver);
            log::info!(
                "Game over for {} with score {}",
                self.state.player_name,
                self.state.score
            );
        }
    }

    /// Pause a running game (window hidden, focus lost)
    pub fn suspend(&mut self, now_ms: f64) {
        if self.torn_down || !self.state.is_playing() || self.suspended_at.is_some() {
            return;
        }
        self.frames.stop();
        self.audio.stop(Cue::Background);
        self.suspended_at = Some(now_ms);
        log::info!("Game suspended");
    }

    /// Continue a suspended game; the time spent suspended does not count
    /// towards score, spawn or expiry cadences
    pub fn resume(&mut self, now_ms: f64) {
        if self.torn_down {
            return;
        }
        let Some(since) = self.suspended_at.take() else {
            return;
        };
        let paused = (now_ms - since).max(0.0);
        self.state.last_score_tick_ms += paused;
        self.state.last_spawn_ms += paused;
        for power_up in &mut self.state.power_ups {
            power_up.created_at_ms += paused;
        }
        // Frame timestamps jump too; the first frame back must not move anything
        self.state.last_frame_ms = None;

        self.audio.play(Cue::Background);
        self.frames.schedule();
        log::info!("Game resumed after {:.0}ms", paused);
    }

    /// Release the frame callback and silence everything. Final until the
    /// next `start`: a later `resume` or frame callback does nothing.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.suspended_at = None;
        self.frames.stop();
        self.input.set_accepting(false);
        self.audio.stop_all();
        log::info!("Session torn down");
    }

    /// Record the latest pointer position
    pub fn pointer_moved(&self, pos: Vec2) {
        self.input.record(pos);
    }

    /// Handle for UI code that records pointer moves directly
    pub fn input(&self) -> InputTracker {
        self.input.clone()
    }

    pub fn resize(&mut self, viewport: Viewport) {
        log::debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
        self.state.viewport = viewport;
    }

    /// Last used player name, to prefill the start screen
    pub fn saved_player_name(&self) -> Option<String> {
        self.store.load_player_name()
    }

    pub fn snapshot(&self, now_ms: f64) -> Snapshot {
        let s = &self.state;
        // Suspended runs show frozen timers
        let clock = self.suspended_at.unwrap_or(now_ms);
        Snapshot {
            phase: s.phase,
            player_name: s.player_name.clone(),
            score: s.score,
            score_multiplier: s.score_multiplier,
            difficulty: s.difficulty,
            pointer: self.input.latest(),
            pursuers: s.pursuers.clone(),
            power_ups: s
                .power_ups
                .iter()
                .map(|p| PowerUpView {
                    id: p.id,
                    pos: p.pos,
                    kind: p.kind,
                    value: p.value,
                    color: p.color.clone(),
                    remaining_ms: p.remaining_ms(clock),
                })
                .collect(),
            viewport: s.viewport,
            game_over_reason: s.game_over_reason.clone(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended_at.is_some()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Whether a frame callback is outstanding
    pub fn is_frame_scheduled(&self) -> bool {
        self.frames.is_scheduled()
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn frame_source(&self) -> &F {
        self.frames.source()
    }

    pub fn frame_source_mut(&mut self) -> &mut F {
        self.frames.source_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Clock, ManualClock, ManualFrames, MemoryStorage};
    use crate::sim::PowerUp;

    #[derive(Debug, Default)]
    struct RecordingAudio {
        played: Vec<Cue>,
        stopped: Vec<Cue>,
    }

    impl AudioSink for RecordingAudio {
        fn play(&mut self, cue: Cue) {
            self.played.push(cue);
        }

        fn stop(&mut self, cue: Cue) {
            self.stopped.push(cue);
        }
    }

    type TestSession = Session<RecordingAudio, MemoryStorage, ManualFrames>;

    fn session_with(tuning: Tuning) -> TestSession {
        let config = SessionConfig {
            tuning,
            viewport: Viewport::new(800.0, 600.0),
            seed: 7,
        };
        Session::new(
            config,
            RecordingAudio::default(),
            MemoryStorage::new(),
            ManualFrames::new(),
        )
    }

    fn session() -> TestSession {
        session_with(Tuning::default())
    }

    /// Far from the centred first pursuer
    const SAFE: Vec2 = Vec2::new(10.0, 10.0);

    #[test]
    fn test_name_validation() {
        assert_eq!(validate_player_name("  ana "), Ok("ana".to_string()));
        assert_eq!(validate_player_name("   "), Err(NameError::Empty));
        assert_eq!(
            validate_player_name(&"x".repeat(21)),
            Err(NameError::TooLong { max: 20 })
        );
        assert!(validate_player_name(&"é".repeat(20)).is_ok());
    }

    #[test]
    fn test_start_rejects_bad_name() {
        let mut s = session();
        assert_eq!(s.start("", 0.0), Err(NameError::Empty));
        assert_eq!(s.state().phase, GamePhase::Idle);
        assert!(!s.is_frame_scheduled());
        assert!(s.saved_player_name().is_none());
    }

    #[test]
    fn test_start_enters_playing() {
        let mut s = session();
        s.start(" ana ", 0.0).unwrap();

        assert!(s.state().is_playing());
        assert_eq!(s.state().player_name, "ana");
        assert_eq!(s.saved_player_name().as_deref(), Some("ana"));
        assert_eq!(s.state().pursuers.len(), 1);
        assert_eq!(s.state().pursuers[0].pos, Vec2::new(400.0, 300.0));
        assert!(s.is_frame_scheduled());
        assert!(s.frame_source().pending().is_some());
        assert_eq!(s.audio().played, vec![Cue::Background]);
    }

    #[test]
    fn test_pointer_ignored_until_playing() {
        let mut s = session();
        s.pointer_moved(Vec2::new(5.0, 5.0));
        assert_eq!(s.snapshot(0.0).pointer, Vec2::ZERO);

        s.start("ana", 0.0).unwrap();
        let ui = s.input();
        ui.record(Vec2::new(5.0, 5.0));
        assert_eq!(s.snapshot(0.0).pointer, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_unrequested_frame_does_not_tick() {
        let mut s = session();
        let result = s.on_frame(16.0, 1000.0);
        assert!(result.events.is_empty());
        assert_eq!(s.state().ticks, 0);
    }

    #[test]
    fn test_frames_reschedule_while_playing() {
        let mut s = session();
        s.start("ana", 0.0).unwrap();
        s.pointer_moved(SAFE);

        s.on_frame(0.0, 10.0);
        s.on_frame(0.0, 1_000.0);
        assert_eq!(s.state().ticks, 2);
        assert_eq!(s.state().score, 1);
        assert!(s.is_frame_scheduled());
    }

    #[test]
    fn test_capture_ends_run_and_releases_frame() {
        let mut s = session();
        s.start("ana", 0.0).unwrap();
        s.pointer_moved(Vec2::new(400.0, 300.0));

        let result = s.on_frame(0.0, 10.0);
        assert!(result.game_over);
        assert!(s.state().is_game_over());
        assert!(!s.is_frame_scheduled());
        assert!(!s.input().is_accepting());
        assert!(s.audio().stopped.contains(&Cue::Background));
        assert_eq!(s.audio().played.last(), Some(&Cue::GameOver));

        // Nothing ticks after game over
        let late = s.on_frame(16.0, 5_000.0);
        assert!(late.events.is_empty());
        assert_eq!(s.state().ticks, 1);
    }

    #[test]
    fn test_restart_fully_resets() {
        let mut s = session();
        s.start("ana", 0.0).unwrap();
        s.pointer_moved(SAFE);
        for i in 1..=3 {
            s.on_frame(0.0, i as f64 * 1_000.0);
        }
        s.pointer_moved(Vec2::new(400.0, 300.0));
        s.on_frame(0.0, 3_500.0);
        assert!(s.state().is_game_over());
        assert_eq!(s.state().score, 3);

        s.restart(4_000.0).unwrap();
        let state = s.state();
        assert_eq!(state.score, 0);
        assert_eq!(state.score_multiplier, 1);
        assert_eq!(state.pursuers.len(), 1);
        assert!(state.power_ups.is_empty());
        assert!(!state.is_game_over());
        assert_eq!(state.player_name, "ana");
        assert!(s.is_frame_scheduled());
    }

    #[test]
    fn test_restart_without_name_uses_saved_one() {
        let mut s = session();
        s.store_mut().persist_player_name("bo");
        s.restart(0.0).unwrap();
        assert_eq!(s.state().player_name, "bo");

        let mut fresh = session();
        assert_eq!(fresh.restart(0.0), Err(NameError::Empty));
    }

    #[test]
    fn test_new_pursuer_cue() {
        let tuning = Tuning {
            pursuer_score_step: 1,
            ..Tuning::default()
        };
        let mut s = session_with(tuning);
        s.start("ana", 0.0).unwrap();
        s.pointer_moved(SAFE);
        s.on_frame(0.0, 1_000.0);

        assert_eq!(s.state().pursuers.len(), 2);
        assert!(s.audio().played.contains(&Cue::NewPursuer));
    }

    #[test]
    fn test_pickup_cues_by_kind() {
        let mut s = session();
        s.start("ana", 0.0).unwrap();
        s.pointer_moved(SAFE);
        s.state.power_ups = vec![
            PowerUp {
                id: 90,
                pos: SAFE,
                kind: PowerUpKind::Multiplier,
                value: 3,
                color: "pink".into(),
                lifetime_ms: 5_000.0,
                created_at_ms: 0.0,
            },
            PowerUp {
                id: 91,
                pos: SAFE,
                kind: PowerUpKind::Score,
                value: 10,
                color: "green".into(),
                lifetime_ms: 4_000.0,
                created_at_ms: 0.0,
            },
        ];

        s.on_frame(0.0, 10.0);
        assert_eq!(s.state().score_multiplier, 3);
        assert_eq!(s.audio().played.last(), Some(&Cue::MultiplierBonus));

        s.on_frame(0.0, 20.0);
        assert_eq!(s.state().score, 10);
        assert_eq!(s.audio().played.last(), Some(&Cue::ScoreBonus));
    }

    #[test]
    fn test_suspend_and_resume() {
        let mut s = session();
        s.start("ana", 0.0).unwrap();
        s.pointer_moved(SAFE);
        s.on_frame(0.0, 500.0);

        s.suspend(600.0);
        assert!(s.is_suspended());
        assert!(!s.is_frame_scheduled());
        assert_eq!(s.frame_source().cancelled(), 1);
        assert!(s.on_frame(0.0, 10_000.0).events.is_empty());

        // Ten seconds away: the cadence resumes where it left off
        s.resume(10_600.0);
        assert!(s.is_frame_scheduled());
        s.on_frame(0.0, 10_700.0);
        assert_eq!(s.state().score, 0);
        s.on_frame(0.0, 11_000.0);
        assert_eq!(s.state().score, 1);
    }

    #[test]
    fn test_suspend_only_while_playing() {
        let mut s = session();
        s.suspend(0.0);
        assert!(!s.is_suspended());
        s.resume(10.0);
        assert!(!s.is_frame_scheduled());
    }

    #[test]
    fn test_teardown_cancels_pending_frame() {
        let mut s = session();
        s.start("ana", 0.0).unwrap();
        s.teardown();
        assert!(!s.is_frame_scheduled());
        assert_eq!(s.frame_source().pending(), None);
        assert!(s.audio().stopped.len() >= Cue::ALL.len());
        assert!(s.on_frame(16.0, 1_000.0).events.is_empty());
    }

    #[test]
    fn test_resume_after_teardown_stays_stopped() {
        let clock = ManualClock::new(0.0);
        let mut s = session();
        s.start("ana", clock.now_ms()).unwrap();
        s.pointer_moved(SAFE);
        clock.advance(500.0);
        s.on_frame(0.0, clock.now_ms());

        clock.advance(100.0);
        s.suspend(clock.now_ms());
        s.teardown();
        assert!(s.is_torn_down());
        assert!(!s.is_suspended());

        clock.advance(900.0);
        s.resume(clock.now_ms());
        assert!(!s.is_frame_scheduled());
        assert_eq!(s.frame_source().pending(), None);

        clock.advance(1_000.0);
        assert!(s.on_frame(16.0, clock.now_ms()).events.is_empty());
        assert_eq!(s.state().ticks, 1);
        assert_eq!(s.state().score, 0);
    }

    #[test]
    fn test_suspend_after_teardown_is_ignored() {
        let mut s = session();
        s.start("ana", 0.0).unwrap();
        s.teardown();

        s.suspend(100.0);
        s.resume(200.0);
        assert!(!s.is_suspended());
        assert!(!s.is_frame_scheduled());
        assert_eq!(s.audio().played, vec![Cue::Background]);

        // A fresh start revives the session
        s.start("ana", 300.0).unwrap();
        assert!(!s.is_torn_down());
        assert!(s.is_frame_scheduled());
    }

    #[test]
    fn test_non_finite_pointer_never_reaches_pursuers() {
        let mut s = session();
        s.start("ana", 0.0).unwrap();
        s.pointer_moved(SAFE);
        s.pointer_moved(Vec2::new(f32::NAN, 5.0));
        s.on_frame(0.0, 10.0);
        s.on_frame(16.0, 20.0);

        let snap = s.snapshot(20.0);
        assert_eq!(snap.pointer, SAFE);
        assert!(snap.pursuers.iter().all(|p| crate::is_finite_point(p.pos)));
        assert!(s.state().is_playing());
    }

    #[test]
    fn test_idle_snapshot_uses_tuned_base_speed() {
        let tuning = Tuning {
            base_difficulty: 0.06,
            ..Tuning::default()
        };
        let s = session_with(tuning);
        assert_eq!(s.snapshot(0.0).difficulty, 0.06);
    }

    #[test]
    fn test_snapshot_reports_remaining_time() {
        let mut s = session();
        s.start("ana", 0.0).unwrap();
        s.state.power_ups.push(PowerUp {
            id: 50,
            pos: Vec2::new(200.0, 200.0),
            kind: PowerUpKind::Score,
            value: 50,
            color: "blue".into(),
            lifetime_ms: 3_000.0,
            created_at_ms: 0.0,
        });

        let snap = s.snapshot(1_200.0);
        assert_eq!(snap.power_ups[0].remaining_ms, 1_800.0);
        assert_eq!(s.snapshot(9_000.0).power_ups[0].remaining_ms, 0.0);

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["playerName"], "ana");
        assert_eq!(json["powerUps"][0]["kind"], "score");
    }
}
