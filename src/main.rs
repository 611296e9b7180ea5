//! Cursor Chase entry point
//!
//! The browser build is driven by `platform::web::WebGame`. Natively the game
//! runs headless: the autopilot steers the pointer, the HUD is logged once a
//! second, and the game-over screen is printed at the end.
//!
//! Usage: `cursor-chase [NAME] [MAX_SECONDS]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use glam::Vec2;

    use cursor_chase::audio::AudioManager;
    use cursor_chase::autopilot::Autopilot;
    use cursor_chase::game_over::GameOverScreen;
    use cursor_chase::highscores::StoredScoreBackend;
    use cursor_chase::hud;
    use cursor_chase::platform::{Clock, FileStorage, PacedFrames, SystemClock};
    use cursor_chase::session::SessionConfig;
    use cursor_chase::sim::Viewport;
    use cursor_chase::{Session, Settings, Tuning};

    const DEFAULT_MAX_SECONDS: f64 = 60.0;

    fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cursor-chase")
    }

    pub fn run() -> i32 {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let max_seconds = args
            .get(1)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|s| *s > 0.0)
            .unwrap_or(DEFAULT_MAX_SECONDS);

        let dir = data_dir();
        let profile = FileStorage::open_or_empty(dir.join("profile.json"));
        log::info!("Profile at {}", profile.path().display());
        let mut scores = StoredScoreBackend::new(FileStorage::open_or_empty(dir.join("scores.json")));
        let settings = Settings::load(&profile);
        let tuning = Tuning::load(&profile);

        let clock = SystemClock;
        let seed = clock.now_ms() as u64;
        log::info!("Cursor Chase (native) starting with seed: {}", seed);

        let config = SessionConfig {
            tuning,
            viewport: Viewport::default(),
            seed,
        };
        let mut session = Session::new(
            config,
            AudioManager::new(&settings),
            profile,
            PacedFrames::new(settings.frame_rate),
        );

        let name = args
            .first()
            .cloned()
            .or_else(|| session.saved_player_name())
            .unwrap_or_else(|| "guest".to_string());
        if let Err(e) = session.start(&name, clock.now_ms()) {
            eprintln!("Cannot start: {}", e);
            return 2;
        }

        // Somewhere away from the first pursuer
        session.pointer_moved(Vec2::new(160.0, 120.0));

        let autopilot = Autopilot::default();
        let started = clock.now_ms();
        let mut last_hud = started;
        let mut last_frame: Option<f64> = None;

        while let Some(frame_time) = session.frame_source_mut().wait_next() {
            let now = clock.now_ms();
            let dt = last_frame.map_or(0.0, |last| frame_time - last);
            last_frame = Some(frame_time);

            let pointer = autopilot.steer(&session.snapshot(now), dt as f32);
            session.pointer_moved(pointer);
            session.on_frame(frame_time, now);

            if now - last_hud >= 1000.0 {
                log::info!("{}", hud::status_line(&session.snapshot(now)));
                last_hud = now;
            }
            if session.state().is_playing() && now - started >= max_seconds * 1000.0 {
                log::info!("Time limit of {}s reached", max_seconds);
                session.teardown();
            }
        }

        let state = session.state();
        let (player, score) = (state.player_name.clone(), state.score);
        if state.is_game_over() {
            let screen = GameOverScreen::open(
                &mut scores,
                session.store_mut(),
                &player,
                score,
                clock.now_ms(),
            );
            for line in screen.lines() {
                println!("{}", line);
            }
        } else {
            println!("{} survived with score {}", player, score);
        }
        0
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    std::process::exit(native::run());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is WebGame, this is just to satisfy the compiler
}
