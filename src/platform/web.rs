//! Browser bindings
//!
//! LocalStorage persistence, `requestAnimationFrame` scheduling and the
//! `WebGame` handle the page script drives.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::frame::{FrameRequest, FrameSource};
use super::storage::KeyValueStore;
use super::time::{Clock, SystemClock};
use crate::audio::AudioManager;
use crate::error::StorageError;
use crate::game_over::GameOverScreen;
use crate::highscores::StoredScoreBackend;
use crate::session::{Session, SessionConfig};
use crate::settings::Settings;
use crate::sim::Viewport;
use crate::tuning::Tuning;

fn js_error(e: JsValue) -> StorageError {
    StorageError::Unavailable(format!("{:?}", e))
}

/// `window.localStorage`
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, StorageError> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(js_error)
    }
}

type FrameCallback = Closure<dyn FnMut(f64)>;

/// `requestAnimationFrame` / `cancelAnimationFrame`
#[derive(Default)]
pub struct AnimationFrames {
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl AnimationFrames {
    pub fn set_callback(&self, callback: FrameCallback) {
        *self.callback.borrow_mut() = Some(callback);
    }
}

impl FrameSource for AnimationFrames {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        let slot = self.callback.borrow();
        let Some(cb) = slot.as_ref() else {
            log::warn!("No frame callback installed");
            return None;
        };
        let window = web_sys::window()?;
        match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => Some(FrameRequest(id as u64)),
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(request.0 as i32);
        }
    }
}

type WebSession = Session<AudioManager, LocalStorage, AnimationFrames>;

/// Game handle exported to the page
#[wasm_bindgen]
pub struct WebGame {
    session: Rc<RefCell<WebSession>>,
    scores: StoredScoreBackend<LocalStorage>,
    settings: Settings,
    game_over: Option<GameOverScreen>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Result<WebGame, JsValue> {
        console_error_panic_hook::set_once();
        // Already initialised when the page creates a second game
        let _ = console_log::init_with_level(log::Level::Info);

        let store = LocalStorage::open().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let settings = Settings::load(&store);
        let tuning = Tuning::load(&store);
        let seed = SystemClock.now_ms() as u64;
        log::info!("Cursor Chase initialised with seed: {}", seed);

        let config = SessionConfig {
            tuning,
            viewport: Viewport::new(width, height),
            seed,
        };
        let session = Rc::new(RefCell::new(Session::new(
            config,
            AudioManager::new(&settings),
            store.clone(),
            AnimationFrames::default(),
        )));

        let weak: Weak<RefCell<WebSession>> = Rc::downgrade(&session);
        let callback = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
            if let Some(session) = weak.upgrade() {
                session.borrow_mut().on_frame(time, SystemClock.now_ms());
            }
        });
        session.borrow().frame_source().set_callback(callback);

        Ok(WebGame {
            session,
            scores: StoredScoreBackend::new(store),
            settings,
            game_over: None,
        })
    }

    pub fn start(&mut self, name: &str) -> Result<(), JsValue> {
        self.game_over = None;
        self.session
            .borrow_mut()
            .start(name, SystemClock.now_ms())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn restart(&mut self) -> Result<(), JsValue> {
        self.game_over = None;
        self.session
            .borrow_mut()
            .restart(SystemClock.now_ms())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn pointer_moved(&self, x: f32, y: f32) {
        self.session.borrow().pointer_moved(Vec2::new(x, y));
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.session
            .borrow_mut()
            .resize(Viewport::new(width, height));
    }

    /// Page hidden or window blurred
    pub fn suspend(&self) {
        if self.settings.pause_on_blur {
            self.session.borrow_mut().suspend(SystemClock.now_ms());
        }
    }

    pub fn resume(&self) {
        self.session.borrow_mut().resume(SystemClock.now_ms());
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        self.store_settings();
    }

    /// Volumes in 0.0 - 1.0; out-of-range values are clamped
    pub fn set_volumes(&mut self, master: f32, sfx: f32, music: f32) {
        self.settings.master_volume = master.clamp(0.0, 1.0);
        self.settings.sfx_volume = sfx.clamp(0.0, 1.0);
        self.settings.music_volume = music.clamp(0.0, 1.0);
        self.store_settings();
    }

    pub fn set_pause_on_blur(&mut self, enabled: bool) {
        self.settings.pause_on_blur = enabled;
        self.store_settings();
    }

    pub fn saved_player_name(&self) -> Option<String> {
        self.session.borrow().saved_player_name()
    }

    /// Current frame as JSON for the page renderer
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        let snap = self.session.borrow().snapshot(SystemClock.now_ms());
        serde_json::to_string(&snap).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn hud_text(&self) -> String {
        let snap = self.session.borrow().snapshot(SystemClock.now_ms());
        crate::hud::render_lines(&snap).join("\n")
    }

    /// Game-over report; submits the score the first time it is asked for
    pub fn game_over_text(&mut self) -> Option<String> {
        let mut session = self.session.borrow_mut();
        if !session.state().is_game_over() {
            return None;
        }
        if self.game_over.is_none() {
            let name = session.state().player_name.clone();
            let score = session.state().score;
            self.game_over = Some(GameOverScreen::open(
                &mut self.scores,
                session.store_mut(),
                &name,
                score,
                SystemClock.now_ms(),
            ));
        }
        self.game_over.as_ref().map(|screen| screen.lines().join("\n"))
    }

    pub fn teardown(&self) {
        self.session.borrow_mut().teardown();
    }
}

impl WebGame {
    fn store_settings(&mut self) {
        let mut session = self.session.borrow_mut();
        session.audio_mut().apply_settings(&self.settings);
        self.settings.save(session.store_mut());
    }
}
