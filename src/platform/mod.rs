//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (wall clock)
//! - Display frames (scheduling and cancelling the per-frame callback)
//! - Input (latest pointer position)
//! - Storage (LocalStorage on web, a JSON file on native)

pub mod frame;
pub mod input;
pub mod storage;
pub mod time;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use frame::{FrameLoop, FrameRequest, FrameSource, ManualFrames};
#[cfg(not(target_arch = "wasm32"))]
pub use frame::PacedFrames;
pub use input::InputTracker;
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
pub use storage::{KeyValueStore, MemoryStorage, NameStore};
pub use time::{Clock, ManualClock, SystemClock};
