//! Display-frame scheduling
//!
//! The simulation ticks once per display frame. A `FrameSource` hands out a
//! request handle for the next frame and can cancel it; `FrameLoop` owns at
//! most one pending request and cancels it on every exit path (explicit stop,
//! game over, or drop), so no orphaned callback can tick a torn-down session.

/// Handle for one requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Something that can deliver a callback on the next display frame
pub trait FrameSource {
    /// `None` when the host could not schedule a callback
    fn request_frame(&mut self) -> Option<FrameRequest>;
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Owns the pending frame request of a running session
#[derive(Debug)]
pub struct FrameLoop<S: FrameSource> {
    source: S,
    pending: Option<FrameRequest>,
}

impl<S: FrameSource> FrameLoop<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            pending: None,
        }
    }

    /// Request the next frame unless one is already pending
    pub fn schedule(&mut self) {
        if self.pending.is_none() {
            self.pending = self.source.request_frame();
            if self.pending.is_none() {
                log::warn!("Frame request refused, loop stopped");
            }
        }
    }

    /// Cancel the pending frame, if any
    pub fn stop(&mut self) {
        if let Some(request) = self.pending.take() {
            log::debug!("Cancelling frame request {:?}", request);
            self.source.cancel_frame(request);
        }
    }

    /// Mark the pending frame as delivered.
    ///
    /// Returns false when nothing was pending, i.e. the callback belongs to a
    /// loop that has already been stopped and must not tick.
    pub fn complete(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: FrameSource> Drop for FrameLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Frame source driven by hand (tests, deterministic replays)
#[derive(Debug, Default)]
pub struct ManualFrames {
    pending: Option<FrameRequest>,
    next_id: u64,
    cancelled: usize,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// The request the host would fire next
    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Number of requests cancelled so far
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameSource for ManualFrames {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        Some(request)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

/// Native frame source pacing frames with `std::thread::sleep`
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct PacedFrames {
    interval: std::time::Duration,
    origin: std::time::Instant,
    next_due: std::time::Instant,
    pending: Option<FrameRequest>,
    next_id: u64,
}

#[cfg(not(target_arch = "wasm32"))]
impl PacedFrames {
    pub fn new(frames_per_second: u32) -> Self {
        let fps = frames_per_second.max(1);
        let now = std::time::Instant::now();
        Self {
            interval: std::time::Duration::from_secs_f64(1.0 / f64::from(fps)),
            origin: now,
            next_due: now,
            pending: None,
            next_id: 1,
        }
    }

    /// Block until the pending frame is due, deliver it and return its
    /// timestamp (milliseconds since the source was created). `None` when no
    /// frame is pending, which means the loop has been stopped.
    pub fn wait_next(&mut self) -> Option<f64> {
        self.pending.take()?;
        let now = std::time::Instant::now();
        if self.next_due > now {
            std::thread::sleep(self.next_due - now);
        }
        let fired = std::time::Instant::now();
        self.next_due = fired + self.interval;
        Some(fired.duration_since(self.origin).as_secs_f64() * 1000.0)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl FrameSource for PacedFrames {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        let request = FrameRequest(self.next_id);
        self.next_id += 1;
        self.pending = Some(request);
        Some(request)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}
