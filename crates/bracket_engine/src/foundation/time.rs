//! Time management utilities
//!
//! The engine never reads the wall clock directly: every tick asks a
//! [`TimeSource`] for the current monotonic time. Hosts use [`SystemClock`];
//! tests drive a [`ManualClock`] by hand.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source, measured from an arbitrary origin
pub trait TimeSource {
    /// Current time since the source's origin
    fn now(&self) -> Duration;
}

/// Wall-clock time source backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced time source
///
/// Clones share the same underlying time, so a test can keep one handle
/// while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        let micros = u64::try_from(by.as_micros()).unwrap_or(u64::MAX);
        self.micros.fetch_add(micros, Ordering::SeqCst);
    }

    /// Move time forward by a number of milliseconds
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::SeqCst))
    }
}

/// Frame timer producing the variable-loop delta
pub struct Timer {
    last_frame: Option<Duration>,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: None,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Restart measurement from `now` without producing a delta
    pub fn reset(&mut self, now: Duration) {
        self.last_frame = Some(now);
        self.delta_time = 0.0;
    }

    /// Record a frame at `now` and return the seconds since the previous one
    pub fn tick(&mut self, now: Duration) -> f32 {
        let elapsed = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_sub(last));
        self.delta_time = elapsed.as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = Some(now);
        self.frame_count += 1;
        self.delta_time
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total measured time
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Frames-per-second counter averaged over one-second windows
#[derive(Debug, Default)]
pub struct FpsCounter {
    window_start: Option<Duration>,
    frames_in_window: u32,
    fps: f32,
}

impl FpsCounter {
    /// Create a counter with no samples
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame at `now`; returns the new value when a window closes
    pub fn frame(&mut self, now: Duration) -> Option<f32> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            return None;
        };
        self.frames_in_window += 1;

        let elapsed = now.saturating_sub(start);
        if elapsed >= Duration::from_secs(1) {
            #[allow(clippy::cast_precision_loss)]
            let frames = self.frames_in_window as f32;
            self.fps = frames / elapsed.as_secs_f32();
            self.frames_in_window = 0;
            self.window_start = Some(now);
            Some(self.fps)
        } else {
            None
        }
    }

    /// Most recent measurement
    pub fn fps(&self) -> f32 {
        self.fps
    }
}
