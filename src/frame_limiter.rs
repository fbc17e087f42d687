//! Frame pacing
//!
//! The cloud path caps its frame rate against `fps_max`. The flat background
//! path ignores `fps_max` and idles for [`IDLE_SLEEP_MS`] per frame instead.

use std::thread;
use std::time::{Duration, Instant};

/// Fixed idle pause for frames drawn without clouds
pub const IDLE_SLEEP_MS: u32 = 25;

/// Millisecond timer the menu paces itself against
pub trait Clock {
    /// Milliseconds since an arbitrary start. May wrap around.
    fn now_ms(&self) -> u32;

    /// Blocks the calling thread
    fn sleep_ms(&self, ms: u32);
}

pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        // Truncation gives the wrapping u32 counter callers expect
        self.start.elapsed().as_millis() as u32
    }

    fn sleep_ms(&self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FrameRateLimiter {
    fps_max: f32,
}

impl FrameRateLimiter {
    pub fn new(fps_max: f32) -> Self {
        FrameRateLimiter { fps_max }
    }

    pub fn fps_max(&self) -> f32 {
        self.fps_max
    }

    /// Shortest frame in whole milliseconds, or `None` when uncapped
    pub fn min_frame_ms(&self) -> Option<u32> {
        if self.fps_max > 0.0 && self.fps_max.is_finite() {
            Some((1000.0 / self.fps_max) as u32)
        } else {
            None
        }
    }

    /// How long to sleep given the frame start `last_ms` and the time `now_ms`
    ///
    /// A clock that went backwards counts as zero elapsed time.
    pub fn sleep_for(&self, last_ms: u32, now_ms: u32) -> u32 {
        let Some(min_frame) = self.min_frame_ms() else {
            return 0;
        };
        let elapsed = now_ms.saturating_sub(last_ms);
        if elapsed < min_frame {
            min_frame - elapsed
        } else {
            0
        }
    }

    /// Sleeps on `clock` until the frame that started at `last_ms` is long enough.
    /// Returns the time slept.
    pub fn pace(&self, clock: &dyn Clock, last_ms: u32) -> u32 {
        let sleep = self.sleep_for(last_ms, clock.now_ms());
        if sleep > 0 {
            clock.sleep_ms(sleep);
        }
        sleep
    }
}
