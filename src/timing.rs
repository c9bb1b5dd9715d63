//! Frame timing.
//!
//! [`FrameTimer`] turns clock samples into per-frame delta times and a frame rate that is
//! recomputed once per interval.

use std::time::Instant;

/// A monotonic time source, in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock time since the clock was created.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Seconds between two frame rate recomputations.
pub const FPS_CALC_INTERVAL: f64 = 1.0;

/// Delta time and smoothed frame rate bookkeeping.
#[derive(Debug)]
pub struct FrameTimer<C: Clock> {
    clock: C,
    previous_time: f64,
    start_time: f64,
    iterations: u32,
    fps: f32,
}

impl<C: Clock> FrameTimer<C> {
    /// Starts timing from the clock's current reading.
    pub fn new(clock: C) -> Self {
        let now = clock.now();
        Self {
            clock,
            previous_time: now,
            start_time: now,
            iterations: 0,
            fps: 1.0,
        }
    }

    /// Samples the clock and returns the seconds since the previous sample.
    ///
    /// Also counts the frame, and once more than [`FPS_CALC_INTERVAL`] has passed since the
    /// last recomputation, replaces the frame rate with `frames / elapsed` and starts a new
    /// interval.
    pub fn update_dt(&mut self) -> f32 {
        let now = self.clock.now();
        let dt = now - self.previous_time;
        self.previous_time = now;

        let elapsed = now - self.start_time;
        self.iterations += 1;
        if elapsed > FPS_CALC_INTERVAL {
            self.fps = (self.iterations as f64 / elapsed) as f32;
            self.start_time = now;
            self.iterations = 0;
            log::debug!("{:.1} fps", self.fps);
        }

        dt as f32
    }

    /// The most recently computed frame rate. Starts at 1 before a full interval has passed.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Frames counted in the current interval.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}
