//! Simulation step timing.
//!
//! Converts wall-clock frame time into a whole number of fixed simulation
//! steps, so gameplay always advances in `fixed_dt` increments.

use std::time::{Duration, Instant};

/// Most steps a single frame may run before the backlog is dropped.
const MAX_STEPS_PER_FRAME: u32 = 10;

/// Fixed-timestep clock.
#[derive(Debug)]
pub struct StepClock {
    /// Length of one simulation step
    fixed_dt: f32,
    /// Frame time clamp
    max_dt: f32,
    /// Unconsumed wall time
    accumulator: f32,
    /// Start of the current frame
    last_frame: Instant,
}

impl StepClock {
    /// Creates a clock stepping at `fixed_dt` seconds.
    #[must_use]
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            fixed_dt: fixed_dt.max(0.001),
            max_dt: 0.25,
            accumulator: 0.0,
            last_frame: Instant::now(),
        }
    }

    /// Length of one simulation step.
    #[must_use]
    pub const fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Seconds elapsed since the previous call, clamped to `max_dt`.
    pub fn delta_time(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        dt.min(self.max_dt)
    }

    /// Adds `dt` of wall time and returns how many steps to run.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.max(0.0);
        let mut count = 0;
        while self.accumulator >= self.fixed_dt && count < MAX_STEPS_PER_FRAME {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // Still behind: drop the backlog rather than chase it
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }
        count
    }

    /// Sleeps until one step's worth of time has passed since the frame began.
    pub fn sleep_remainder(&self) {
        let budget = Duration::from_secs_f32(self.fixed_dt);
        let elapsed = self.last_frame.elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        }
    }

    /// Clears the accumulator and restarts the frame clock.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_frame = Instant::now();
    }
}
