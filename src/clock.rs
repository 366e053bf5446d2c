//! Frame clock.
//!
//! Produces the `(elapsed, real_elapsed)` pair the runtime is driven with:
//! `real_elapsed` is the measured wall-clock delta for the frame, `elapsed`
//! the same delta with the current `time_scale` applied. Modules and machines
//! accumulate logical time from `elapsed` while anything wall-clock-bound
//! (timeouts, profiling) reads `real_elapsed`.

/// Simulation clock for the host frame loop.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    /// Scaled seconds accumulated since the clock started.
    pub elapsed: f32,
    /// Scaled delta of the last frame.
    pub delta: f32,
    /// Unscaled delta of the last frame.
    pub real_delta: f32,
    /// Multiplier applied to real deltas. 0.0 freezes logical time.
    pub time_scale: f32,
    /// Frames ticked so far.
    pub frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        FrameClock {
            elapsed: 0.0,
            delta: 0.0,
            real_delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl FrameClock {
    /// Builder-style override of the time scale.
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Advance the clock by one frame of `real_dt` unscaled seconds.
    ///
    /// Returns the `(elapsed, real_elapsed)` pair to forward into
    /// [`Framework::update`](crate::framework::Framework::update).
    pub fn tick(&mut self, real_dt: f32) -> (f32, f32) {
        let scaled = real_dt * self.time_scale;
        self.elapsed += scaled;
        self.delta = scaled;
        self.real_delta = real_dt;
        self.frame_count += 1;
        (scaled, real_dt)
    }
}
