//! Frame Timing
//!
//! [`FrameTimer`] drives per-frame updates with either a variable timestep
//! (one update per tick, sized to real elapsed time) or a fixed timestep
//! (zero or more fixed-size updates per tick, with an accumulator). The
//! pure advance logic is separated from clock reads so it can be tested
//! deterministically.

use std::time::{Duration, Instant};

/// Per-frame timing information passed to update callbacks.
#[derive(Debug, Clone, Copy)]
pub struct FrameState {
    /// Total accounted time since the timer started, in seconds.
    pub time: f32,
    /// Delta time covered by this update, in seconds.
    pub dt: f32,
    /// Total number of updates issued since startup.
    pub frame_count: u64,
}

/// Variable- or fixed-timestep frame timer.
///
/// After a large discontinuity (debugger pause, suspend) the elapsed time is
/// clamped so a fixed-timestep application does not replay a flood of
/// catch-up updates.
#[derive(Debug)]
pub struct FrameTimer {
    last: Option<Instant>,
    fixed_step: Option<Duration>,
    accumulator: Duration,
    total: Duration,
    delta: Duration,
    frame_count: u64,

    fps_window: Duration,
    fps_frames: u32,
    fps: f32,
}

/// Elapsed time beyond this is treated as a discontinuity and clamped.
const MAX_ELAPSED: Duration = Duration::from_secs(1);

impl FrameTimer {
    /// A variable-timestep timer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: None,
            fixed_step: None,
            accumulator: Duration::ZERO,
            total: Duration::ZERO,
            delta: Duration::ZERO,
            frame_count: 0,
            fps_window: Duration::ZERO,
            fps_frames: 0,
            fps: 0.0,
        }
    }

    /// A fixed-timestep timer issuing updates of exactly `step`.
    #[must_use]
    pub fn with_fixed_step(step: Duration) -> Self {
        Self {
            fixed_step: Some(step),
            ..Self::new()
        }
    }

    /// Advances the timer by real elapsed time, invoking `update` zero or
    /// more times depending on the timestep mode.
    pub fn tick<F: FnMut(FrameState)>(&mut self, update: F) {
        let now = Instant::now();
        let elapsed = match self.last {
            Some(last) => now.duration_since(last),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        self.advance(elapsed, update);
    }

    /// Discards accumulated elapsed time.
    ///
    /// Call after an intentional pause (e.g. resuming from suspend) so the
    /// gap is not fed into the next tick.
    pub fn reset_elapsed_time(&mut self) {
        self.last = None;
        self.accumulator = Duration::ZERO;
        self.fps_window = Duration::ZERO;
        self.fps_frames = 0;
    }

    /// Total accounted time in seconds.
    #[inline]
    #[must_use]
    pub fn total_seconds(&self) -> f32 {
        self.total.as_secs_f32()
    }

    /// Duration of the most recent update in seconds.
    #[inline]
    #[must_use]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Number of updates issued since startup.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Updates per second over the last completed one-second window.
    #[inline]
    #[must_use]
    pub fn frames_per_second(&self) -> f32 {
        self.fps
    }

    fn advance<F: FnMut(FrameState)>(&mut self, elapsed: Duration, mut update: F) {
        let elapsed = elapsed.min(MAX_ELAPSED);

        self.fps_window += elapsed;
        if self.fps_window >= Duration::from_secs(1) {
            self.fps = self.fps_frames as f32 / self.fps_window.as_secs_f32();
            self.fps_window = Duration::ZERO;
            self.fps_frames = 0;
        }

        match self.fixed_step {
            None => {
                self.delta = elapsed;
                self.total += elapsed;
                self.frame_count += 1;
                self.fps_frames += 1;
                update(self.state());
            }
            Some(step) => {
                self.accumulator += elapsed;
                while self.accumulator >= step {
                    self.accumulator -= step;
                    self.delta = step;
                    self.total += step;
                    self.frame_count += 1;
                    self.fps_frames += 1;
                    update(self.state());
                }
            }
        }
    }

    fn state(&self) -> FrameState {
        FrameState {
            time: self.total_seconds(),
            dt: self.delta_seconds(),
            frame_count: self.frame_count,
        }
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_step_issues_one_update_per_tick() {
        let mut timer = FrameTimer::new();
        let mut updates = Vec::new();
        timer.advance(Duration::from_millis(16), |s| updates.push(s.dt));
        timer.advance(Duration::from_millis(32), |s| updates.push(s.dt));

        assert_eq!(updates.len(), 2);
        assert!((updates[0] - 0.016).abs() < 1e-6);
        assert!((updates[1] - 0.032).abs() < 1e-6);
        assert_eq!(timer.frame_count(), 2);
        assert!((timer.total_seconds() - 0.048).abs() < 1e-6);
    }

    #[test]
    fn fixed_step_accumulates_partial_ticks() {
        let step = Duration::from_millis(10);
        let mut timer = FrameTimer::with_fixed_step(step);
        let mut updates = 0;

        timer.advance(Duration::from_millis(7), |_| updates += 1);
        assert_eq!(updates, 0);

        timer.advance(Duration::from_millis(7), |_| updates += 1);
        assert_eq!(updates, 1);

        timer.advance(Duration::from_millis(26), |_| updates += 1);
        assert_eq!(updates, 3);

        assert_eq!(timer.frame_count(), 4);
        assert!((timer.delta_seconds() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn fixed_step_updates_carry_monotonic_time() {
        let step = Duration::from_millis(10);
        let mut timer = FrameTimer::with_fixed_step(step);
        let mut times = Vec::new();
        timer.advance(Duration::from_millis(35), |s| times.push(s.time));

        assert_eq!(times.len(), 3);
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn discontinuities_are_clamped() {
        let mut timer = FrameTimer::new();
        timer.advance(Duration::from_secs(30), |_| {});
        assert!((timer.delta_seconds() - 1.0).abs() < 1e-6);
        assert!((timer.total_seconds() - 1.0).abs() < 1e-6);
    }
}
