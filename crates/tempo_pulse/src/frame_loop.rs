//! Fixed-rate frame loop
//!
//! Runs on the calling thread and feeds timestamps into one animation per
//! frame until the animation stops. Groups are driven the same way as plain
//! timelines since both implement [`Animate`].

use std::thread;
use std::time::{Duration, Instant};

use tempo_animation::{Animate, TimingContext};

use crate::clock::MonotonicClock;

/// How a loop run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The animation stopped on its own after this many frames
    Stopped { frames: u64 },
    /// The frame cap was reached while the animation was still running
    FrameLimit { frames: u64 },
}

impl LoopOutcome {
    pub fn frames(&self) -> u64 {
        match *self {
            LoopOutcome::Stopped { frames } | LoopOutcome::FrameLimit { frames } => frames,
        }
    }
}

/// Drives an animation at a target frame rate
#[derive(Clone, Debug)]
pub struct FrameLoop {
    clock: MonotonicClock,
    target_fps: u32,
    max_frames: Option<u64>,
}

impl FrameLoop {
    /// Create a loop reading `clock` at 120fps with no frame cap
    pub fn new(clock: MonotonicClock) -> Self {
        Self {
            clock,
            target_fps: 120,
            max_frames: None,
        }
    }

    /// Builder: set the target frame rate (clamped to at least 1)
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.set_target_fps(fps);
        self
    }

    /// Builder: stop looping after `frames` frames
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.target_fps = fps.max(1);
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    pub fn clock(&self) -> MonotonicClock {
        self.clock
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.target_fps as u64)
    }

    fn at_limit(&self, frames: u64) -> bool {
        self.max_frames.is_some_and(|max| frames >= max)
    }

    /// Advance `animation` with clock timestamps until it stops
    ///
    /// The animation must already be started, normally from a
    /// [`ClockPulse`](crate::ClockPulse) sharing this loop's clock.
    pub fn run<A: Animate + ?Sized>(&self, animation: &mut A, ctx: &TimingContext) -> LoopOutcome {
        let frame_duration = self.frame_duration();
        let mut frames = 0u64;

        while animation.is_running() {
            if self.at_limit(frames) {
                tracing::debug!("FrameLoop: frame limit reached after {} frames", frames);
                return LoopOutcome::FrameLimit { frames };
            }

            let start = Instant::now();
            let timestamp = self.clock.now();
            animation.advance(timestamp, ctx);
            frames += 1;
            tracing::trace!("FrameLoop: frame {} at {:.4}s", frames, timestamp);

            // Sleep for remaining frame time
            let elapsed = start.elapsed();
            if elapsed < frame_duration {
                thread::sleep(frame_duration - elapsed);
            }
        }

        tracing::debug!("FrameLoop: animation stopped after {} frames", frames);
        LoopOutcome::Stopped { frames }
    }

    /// Advance `animation` with synthetic timestamps spaced one frame apart,
    /// beginning one frame after `start`, without sleeping
    ///
    /// Useful for offline rendering where every frame must be produced
    /// regardless of wall-clock time.
    pub fn run_stepped<A: Animate + ?Sized>(
        &self,
        animation: &mut A,
        start: f64,
        ctx: &TimingContext,
    ) -> LoopOutcome {
        let step = 1.0 / self.target_fps as f64;
        let mut frames = 0u64;

        while animation.is_running() {
            if self.at_limit(frames) {
                return LoopOutcome::FrameLimit { frames };
            }
            frames += 1;
            animation.advance(start + frames as f64 * step, ctx);
        }

        tracing::debug!("FrameLoop: stepped run stopped after {} frames", frames);
        LoopOutcome::Stopped { frames }
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(MonotonicClock::new())
    }
}
