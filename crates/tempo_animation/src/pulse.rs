//! Pulse source contract
//!
//! A pulse source delivers timestamps (in seconds) at some external cadence:
//! a display refresh, a timer, a frame loop. The timeline begins its source
//! when it starts and ends it when it stops; delivery itself happens outside
//! this crate by calling `advance(timestamp, ctx)` once per pulse.

use std::cell::Cell;
use std::rc::Rc;

/// A source of animation pulses
pub trait PulseSource {
    /// Begin delivering pulses, returning the first timestamp
    fn begin(&mut self) -> f64;

    /// Stop delivering pulses
    ///
    /// Must be harmless when the source was never begun.
    fn end(&mut self);
}

#[derive(Debug, Default)]
struct ManualState {
    now: Cell<f64>,
    active: Cell<bool>,
}

/// A host-driven pulse source
///
/// The host owns the clock: it moves `now` forward with [`set_now`] and calls
/// `advance` itself. Clones share state, so a handle kept by the host observes
/// the timeline beginning and ending the source.
///
/// [`set_now`]: ManualPulse::set_now
#[derive(Clone, Debug, Default)]
pub struct ManualPulse {
    state: Rc<ManualState>,
}

impl ManualPulse {
    /// Create a manual pulse whose clock starts at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manual pulse whose clock starts at `now`
    pub fn starting_at(now: f64) -> Self {
        let pulse = Self::new();
        pulse.set_now(now);
        pulse
    }

    pub fn now(&self) -> f64 {
        self.state.now.get()
    }

    pub fn set_now(&self, now: f64) {
        self.state.now.set(now);
    }

    /// Move the clock forward by `dt` seconds, returning the new time
    pub fn step(&self, dt: f64) -> f64 {
        let now = self.now() + dt;
        self.set_now(now);
        now
    }

    /// Whether a timeline currently holds this source begun
    pub fn is_active(&self) -> bool {
        self.state.active.get()
    }
}

impl PulseSource for ManualPulse {
    fn begin(&mut self) -> f64 {
        self.state.active.set(true);
        self.now()
    }

    fn end(&mut self) {
        self.state.active.set(false);
    }
}
