//! Timeline state machine
//!
//! A [`Timeline`] interpolates one value between `from` and `to` over a
//! duration, driven by timestamps handed to [`Timeline::advance`]. Each cycle
//! waits out the start offset, plays forward, optionally plays back after the
//! autoreverse offset, then repeats or stops.
//!
//! ```text
//! Idle ──start──▶ PendingStart ──elapsed ≥ 0──▶ Active ──end──▶ Reversing ──end──┐
//!                      ▲                          │ (no autoreverse)              │
//!                      └────────── repeat ────────┴───────────────────────────────┤
//!                                                                                 ▼
//!                                                                  stop ──▶ Idle
//! ```

use crate::animate::Animate;
use crate::context::TimingContext;
use crate::easing::BezierCurve;
use crate::error::Result;
use crate::properties::{validate_properties, Property, Repeat};
use crate::pulse::{ManualPulse, PulseSource};

/// Callback fired when a cycle first enters its active window
pub type StartCallback = Box<dyn FnMut()>;

/// Callback fired with the freshly computed value
pub type UpdateCallback = Box<dyn FnMut(f64)>;

/// Callback fired with the number of cycles left when a cycle repeats
pub type RepeatCallback = Box<dyn FnMut(u64)>;

/// Callback fired when the timeline stops
pub type StopCallback = Box<dyn FnMut()>;

/// The four optional lifecycle callbacks of a timeline
#[derive(Default)]
pub struct Callbacks {
    pub on_start: Option<StartCallback>,
    pub on_update: Option<UpdateCallback>,
    pub on_will_repeat: Option<RepeatCallback>,
    pub on_stop: Option<StopCallback>,
}

const DEFAULT_DURATION: f64 = 0.25;

/// A single animated value
pub struct Timeline {
    // Configuration
    pub(crate) from_value: f64,
    pub(crate) to_value: f64,
    pub(crate) duration: f64,
    pub(crate) repeat: Repeat,
    pub(crate) autoreverse: bool,
    pub(crate) start_offset: f64,
    pub(crate) autoreverse_offset: f64,
    pub(crate) speed: f64,
    pub(crate) easing: Option<BezierCurve>,
    pub(crate) paused: bool,

    // Run state
    pub(crate) elapsed: f64,
    pub(crate) progress: f64,
    pub(crate) current_value: f64,
    pub(crate) running: bool,
    pub(crate) pending_start: bool,
    pub(crate) reversing: bool,
    pub(crate) repeats_remaining: u64,
    pub(crate) last_timestamp: f64,
    /// Curve solver tolerance, `1 / (200 * duration)`
    pub(crate) epsilon: f64,

    pulse: Box<dyn PulseSource>,
    callbacks: Callbacks,
}

impl Timeline {
    /// Create a timeline with default settings driven by a [`ManualPulse`]
    pub fn new() -> Self {
        Self::with_pulse(Box::new(ManualPulse::new()))
    }

    /// Create a timeline with default settings driven by `pulse`
    pub fn with_pulse(pulse: Box<dyn PulseSource>) -> Self {
        Self {
            from_value: 0.0,
            to_value: 1.0,
            duration: DEFAULT_DURATION,
            repeat: Repeat::default(),
            autoreverse: false,
            start_offset: 0.0,
            autoreverse_offset: 0.0,
            speed: 1.0,
            easing: None,
            paused: false,

            elapsed: 0.0,
            progress: 0.0,
            current_value: 0.0,
            running: false,
            pending_start: true,
            reversing: false,
            repeats_remaining: 1,
            last_timestamp: 0.0,
            epsilon: 1.0 / (200.0 * DEFAULT_DURATION),

            pulse,
            callbacks: Callbacks::default(),
        }
    }

    /// Create a timeline configured with a property batch
    pub fn with_properties(properties: &[Property]) -> Self {
        let mut timeline = Self::new();
        timeline.set_properties(properties);
        timeline
    }

    /// Replace the pulse source
    ///
    /// A running timeline keeps its current pulse begun; the replacement takes
    /// over from the next start.
    pub fn set_pulse_source(&mut self, pulse: Box<dyn PulseSource>) {
        self.pulse = pulse;
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Apply a property batch in order
    pub fn set_properties(&mut self, properties: &[Property]) {
        for property in properties {
            self.apply(*property);
        }
    }

    /// Validate a property batch and apply it only if every entry is valid
    pub fn try_set_properties(&mut self, properties: &[Property]) -> Result<()> {
        validate_properties(properties)?;
        self.set_properties(properties);
        Ok(())
    }

    /// Snapshot of the current configuration
    pub fn properties(&self) -> Vec<Property> {
        vec![
            Property::From(self.from_value),
            Property::To(self.to_value),
            Property::Duration(self.duration),
            Property::Autoreverse(self.autoreverse),
            Property::Repeat(self.repeat),
            Property::TimingFunction(self.easing),
            Property::StartOffset(self.start_offset),
            Property::AutoreverseOffset(self.autoreverse_offset),
            Property::Speed(self.speed),
        ]
    }

    fn apply(&mut self, property: Property) {
        match property {
            Property::From(value) => self.from_value = value,
            Property::To(value) => self.to_value = value,
            Property::Duration(value) => self.set_duration(value),
            Property::TimingFunction(curve) => self.easing = curve,
            Property::Autoreverse(enabled) => self.autoreverse = enabled,
            Property::Repeat(repeat) => self.set_repeat(repeat),
            Property::StartOffset(value) => self.start_offset = value,
            Property::AutoreverseOffset(value) => self.autoreverse_offset = value,
            Property::Speed(value) => self.speed = value,
        }
    }

    pub fn set_from_value(&mut self, value: f64) {
        self.from_value = value;
    }

    pub fn set_to_value(&mut self, value: f64) {
        self.to_value = value;
    }

    /// Set the cycle duration in seconds
    ///
    /// When the timeline sits inside its active window the elapsed time is
    /// rescaled so the current progress is kept. The solver tolerance only
    /// follows positive durations.
    pub fn set_duration(&mut self, duration: f64) {
        if self.elapsed >= 0.0 && self.elapsed <= duration {
            let forward = if self.reversing {
                1.0 - self.progress
            } else {
                self.progress
            };
            self.elapsed = forward * duration;
        }
        self.duration = duration;
        if duration > 0.0 {
            self.epsilon = 1.0 / (200.0 * duration);
        }
    }

    /// Set how many cycles play; also resets the cycles left
    pub fn set_repeat(&mut self, repeat: Repeat) {
        self.repeat = repeat;
        self.repeats_remaining = repeat.cycles();
    }

    pub fn set_autoreverse(&mut self, enabled: bool) {
        self.autoreverse = enabled;
    }

    pub fn set_start_offset(&mut self, seconds: f64) {
        self.start_offset = seconds;
    }

    pub fn set_autoreverse_offset(&mut self, seconds: f64) {
        self.autoreverse_offset = seconds;
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Set the timing curve; `None` is linear
    pub fn set_easing(&mut self, easing: Option<BezierCurve>) {
        self.easing = easing;
    }

    /// Pause or resume time accumulation
    ///
    /// Pulses received while paused are discarded, not buffered.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    // ========================================================================
    // Callbacks
    // ========================================================================

    /// Builder: set the start callback
    pub fn on_start<F: FnMut() + 'static>(mut self, callback: F) -> Self {
        self.set_on_start(callback);
        self
    }

    /// Builder: set the update callback
    pub fn on_update<F: FnMut(f64) + 'static>(mut self, callback: F) -> Self {
        self.set_on_update(callback);
        self
    }

    /// Builder: set the will-repeat callback
    pub fn on_will_repeat<F: FnMut(u64) + 'static>(mut self, callback: F) -> Self {
        self.set_on_will_repeat(callback);
        self
    }

    /// Builder: set the stop callback
    pub fn on_stop<F: FnMut() + 'static>(mut self, callback: F) -> Self {
        self.set_on_stop(callback);
        self
    }

    pub fn set_on_start<F: FnMut() + 'static>(&mut self, callback: F) {
        self.callbacks.on_start = Some(Box::new(callback));
    }

    pub fn set_on_update<F: FnMut(f64) + 'static>(&mut self, callback: F) {
        self.callbacks.on_update = Some(Box::new(callback));
    }

    pub fn set_on_will_repeat<F: FnMut(u64) + 'static>(&mut self, callback: F) {
        self.callbacks.on_will_repeat = Some(Box::new(callback));
    }

    pub fn set_on_stop<F: FnMut() + 'static>(&mut self, callback: F) {
        self.callbacks.on_stop = Some(Box::new(callback));
    }

    /// Replace all callbacks at once
    pub fn set_callbacks(&mut self, callbacks: Callbacks) {
        self.callbacks = callbacks;
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn from_value(&self) -> f64 {
        self.from_value
    }

    pub fn to_value(&self) -> f64 {
        self.to_value
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    pub fn autoreverse(&self) -> bool {
        self.autoreverse
    }

    pub fn start_offset(&self) -> f64 {
        self.start_offset
    }

    pub fn autoreverse_offset(&self) -> f64 {
        self.autoreverse_offset
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn easing(&self) -> Option<BezierCurve> {
        self.easing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current progress in `[0, 1]`, already adjusted for direction
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the current run has yet to enter its first active window
    pub fn is_pending_start(&self) -> bool {
        self.pending_start
    }

    pub fn is_reversing(&self) -> bool {
        self.reversing
    }

    pub fn repeats_remaining(&self) -> u64 {
        self.repeats_remaining
    }

    pub fn last_timestamp(&self) -> f64 {
        self.last_timestamp
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Seconds into the current leg; negative while waiting out an offset
    pub fn time_offset(&self) -> f64 {
        self.elapsed
    }

    /// Jump to `seconds` into the current leg and refresh the value
    ///
    /// Times past the duration are clamped to it.
    pub fn seek(&mut self, seconds: f64) {
        self.elapsed = seconds.min(self.duration);
        self.progress = self.cycle_fraction().clamp(0.0, 1.0);
        if self.reversing {
            self.progress = 1.0 - self.progress;
        }
        self.update_value();
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start (or restart) the animation
    pub fn start(&mut self) {
        self.start_with(&[]);
    }

    /// Apply `properties`, then start (or restart) the animation
    ///
    /// Restarting a running timeline re-primes its run state without beginning
    /// the pulse source again.
    pub fn start_with(&mut self, properties: &[Property]) {
        self.set_properties(properties);
        self.prepare();
        if !self.running {
            self.last_timestamp = self.pulse.begin();
        }
        self.running = true;
        tracing::debug!(
            "Timeline started: {} -> {} over {}s ({:?})",
            self.from_value,
            self.to_value,
            self.duration,
            self.repeat
        );
    }

    /// Animate from the current value to `to_value`
    pub fn start_to(&mut self, to_value: f64) {
        self.from_value = self.current_value;
        self.to_value = to_value;
        self.start();
    }

    /// Stop the animation and release the pulse source
    ///
    /// Safe to call repeatedly; the stop callback fires on every call.
    pub fn stop(&mut self) {
        self.pulse.end();
        self.running = false;
        self.paused = false;
        tracing::debug!("Timeline stopped at progress {}", self.progress);
        if let Some(callback) = self.callbacks.on_stop.as_mut() {
            callback();
        }
    }

    /// Reset run state for a fresh run
    pub fn prepare(&mut self) {
        self.pending_start = true;
        self.paused = false;
        self.reversing = false;
        self.repeats_remaining = self.repeat.cycles();
        self.elapsed = -self.start_offset;
    }

    /// Consume one pulse
    pub fn advance(&mut self, timestamp: f64, ctx: &TimingContext) {
        if !self.accumulate(timestamp, self.speed * ctx.master_speed) {
            return;
        }

        if self.elapsed >= 0.0 && self.elapsed < self.duration {
            self.enter_active();
            self.progress = self.cycle_fraction();
            if self.reversing {
                self.progress = 1.0 - self.progress;
            }
            self.update_value();
        }

        if self.elapsed >= self.duration {
            if !self.autoreverse {
                self.progress = 1.0;
                self.update_value();
                self.finish_cycle();
            } else if self.reversing {
                self.reversing = false;
                self.progress = 0.0;
                self.update_value();
                self.finish_cycle();
            } else {
                self.reversing = true;
                self.progress = if self.autoreverse_offset == 0.0 {
                    // Carry the overshoot into the reverse leg
                    (2.0 - self.cycle_fraction()).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                self.update_value();
                self.elapsed = -self.autoreverse_offset;
            }
        }
    }

    /// Recompute the current value from the current progress
    ///
    /// Also usable while stopped, e.g. after editing `from`/`to`.
    pub fn update_value(&mut self) {
        let eased = match &self.easing {
            Some(curve) => curve.solve(self.progress, self.epsilon),
            None => self.progress,
        };
        self.current_value = self.from_value + eased * (self.to_value - self.from_value);
        if let Some(callback) = self.callbacks.on_update.as_mut() {
            callback(self.current_value);
        }
    }

    // ========================================================================
    // Transition helpers shared with groups
    // ========================================================================

    /// Record the pulse and accumulate scaled time; false while paused
    pub(crate) fn accumulate(&mut self, timestamp: f64, scale: f64) -> bool {
        let delta = (timestamp - self.last_timestamp) * scale;
        self.last_timestamp = timestamp;
        if self.paused {
            return false;
        }
        self.elapsed += delta;
        true
    }

    pub(crate) fn enter_active(&mut self) {
        if self.pending_start {
            self.pending_start = false;
            if let Some(callback) = self.callbacks.on_start.as_mut() {
                callback();
            }
        }
    }

    /// Repeat the cycle or stop; returns true when repeating
    pub(crate) fn finish_cycle(&mut self) -> bool {
        if self.repeats_remaining > 1 {
            self.elapsed = -self.start_offset;
            if !self.repeat.is_forever() {
                self.repeats_remaining -= 1;
            }
            tracing::debug!("Timeline repeating, {} left", self.repeats_remaining);
            if let Some(callback) = self.callbacks.on_will_repeat.as_mut() {
                callback(self.repeats_remaining);
            }
            true
        } else {
            self.stop();
            false
        }
    }

    /// Elapsed fraction of the leg; a degenerate duration counts as complete
    fn cycle_fraction(&self) -> f64 {
        if self.duration > 0.0 {
            self.elapsed / self.duration
        } else {
            1.0
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Animate for Timeline {
    fn advance(&mut self, timestamp: f64, ctx: &TimingContext) {
        Timeline::advance(self, timestamp, ctx);
    }

    fn prepare(&mut self) {
        Timeline::prepare(self);
    }

    fn start(&mut self) {
        Timeline::start(self);
    }

    fn stop(&mut self) {
        Timeline::stop(self);
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn attach(&mut self, timestamp: f64) {
        self.last_timestamp = timestamp;
        self.running = true;
    }

    fn rewind(&mut self) {
        self.elapsed = -self.start_offset;
    }

    fn retarget_from_current(&mut self) {
        self.from_value = self.current_value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ctx() -> TimingContext {
        TimingContext::new()
    }

    #[test]
    fn test_defaults() {
        let timeline = Timeline::new();
        assert_eq!(timeline.duration(), 0.25);
        assert_eq!(timeline.epsilon(), 0.02);
        assert_eq!(timeline.repeat(), Repeat::Count(1));
        assert!(!timeline.is_running());
        assert!(timeline.is_pending_start());
    }

    #[test]
    fn test_epsilon_follows_positive_duration_only() {
        let mut timeline = Timeline::new();
        timeline.set_duration(2.0);
        assert_eq!(timeline.epsilon(), 1.0 / 400.0);

        timeline.set_duration(0.0);
        assert_eq!(timeline.duration(), 0.0);
        assert_eq!(timeline.epsilon(), 1.0 / 400.0);
    }

    #[test]
    fn test_properties_roundtrip_snapshot() {
        let batch = [
            Property::From(2.0),
            Property::To(4.0),
            Property::Duration(1.5),
            Property::TimingFunction(Some(BezierCurve::ease_out())),
            Property::Autoreverse(true),
            Property::repeat_forever(),
            Property::StartOffset(0.1),
            Property::AutoreverseOffset(0.2),
            Property::Speed(2.0),
        ];
        let timeline = Timeline::with_properties(&batch);
        let snapshot = timeline.properties();
        for property in batch {
            assert!(snapshot.contains(&property), "missing {:?}", property);
        }
        assert_eq!(timeline.repeats_remaining(), u64::MAX);
    }

    #[test]
    fn test_try_set_properties_is_atomic() {
        let mut timeline = Timeline::new();
        let result = timeline.try_set_properties(&[Property::To(9.0), Property::Duration(0.0)]);
        assert!(result.is_err());
        assert_eq!(timeline.to_value(), 1.0);
        assert_eq!(timeline.duration(), 0.25);
    }

    #[test]
    fn test_linear_midpoint() {
        let mut timeline = Timeline::with_properties(&[
            Property::From(0.0),
            Property::To(100.0),
            Property::Duration(1.0),
        ]);
        timeline.start();
        timeline.advance(0.5, &ctx());
        assert_eq!(timeline.progress(), 0.5);
        assert_eq!(timeline.current_value(), 50.0);
    }

    #[test]
    fn test_update_value_while_stopped() {
        let mut timeline = Timeline::with_properties(&[Property::Duration(1.0)]);
        timeline.seek(0.25);
        assert_eq!(timeline.current_value(), 0.25);

        timeline.set_to_value(5.0);
        assert_eq!(timeline.current_value(), 0.25);
        timeline.update_value();
        assert_eq!(timeline.current_value(), 1.25);
    }

    #[test]
    fn test_seek_clamps_to_duration() {
        let mut timeline = Timeline::with_properties(&[Property::Duration(1.0), Property::To(2.0)]);
        timeline.seek(3.0);
        assert_eq!(timeline.time_offset(), 1.0);
        assert_eq!(timeline.progress(), 1.0);
        assert_eq!(timeline.current_value(), 2.0);
    }

    #[test]
    fn test_set_duration_keeps_progress() {
        let mut timeline = Timeline::with_properties(&[Property::Duration(1.0)]);
        timeline.start();
        timeline.advance(0.5, &ctx());
        timeline.set_duration(4.0);
        assert_eq!(timeline.time_offset(), 2.0);

        timeline.advance(1.5, &ctx());
        assert_eq!(timeline.progress(), 0.75);
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let stops = Rc::new(RefCell::new(0));
        let stops_clone = stops.clone();
        let mut timeline = Timeline::new().on_stop(move || *stops_clone.borrow_mut() += 1);
        timeline.set_duration(0.0);
        timeline.set_to_value(3.0);

        timeline.start();
        timeline.advance(0.0, &ctx());
        assert_eq!(timeline.progress(), 1.0);
        assert_eq!(timeline.current_value(), 3.0);
        assert_eq!(*stops.borrow(), 1);
        assert!(!timeline.is_running());
    }

    #[test]
    fn test_zero_duration_autoreverse_stays_in_range() {
        let mut timeline = Timeline::with_properties(&[Property::Autoreverse(true)]);
        timeline.set_duration(0.0);
        timeline.start();
        timeline.advance(0.1, &ctx());
        assert!(timeline.is_reversing());
        assert_eq!(timeline.progress(), 1.0);
        timeline.advance(0.2, &ctx());
        assert_eq!(timeline.progress(), 0.0);
        assert!(!timeline.is_running());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let stops = Rc::new(RefCell::new(0));
        let stops_clone = stops.clone();
        let mut timeline = Timeline::new().on_stop(move || *stops_clone.borrow_mut() += 1);
        timeline.stop();
        timeline.stop();
        assert!(!timeline.is_running());
        assert_eq!(*stops.borrow(), 2);
    }

    #[test]
    fn test_start_while_running_does_not_rebegin_pulse() {
        let pulse = ManualPulse::starting_at(10.0);
        let mut timeline = Timeline::with_pulse(Box::new(pulse.clone()));
        timeline.set_duration(1.0);

        timeline.start();
        assert_eq!(timeline.last_timestamp(), 10.0);
        timeline.advance(10.5, &ctx());

        pulse.set_now(99.0);
        timeline.start();
        assert_eq!(timeline.last_timestamp(), 10.5);
        assert_eq!(timeline.time_offset(), 0.0);
        assert!(timeline.is_pending_start());
    }

    #[test]
    fn test_pulse_released_on_stop() {
        let pulse = ManualPulse::new();
        let mut timeline = Timeline::with_pulse(Box::new(pulse.clone()));
        timeline.set_duration(1.0);
        timeline.start();
        assert!(pulse.is_active());
        timeline.advance(1.0, &ctx());
        assert!(!pulse.is_active());
    }
}
