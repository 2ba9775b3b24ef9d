//! Monotonic clock pulses

use std::time::Instant;

use tempo_animation::PulseSource;

/// Seconds elapsed since a fixed origin
///
/// Copies share the origin, so a pulse source and the loop feeding
/// timestamps agree on the time base.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Seconds since the origin
    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

/// A pulse source reading a [`MonotonicClock`]
///
/// Delivery is left to the host (see [`FrameLoop`](crate::FrameLoop)); the
/// source reports the first timestamp and whether it is active.
#[derive(Clone, Debug)]
pub struct ClockPulse {
    clock: MonotonicClock,
    active: bool,
}

impl ClockPulse {
    pub fn new(clock: MonotonicClock) -> Self {
        Self {
            clock,
            active: false,
        }
    }

    pub fn clock(&self) -> MonotonicClock {
        self.clock
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl PulseSource for ClockPulse {
    fn begin(&mut self) -> f64 {
        self.active = true;
        self.clock.now()
    }

    fn end(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let clock = MonotonicClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(first >= 0.0);
        assert!(second >= first);
    }

    #[test]
    fn test_clock_pulse_begin_end() {
        let clock = MonotonicClock::new();
        let mut pulse = ClockPulse::new(clock);
        assert!(!pulse.is_active());

        let before = clock.now();
        let first = pulse.begin();
        assert!(pulse.is_active());
        assert!(first >= before);

        pulse.end();
        pulse.end();
        assert!(!pulse.is_active());
    }
}
