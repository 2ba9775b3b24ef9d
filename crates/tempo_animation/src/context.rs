//! Shared timing configuration threaded through every pulse

/// Timing settings shared by every animation advanced with this context
///
/// `master_speed` scales the time delta of each timeline. A change takes
/// effect on the next pulse the context is passed to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingContext {
    pub master_speed: f64,
}

impl TimingContext {
    pub fn new() -> Self {
        Self { master_speed: 1.0 }
    }

    /// Builder: set the master speed factor
    pub fn with_master_speed(mut self, master_speed: f64) -> Self {
        self.master_speed = master_speed;
        self
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}
