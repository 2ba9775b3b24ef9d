//! Tempo Pulse Sources
//!
//! Concrete pulse sources for `tempo_animation`:
//!
//! - [`MonotonicClock`] and [`ClockPulse`]: timestamps in seconds since a
//!   shared origin, read from the monotonic system clock
//! - [`FrameLoop`]: a fixed-rate loop on the calling thread that feeds clock
//!   timestamps into an animation until it stops, or synthetic fixed-step
//!   timestamps for offline rendering

pub mod clock;
pub mod frame_loop;

pub use clock::{ClockPulse, MonotonicClock};
pub use frame_loop::{FrameLoop, LoopOutcome};
