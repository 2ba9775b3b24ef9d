//! Tempo Animation Core
//!
//! Time-based value interpolation driven by externally supplied pulses.
//!
//! # Features
//!
//! - **Timing Curves**: Cubic bezier easing solved by Newton iteration with a
//!   bisection fallback
//! - **Timelines**: Start offsets, autoreverse with its own delay, finite or
//!   endless repeats, per-animation speed, pause and resume
//! - **Groups**: Many timelines driven by one pulse, held weakly, with a shared
//!   repeat envelope
//! - **Pulse Sources**: A small contract for whatever delivers timestamps
//!
//! The crate owns no thread or event loop. Hosts hand timestamps (in seconds)
//! to `advance` along with a [`TimingContext`].

pub mod animate;
pub mod context;
pub mod easing;
pub mod error;
pub mod group;
pub mod properties;
pub mod pulse;
pub mod timeline;

pub use animate::Animate;
pub use context::TimingContext;
pub use easing::{BezierCurve, Easing};
pub use error::{ConfigError, Result};
pub use group::{AnimationGroup, ChildId};
pub use properties::{validate_properties, Property, Repeat};
pub use pulse::{ManualPulse, PulseSource};
pub use timeline::{Callbacks, Timeline};
