//! The capability set shared by timelines and groups

use crate::context::TimingContext;

/// Something driven by pulses
///
/// Implemented by [`Timeline`](crate::Timeline) and
/// [`AnimationGroup`](crate::AnimationGroup), so a group can drive plain
/// timelines and nested groups alike.
pub trait Animate {
    /// Consume one pulse
    fn advance(&mut self, timestamp: f64, ctx: &TimingContext);

    /// Reset run state for a fresh run without touching the pulse source
    fn prepare(&mut self);

    /// Begin running from its own pulse source
    fn start(&mut self);

    /// Stop running and release the pulse source
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Hand control to an outside driver whose clock currently reads
    /// `timestamp`. The animation is marked running but does not begin its own
    /// pulse source.
    fn attach(&mut self, timestamp: f64);

    /// Restart the current cycle from its start offset
    fn rewind(&mut self);

    /// Continue from where the animation currently sits on its next run
    fn retarget_from_current(&mut self);
}
