//! Synchronized animation groups
//!
//! An [`AnimationGroup`] drives any number of children from a single pulse
//! source. Each child keeps its own duration, offsets, and easing; the group
//! only owns the shared envelope (its own duration, repeat count, and
//! autoreverse) and forwards every pulse's raw timestamp while the envelope is
//! active.
//!
//! Children are held weakly. Dropping the last strong reference to a child
//! removes it from the group on the next pulse.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::animate::Animate;
use crate::context::TimingContext;
use crate::properties::Property;
use crate::pulse::PulseSource;
use crate::timeline::Timeline;

new_key_type! {
    /// Handle to a child registered with a group
    pub struct ChildId;
}

type SharedChild = Rc<RefCell<dyn Animate>>;

/// A group of animations sharing one pulse and one top-level cycle
pub struct AnimationGroup {
    /// The group's own cycle; its value and update callback are unused
    envelope: Timeline,
    children: SlotMap<ChildId, Weak<RefCell<dyn Animate>>>,
}

impl AnimationGroup {
    pub fn new() -> Self {
        Self::from_envelope(Timeline::new())
    }

    pub fn with_pulse(pulse: Box<dyn PulseSource>) -> Self {
        Self::from_envelope(Timeline::with_pulse(pulse))
    }

    /// Create a group whose envelope is configured with a property batch
    pub fn with_properties(properties: &[Property]) -> Self {
        Self::from_envelope(Timeline::with_properties(properties))
    }

    fn from_envelope(envelope: Timeline) -> Self {
        Self {
            envelope,
            children: SlotMap::with_key(),
        }
    }

    /// The envelope timeline (duration, repeat, autoreverse, callbacks)
    pub fn envelope(&self) -> &Timeline {
        &self.envelope
    }

    pub fn envelope_mut(&mut self) -> &mut Timeline {
        &mut self.envelope
    }

    pub fn set_properties(&mut self, properties: &[Property]) {
        self.envelope.set_properties(properties);
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.envelope.set_paused(paused);
    }

    pub fn is_running(&self) -> bool {
        self.envelope.is_running()
    }

    /// Envelope progress in `[0, 1]` over the current leg
    pub fn progress(&self) -> f64 {
        self.envelope.progress()
    }

    // ========================================================================
    // Children
    // ========================================================================

    /// Register a child without taking ownership of it
    pub fn add<A: Animate + 'static>(&mut self, child: &Rc<RefCell<A>>) -> ChildId {
        let child: SharedChild = child.clone();
        self.children.insert(Rc::downgrade(&child))
    }

    /// Unregister a child; returns false if it was not registered
    pub fn remove(&mut self, id: ChildId) -> bool {
        self.children.remove(id).is_some()
    }

    /// Whether `id` refers to a registered child that is still alive
    pub fn contains(&self, id: ChildId) -> bool {
        self.children
            .get(id)
            .is_some_and(|child| child.strong_count() > 0)
    }

    /// Number of registered children that are still alive
    pub fn len(&self) -> usize {
        self.children
            .values()
            .filter(|child| child.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upgrade every live child, pruning the ones that were dropped
    fn live_children(&mut self) -> SmallVec<[SharedChild; 8]> {
        let mut live = SmallVec::new();
        let mut dead: SmallVec<[ChildId; 4]> = SmallVec::new();

        for (id, child) in &self.children {
            match child.upgrade() {
                Some(child) => live.push(child),
                None => dead.push(id),
            }
        }

        for id in dead {
            self.children.remove(id);
            tracing::debug!("AnimationGroup: pruned dropped child {:?}", id);
        }

        live
    }

    /// Run `f` on every live child that is not already borrowed
    fn for_each_child<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut dyn Animate),
    {
        for child in self.live_children() {
            match child.try_borrow_mut() {
                Ok(mut child) => f(&mut *child),
                Err(_) => tracing::warn!("AnimationGroup: skipping child borrowed elsewhere"),
            }
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start the envelope and prime every child to follow its pulse
    pub fn start(&mut self) {
        self.start_with(&[]);
    }

    /// Apply envelope `properties`, then start
    pub fn start_with(&mut self, properties: &[Property]) {
        self.envelope.start_with(properties);
        self.prime_children();
    }

    /// Start every child from the value it currently shows
    pub fn start_from_current_value(&mut self) {
        self.for_each_child(|child| child.retarget_from_current());
        self.start();
    }

    /// Stop the envelope and release the pulse source
    ///
    /// Children keep their state and resume following on the next start.
    pub fn stop(&mut self) {
        self.envelope.stop();
    }

    fn prime_children(&mut self) {
        let timestamp = self.envelope.last_timestamp;
        let mut primed = 0usize;
        self.for_each_child(|child| {
            child.prepare();
            child.attach(timestamp);
            primed += 1;
        });
        tracing::debug!("AnimationGroup: primed {} children at {}", primed, timestamp);
    }

    fn rewind_children(&mut self) {
        self.for_each_child(|child| child.rewind());
    }

    fn dispatch(&mut self, timestamp: f64, ctx: &TimingContext) {
        self.for_each_child(|child| {
            if child.is_running() {
                child.advance(timestamp, ctx);
            }
        });
    }

    /// Consume one pulse and forward it to running children
    ///
    /// The master speed is not applied to the envelope's own delta; children
    /// apply it themselves. Instead the envelope boundary shrinks by the same
    /// factor so the group cycle keeps pace with its children.
    pub fn advance(&mut self, timestamp: f64, ctx: &TimingContext) {
        let speed = self.envelope.speed;
        if !self.envelope.accumulate(timestamp, speed) {
            return;
        }

        let boundary = self.envelope.duration / ctx.master_speed;
        let elapsed = self.envelope.elapsed;

        if elapsed >= 0.0 && elapsed < boundary {
            self.envelope.enter_active();
            let fraction = elapsed / boundary;
            self.envelope.progress = if self.envelope.reversing {
                1.0 - fraction
            } else {
                fraction
            };
            self.dispatch(timestamp, ctx);
        }

        if elapsed >= boundary {
            self.dispatch(timestamp, ctx);
            if self.envelope.autoreverse && !self.envelope.reversing {
                self.envelope.reversing = true;
                self.envelope.progress = 1.0;
                self.envelope.elapsed = -self.envelope.autoreverse_offset;
            } else {
                self.envelope.progress = if self.envelope.reversing { 0.0 } else { 1.0 };
                self.envelope.reversing = false;
                if self.envelope.finish_cycle() {
                    self.rewind_children();
                }
            }
        }
    }
}

impl Default for AnimationGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl Animate for AnimationGroup {
    fn advance(&mut self, timestamp: f64, ctx: &TimingContext) {
        AnimationGroup::advance(self, timestamp, ctx);
    }

    fn prepare(&mut self) {
        self.envelope.prepare();
    }

    fn start(&mut self) {
        AnimationGroup::start(self);
    }

    fn stop(&mut self) {
        AnimationGroup::stop(self);
    }

    fn is_running(&self) -> bool {
        self.envelope.is_running()
    }

    fn attach(&mut self, timestamp: f64) {
        Animate::attach(&mut self.envelope, timestamp);
        self.prime_children();
    }

    fn rewind(&mut self) {
        Animate::rewind(&mut self.envelope);
        self.rewind_children();
    }

    fn retarget_from_current(&mut self) {
        self.for_each_child(|child| child.retarget_from_current());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(duration: f64) -> Rc<RefCell<Timeline>> {
        Rc::new(RefCell::new(Timeline::with_properties(&[
            Property::Duration(duration),
        ])))
    }

    #[test]
    fn test_add_remove_and_len() {
        let mut group = AnimationGroup::new();
        let a = child(1.0);
        let b = child(1.0);
        let a_id = group.add(&a);
        let b_id = group.add(&b);
        assert_eq!(group.len(), 2);

        assert!(group.remove(a_id));
        assert!(!group.remove(a_id));
        assert!(!group.contains(a_id));
        assert!(group.contains(b_id));

        drop(b);
        assert!(!group.contains(b_id));
        assert!(group.is_empty());
    }

    #[test]
    fn test_group_does_not_keep_children_alive() {
        let mut group = AnimationGroup::new();
        let a = child(1.0);
        group.add(&a);
        assert_eq!(Rc::strong_count(&a), 1);
    }

    #[test]
    fn test_start_primes_children() {
        let mut group = AnimationGroup::with_properties(&[Property::Duration(1.0)]);
        let a = Rc::new(RefCell::new(Timeline::with_properties(&[
            Property::Duration(1.0),
            Property::StartOffset(0.3),
        ])));
        group.add(&a);
        group.start();

        let a = a.borrow();
        assert!(a.is_running());
        assert!(a.is_pending_start());
        assert_eq!(a.time_offset(), -0.3);
        assert_eq!(a.last_timestamp(), group.envelope().last_timestamp());
    }

    #[test]
    fn test_dropped_children_are_pruned_on_pulse() {
        let mut group = AnimationGroup::with_properties(&[Property::Duration(1.0)]);
        let a = child(1.0);
        let id = group.add(&a);
        group.start();
        drop(a);

        group.advance(0.5, &TimingContext::new());
        assert!(group.children.get(id).is_none());
    }
}
