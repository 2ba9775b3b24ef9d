//! Integration tests for driving tempo animations from frame loops

use std::cell::RefCell;
use std::rc::Rc;

use tempo_animation::{AnimationGroup, Property, Repeat, Timeline, TimingContext};
use tempo_pulse::{ClockPulse, FrameLoop, LoopOutcome, MonotonicClock};

#[test]
fn test_clock_loop_runs_timeline_to_completion() {
    let clock = MonotonicClock::new();
    let frame_loop = FrameLoop::new(clock)
        .with_target_fps(1000)
        .with_max_frames(10_000);

    let mut timeline = Timeline::with_pulse(Box::new(ClockPulse::new(clock)));
    timeline.set_properties(&[
        Property::From(0.0),
        Property::To(50.0),
        Property::Duration(0.05),
    ]);
    timeline.start();

    let outcome = frame_loop.run(&mut timeline, &TimingContext::new());
    assert!(matches!(outcome, LoopOutcome::Stopped { .. }));
    assert!(outcome.frames() > 0);
    assert_eq!(timeline.progress(), 1.0);
    assert_eq!(timeline.current_value(), 50.0);
}

#[test]
fn test_frame_limit_bounds_endless_animation() {
    let frame_loop = FrameLoop::new(MonotonicClock::new())
        .with_target_fps(1000)
        .with_max_frames(5);

    let mut timeline = Timeline::with_properties(&[
        Property::Duration(0.001),
        Property::Repeat(Repeat::Forever),
    ]);
    timeline.start();

    let outcome = frame_loop.run(&mut timeline, &TimingContext::new());
    assert_eq!(outcome, LoopOutcome::FrameLimit { frames: 5 });
    assert!(timeline.is_running());
}

#[test]
fn test_stepped_run_is_deterministic() {
    let frame_loop = FrameLoop::default().with_target_fps(4);
    let values = Rc::new(RefCell::new(Vec::new()));
    let log = values.clone();

    let mut timeline = Timeline::with_properties(&[
        Property::To(8.0),
        Property::Duration(1.0),
    ])
    .on_update(move |value| log.borrow_mut().push(value));
    timeline.start();

    let outcome = frame_loop.run_stepped(&mut timeline, 0.0, &TimingContext::new());
    assert_eq!(outcome, LoopOutcome::Stopped { frames: 4 });
    assert_eq!(*values.borrow(), vec![2.0, 4.0, 6.0, 8.0]);
}

#[test]
fn test_stepped_run_drives_group() {
    let frame_loop = FrameLoop::default().with_target_fps(10);
    let mut group = AnimationGroup::with_properties(&[Property::Duration(1.0)]);
    let fast = Rc::new(RefCell::new(Timeline::with_properties(&[
        Property::Duration(0.5),
    ])));
    let slow = Rc::new(RefCell::new(Timeline::with_properties(&[
        Property::Duration(1.0),
        Property::StartOffset(0.5),
    ])));
    group.add(&fast);
    group.add(&slow);
    group.start();

    let outcome = frame_loop.run_stepped(&mut group, 0.0, &TimingContext::new());
    assert!(matches!(outcome, LoopOutcome::Stopped { .. }));
    assert!(!fast.borrow().is_running());
    assert_eq!(fast.borrow().progress(), 1.0);
    // The group envelope ends before the delayed child finishes
    assert!(slow.borrow().is_running());
    assert!(slow.borrow().progress() > 0.0);
    assert!(slow.borrow().progress() < 1.0);
}
