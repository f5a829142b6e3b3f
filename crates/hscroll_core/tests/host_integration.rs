//! Integration tests for the host primitives
//!
//! These tests verify that:
//! - Listeners can defer work through the task queue
//! - Scroll changes recorded by the element tree can be replayed as events
//! - Hit testing follows scrolled containers

use hscroll_core::dom::{Document, ElementSpec, ElementTree, Overflow, ScrollPosition};
use hscroll_core::events::{event_types, Event, EventData, EventDispatcher, Phase, WheelData};
use hscroll_core::task::{Scheduler, TaskQueue};
use std::sync::{Arc, Mutex};

/// Test that a listener's microtask runs before the next event's listener
#[test]
fn test_listener_defers_to_microtask() {
    let events = EventDispatcher::new();
    let tasks = Arc::new(TaskQueue::new());
    let log = Arc::new(Mutex::new(Vec::new()));

    let t = tasks.clone();
    let l = log.clone();
    events.add_listener(event_types::SCROLL, Phase::Capture, move |event| {
        let EventData::Scroll { left, .. } = event.data else {
            return;
        };
        l.lock().unwrap().push(format!("event {left}"));
        let l = l.clone();
        t.queue_micro_task(Box::new(move || {
            l.lock().unwrap().push(format!("micro {left}"));
        }));
    });

    let tree = ElementTree::new(800.0, 600.0);
    let strip = tree.create_element(
        tree.root(),
        ElementSpec::new(0.0, 0.0, 800.0, 600.0).content(1600.0, 600.0),
    );

    for left in [100.0, 200.0] {
        events.dispatch(&mut Event::scroll(strip, left, 0.0));
        tasks.flush_micro_tasks();
    }

    assert_eq!(
        *log.lock().unwrap(),
        vec!["event 100", "micro 100", "event 200", "micro 200"]
    );
}

/// Test that recorded scroll changes replay as one event per element
#[test]
fn test_scrolled_elements_replay_as_events() {
    let tree = ElementTree::new(800.0, 600.0);
    let a = tree.create_element(
        tree.root(),
        ElementSpec::new(0.0, 0.0, 400.0, 600.0).content(1200.0, 600.0),
    );
    let b = tree.create_element(
        tree.root(),
        ElementSpec::new(400.0, 0.0, 400.0, 600.0).content(400.0, 1800.0),
    );

    tree.set_scroll_position(a, ScrollPosition::new(300.0, 0.0));
    tree.set_scroll_position(b, ScrollPosition::new(0.0, 900.0));
    tree.set_scroll_position(a, ScrollPosition::new(350.0, 0.0));

    let events = EventDispatcher::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    events.add_listener(event_types::SCROLL, Phase::Bubble, move |event| {
        s.lock().unwrap().push((event.target, event.data.clone()));
    });

    for element in tree.take_scrolled() {
        let position = tree.scroll_position(element).unwrap();
        events.dispatch(&mut Event::scroll(element, position.left, position.top));
    }

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (Some(a), EventData::Scroll { left: 350.0, top: 0.0 }),
            (Some(b), EventData::Scroll { left: 0.0, top: 900.0 }),
        ]
    );
    assert!(tree.take_scrolled().is_empty());
}

/// Test that a capture listener can claim a wheel event over a scrolled strip
#[test]
fn test_capture_listener_claims_wheel_over_scrolled_child() {
    let tree = Arc::new(ElementTree::new(800.0, 600.0));
    let strip = tree.create_element(
        tree.root(),
        ElementSpec::new(0.0, 0.0, 800.0, 600.0)
            .content(2400.0, 600.0)
            .overflow_x(Overflow::Auto),
    );
    let far_panel = tree.create_element(strip, ElementSpec::new(1600.0, 0.0, 800.0, 600.0));
    tree.set_scroll_position(strip, ScrollPosition::new(1600.0, 0.0));

    let events = EventDispatcher::new();
    let t = tree.clone();
    events.add_listener(event_types::WHEEL, Phase::Capture, move |event| {
        if event.target.and_then(|target| t.parent(target)) == Some(strip) {
            event.prevent_default();
            event.stop_propagation();
        }
    });
    let bubbled = Arc::new(Mutex::new(0));
    let b = bubbled.clone();
    events.add_listener(event_types::WHEEL, Phase::Bubble, move |_| {
        *b.lock().unwrap() += 1;
    });

    let target = tree.element_from_point(100.0, 100.0);
    assert_eq!(target, Some(far_panel));
    let mut event = Event::wheel(target, WheelData::at(100.0, 100.0).with_wheel_delta(-120.0));
    events.dispatch(&mut event);

    assert!(event.default_prevented);
    assert_eq!(*bubbled.lock().unwrap(), 0);
}
