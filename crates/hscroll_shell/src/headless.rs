//! Headless host for driving the scroller without a window.
//!
//! Plays the part of the browser event loop: wheel and scroll events are
//! dispatched to global listeners with a microtask checkpoint after each,
//! animation frames tick the [`AnimationScheduler`] and report every
//! scrolled element with a scroll event, and macrotasks run between
//! frames. Useful for:
//! - Integration testing
//! - Replaying input from the command line

use std::sync::Arc;

use hscroll_animation::AnimationScheduler;
use hscroll_core::dom::{Document, ElementId, ElementTree, ScrollPosition};
use hscroll_core::events::{Event, EventDispatcher, WheelData};
use hscroll_core::task::TaskQueue;

/// Frames simulated by [`HeadlessHost::settle`] before giving up
pub const MAX_SETTLE_FRAMES: usize = 10_000;

/// A deterministic event loop over an in-memory document
pub struct HeadlessHost {
    tree: Arc<ElementTree>,
    events: Arc<EventDispatcher>,
    tasks: Arc<TaskQueue>,
    animations: Arc<AnimationScheduler>,
    frame_time: f32,
    frame_count: u64,
}

impl HeadlessHost {
    /// Create a host with a `width` x `height` viewport, ticking animations
    /// at `frame_rate` frames per second.
    pub fn new(width: f32, height: f32, frame_rate: f32) -> Self {
        let tree = Arc::new(ElementTree::new(width, height));
        let animations = Arc::new(AnimationScheduler::new(tree.clone()));
        Self {
            tree,
            events: Arc::new(EventDispatcher::new()),
            tasks: Arc::new(TaskQueue::new()),
            animations,
            frame_time: 1.0 / frame_rate.max(1.0),
            frame_count: 0,
        }
    }

    pub fn tree(&self) -> &Arc<ElementTree> {
        &self.tree
    }

    pub fn events(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    pub fn tasks(&self) -> &Arc<TaskQueue> {
        &self.tasks
    }

    pub fn animations(&self) -> &Arc<AnimationScheduler> {
        &self.animations
    }

    /// Seconds per animation frame
    pub fn frame_time(&self) -> f32 {
        self.frame_time
    }

    /// Get the number of frames simulated.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Dispatch a wheel event at the pointer position carried by `wheel`.
    ///
    /// Returns the event after dispatch so callers can inspect whether it
    /// was consumed.
    pub fn wheel(&self, wheel: WheelData) -> Event {
        let target = self.tree.element_from_point(wheel.client_x, wheel.client_y);
        let mut event = Event::wheel(target, wheel);
        self.dispatch(&mut event);
        event
    }

    /// Scroll `element` as a user would (scrollbar drag, keyboard) and
    /// report it with a scroll event
    pub fn user_scroll(&self, element: ElementId, left: f32) {
        let top = self
            .tree
            .scroll_position(element)
            .map(|p| p.top)
            .unwrap_or_default();
        self.tree
            .set_scroll_position(element, ScrollPosition::new(left, top));
        self.report_scrolled();
    }

    /// Simulate one animation frame. Returns true while animations are running.
    pub fn frame(&mut self) -> bool {
        let running = self.animations.tick(self.frame_time);
        self.frame_count += 1;
        self.report_scrolled();
        running
    }

    /// Run macrotasks (each followed by a microtask checkpoint) until
    /// the queues are empty. Returns how many tasks ran.
    pub fn run_tasks(&self) -> usize {
        self.tasks.run_until_idle()
    }

    /// Let `seconds` of wall time pass: pending tasks run, then animation
    /// frames are simulated for the elapsed time.
    pub fn advance(&mut self, seconds: f32) {
        let frames = (seconds / self.frame_time).ceil().max(0.0) as usize;
        self.run_tasks();
        for _ in 0..frames {
            self.frame();
            self.run_tasks();
        }
    }

    /// Run tasks and frames until nothing is pending and no animation is
    /// running. Returns the number of frames simulated.
    pub fn settle(&mut self) -> usize {
        let mut frames = 0;
        loop {
            self.run_tasks();
            // Layout changes can move scroll positions without a frame
            self.report_scrolled();
            if !self.animations.has_active_animations() && self.tasks.is_idle() {
                break;
            }
            if frames == MAX_SETTLE_FRAMES {
                tracing::warn!(frames, "host did not settle");
                break;
            }
            self.frame();
            frames += 1;
        }
        frames
    }

    fn dispatch(&self, event: &mut Event) {
        self.events.dispatch(event);
        self.tasks.flush_micro_tasks();
    }

    /// Fire one scroll event per element whose position changed
    fn report_scrolled(&self) {
        for element in self.tree.take_scrolled() {
            let position = self.tree.scroll_position(element).unwrap_or_default();
            let mut event = Event::scroll(element, position.left, position.top);
            self.dispatch(&mut event);
        }
    }
}
