//! The horizontal scroll controller
//!
//! While bound to a container, the controller listens globally (capture
//! phase) for wheel and scroll events:
//!
//! - **Wheel**: when the gesture belongs to the container, the legacy wheel
//!   delta is turned into a clamped offset and the container is animated
//!   there; the event's default action is suppressed.
//! - **Scroll**: native scroll notifications resync the stored offset from
//!   the container, except for the one notification caused by the
//!   controller's own animation. Notifications arriving before the next
//!   microtask collapse into one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use hscroll_animation::{AnimateTo, Animator};
use hscroll_core::dom::{Document, ElementId};
use hscroll_core::events::{event_types, Event, EventData, EventDispatcher, ListenerId, Phase};
use hscroll_core::task::Scheduler;

use crate::config::ScrollerConfig;
use crate::direction::{determine_scroll_direction, DirectionCache, ScrollDir};
use crate::error::{Result, ScrollError};
use crate::offset::{calculate_new_offset, Offset, OffsetRequest};
use crate::wheel::wheel_delta;

/// Everything that exists only while bound
struct Binding {
    container: ElementId,
    offset: Offset,
    cache: DirectionCache,
    wheel_listener: ListenerId,
    scroll_listener: ListenerId,
    /// Distinguishes this binding from earlier ones in deferred tasks
    generation: u64,
}

#[derive(Default)]
struct ScrollerState {
    binding: Option<Binding>,
    is_handling_scroll_event: bool,
    generation: u64,
}

struct ScrollerInner {
    document: Arc<dyn Document>,
    events: Arc<EventDispatcher>,
    scheduler: Arc<dyn Scheduler>,
    animator: Arc<dyn Animator>,
    config: ScrollerConfig,
    state: Mutex<ScrollerState>,
}

/// Horizontal scroll controller for one container at a time
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct HorizontalScroller {
    inner: Arc<ScrollerInner>,
}

impl HorizontalScroller {
    pub fn new(
        document: Arc<dyn Document>,
        events: Arc<EventDispatcher>,
        scheduler: Arc<dyn Scheduler>,
        animator: Arc<dyn Animator>,
        config: ScrollerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ScrollerInner {
                document,
                events,
                scheduler,
                animator,
                config,
                state: Mutex::new(ScrollerState::default()),
            }),
        }
    }

    pub fn config(&self) -> &ScrollerConfig {
        &self.inner.config
    }

    pub fn is_bound(&self) -> bool {
        self.inner.state().binding.is_some()
    }

    /// The container currently bound
    pub fn container(&self) -> Option<ElementId> {
        self.inner.state().binding.as_ref().map(|b| b.container)
    }

    /// The stored offset (None while unbound)
    pub fn offset(&self) -> Option<Offset> {
        self.inner.state().binding.as_ref().map(|b| b.offset)
    }

    /// Direction cached for the current wheel gesture
    pub fn cached_direction(&self) -> Option<ScrollDir> {
        self.inner
            .state()
            .binding
            .as_ref()
            .and_then(|b| b.cache.scroll_dir())
    }

    pub fn is_handling_scroll_event(&self) -> bool {
        self.inner.state().is_handling_scroll_event
    }

    /// Attach to `container`, releasing any previous container first.
    ///
    /// Registers the global wheel and scroll listeners and queues a
    /// macrotask that scrolls to the end of the container.
    pub fn bind(&self, container: ElementId) -> Result<()> {
        let position = self
            .inner
            .document
            .scroll_position(container)
            .ok_or(ScrollError::UnknownElement(container))?;

        let mut state = self.inner.state();
        if let Some(previous) = state.binding.take() {
            self.inner.release(previous);
        }

        let weak = Arc::downgrade(&self.inner);
        let wheel_listener =
            self.inner
                .events
                .add_listener(event_types::WHEEL, Phase::Capture, move |event| {
                    if let Some(inner) = weak.upgrade() {
                        inner.handle_wheel(event);
                    }
                });
        let weak = Arc::downgrade(&self.inner);
        let scroll_listener =
            self.inner
                .events
                .add_listener(event_types::SCROLL, Phase::Capture, move |event| {
                    if let Some(inner) = weak.upgrade() {
                        inner.handle_scroll(event);
                    }
                });

        state.generation += 1;
        let generation = state.generation;
        state.binding = Some(Binding {
            container,
            offset: Offset::new(position.left, position.top),
            cache: DirectionCache::new(),
            wheel_listener,
            scroll_listener,
            generation,
        });
        drop(state);

        tracing::debug!(?container, offset = position.left, "scroller bound");

        let weak = Arc::downgrade(&self.inner);
        let target = self.inner.config.initial_offset;
        self.inner.scheduler.queue_task(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let mut state = inner.state();
            if !state.is_generation(generation) {
                tracing::trace!("skipping scroll to end: binding replaced");
                return;
            }
            if let Err(err) = inner.scroll_to_locked(&mut state, target, false) {
                tracing::warn!(%err, "initial scroll to end failed");
            }
        }));

        Ok(())
    }

    /// Detach from the container and remove both listeners. No-op when unbound.
    pub fn unbind(&self) {
        let previous = self.inner.state().binding.take();
        if let Some(binding) = previous {
            tracing::debug!(container = ?binding.container, "scroller unbound");
            self.inner.release(binding);
        }
    }

    /// Shift the stored offset by `delta` without clamping or animating.
    /// No-op when unbound.
    pub fn update_offset_x(&self, delta: f32) {
        if let Some(binding) = self.inner.state().binding.as_mut() {
            binding.offset.x += delta;
        }
    }

    /// Animate the container to `target`, clamped unless `skip_bounds_check`.
    pub fn scroll_to(&self, target: f32, skip_bounds_check: bool) -> Result<()> {
        let mut state = self.inner.state();
        self.inner
            .scroll_to_locked(&mut state, target, skip_bounds_check)
    }

    /// Move by `delta` relative to the stored offset; positive deltas move
    /// towards offset 0.
    pub fn scroll_offset(&self, delta: f32, skip_bounds_check: bool) -> Result<()> {
        let mut state = self.inner.state();
        let binding = state.binding.as_ref().ok_or(ScrollError::NoContainer)?;
        let target = if skip_bounds_check {
            binding.offset.x - delta
        } else {
            calculate_new_offset(
                self.inner.document.metrics(binding.container).as_ref(),
                binding.offset.x,
                OffsetRequest::Change(delta),
                &self.inner.config,
            )?
        };
        self.inner.scroll_to_locked(&mut state, target, true)
    }
}

impl ScrollerState {
    fn is_generation(&self, generation: u64) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| b.generation == generation)
    }
}

impl ScrollerInner {
    fn state(&self) -> MutexGuard<'_, ScrollerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, binding: Binding) {
        self.events.remove_listener(binding.wheel_listener);
        self.events.remove_listener(binding.scroll_listener);
    }

    fn scroll_to_locked(
        self: &Arc<Self>,
        state: &mut ScrollerState,
        target: f32,
        skip_bounds_check: bool,
    ) -> Result<()> {
        let binding = state.binding.as_mut().ok_or(ScrollError::NoContainer)?;
        let target = if skip_bounds_check {
            target
        } else {
            calculate_new_offset(
                self.document.metrics(binding.container).as_ref(),
                binding.offset.x,
                OffsetRequest::Target(target),
                &self.config,
            )?
        };

        if target == binding.offset.x {
            tracing::trace!(offset = target, "scroll target unchanged");
            return Ok(());
        }

        tracing::trace!(from = binding.offset.x, to = target, "scrolling");
        binding.offset.x = target;
        binding.offset.set_by_script = true;

        let generation = binding.generation;
        let weak: Weak<Self> = Arc::downgrade(self);
        self.scheduler.queue_micro_task(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.start_animation(generation);
            }
        }));
        Ok(())
    }

    /// Animate the container to the offset stored at the time this runs
    fn start_animation(&self, generation: u64) {
        let (container, x) = {
            let state = self.state();
            match state.binding.as_ref() {
                Some(b) if b.generation == generation => (b.container, b.offset.x),
                _ => return,
            }
        };
        self.animator.animate_property(
            container,
            self.config.animation_duration,
            AnimateTo::scroll_left(x, self.config.easing),
        );
    }

    fn handle_wheel(self: &Arc<Self>, event: &mut Event) {
        let EventData::Wheel(wheel) = event.data else {
            return;
        };

        let mut state = self.state();
        let Some(binding) = state.binding.as_mut() else {
            return;
        };

        let container = binding.container;
        let document = &*self.document;
        let threshold = self.config.overflow_threshold;
        let dir = binding.cache.resolve(
            wheel.client_x,
            wheel.client_y,
            self.config.direction_hysteresis,
            || determine_scroll_direction(document, container, wheel.client_x, wheel.client_y, threshold),
        );
        if dir == ScrollDir::Vertical {
            return;
        }

        let delta = wheel_delta(&wheel, &self.config);
        let next = calculate_new_offset(
            document.metrics(container).as_ref(),
            binding.offset.x,
            OffsetRequest::WheelDelta(delta),
            &self.config,
        )
        .and_then(|next| self.scroll_to_locked(&mut state, next, true));
        if let Err(err) = next {
            tracing::warn!(%err, "wheel scroll failed");
        }

        event.prevent_default();
        event.stop_propagation();
    }

    fn handle_scroll(self: &Arc<Self>, _event: &mut Event) {
        let mut state = self.state();
        if state.is_handling_scroll_event {
            return;
        }
        let Some(binding) = state.binding.as_mut() else {
            return;
        };

        if !binding.offset.set_by_script {
            if let Some(position) = self.document.scroll_position(binding.container) {
                tracing::trace!(from = binding.offset.x, to = position.left, "resync offset");
                binding.offset.x = position.left;
            }
        }
        binding.offset.set_by_script = false;
        state.is_handling_scroll_event = true;
        drop(state);

        let weak = Arc::downgrade(self);
        self.scheduler.queue_micro_task(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.state().is_handling_scroll_event = false;
            }
        }));
    }
}

impl Drop for ScrollerInner {
    fn drop(&mut self) {
        let binding = self.state().binding.take();
        if let Some(binding) = binding {
            self.release(binding);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hscroll_animation::Easing;
    use hscroll_core::dom::{ElementSpec, ElementTree};
    use hscroll_core::events::WheelData;
    use hscroll_core::task::TaskQueue;

    #[derive(Default)]
    struct RecordingAnimator {
        calls: Mutex<Vec<(ElementId, f32, AnimateTo)>>,
    }

    impl Animator for RecordingAnimator {
        fn animate_property(&self, target: ElementId, duration_secs: f32, to: AnimateTo) {
            self.calls.lock().unwrap().push((target, duration_secs, to));
        }
    }

    struct Fixture {
        tree: Arc<ElementTree>,
        events: Arc<EventDispatcher>,
        tasks: Arc<TaskQueue>,
        animator: Arc<RecordingAnimator>,
        scroller: HorizontalScroller,
        strip: ElementId,
    }

    impl Fixture {
        fn new() -> Self {
            let tree = Arc::new(ElementTree::new(800.0, 600.0));
            let strip = tree.create_element(
                tree.root(),
                ElementSpec::new(0.0, 0.0, 800.0, 600.0).content(2000.0, 600.0),
            );
            let events = Arc::new(EventDispatcher::new());
            let tasks = Arc::new(TaskQueue::new());
            let animator = Arc::new(RecordingAnimator::default());
            let scroller = HorizontalScroller::new(
                tree.clone(),
                events.clone(),
                tasks.clone(),
                animator.clone(),
                ScrollerConfig::default(),
            );
            Self {
                tree,
                events,
                tasks,
                animator,
                scroller,
                strip,
            }
        }

        fn animation_targets(&self) -> Vec<f32> {
            self.animator
                .calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, _, to)| to.value)
                .collect()
        }
    }

    #[test]
    fn test_unbound_scroll_is_an_error() {
        let f = Fixture::new();
        assert_eq!(f.scroller.scroll_to(10.0, false), Err(ScrollError::NoContainer));
        assert_eq!(f.scroller.scroll_offset(10.0, false), Err(ScrollError::NoContainer));
        assert_eq!(f.scroller.offset(), None);
    }

    #[test]
    fn test_bind_unknown_element() {
        let f = Fixture::new();
        let gone = f.tree.create_element(f.tree.root(), ElementSpec::new(0.0, 0.0, 1.0, 1.0));
        f.tree.remove_element(gone);
        assert_eq!(f.scroller.bind(gone), Err(ScrollError::UnknownElement(gone)));
        assert!(!f.scroller.is_bound());
    }

    #[test]
    fn test_bind_scrolls_to_end_on_next_task() {
        let f = Fixture::new();
        f.scroller.bind(f.strip).unwrap();
        assert_eq!(f.scroller.offset(), Some(Offset::new(0.0, 0.0)));
        assert_eq!(f.tasks.pending_tasks(), 1);

        f.tasks.run_until_idle();
        let offset = f.scroller.offset().unwrap();
        assert_eq!(offset.x, 1200.0);
        assert!(offset.set_by_script);

        let calls = f.animator.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        let (target, duration, to) = calls[0];
        assert_eq!(target, f.strip);
        assert_eq!(duration, 0.3);
        assert_eq!(to, AnimateTo::scroll_left(1200.0, Easing::PowerOut(2)));
    }

    #[test]
    fn test_equal_target_does_not_animate() {
        let f = Fixture::new();
        f.scroller.bind(f.strip).unwrap();
        f.tasks.run_until_idle();

        f.scroller.scroll_to(1200.0, false).unwrap();
        f.scroller.scroll_to(5000.0, false).unwrap();
        f.tasks.run_until_idle();
        assert_eq!(f.animation_targets(), vec![1200.0]);
    }

    #[test]
    fn test_scroll_offset_moves_towards_zero() {
        let f = Fixture::new();
        f.scroller.bind(f.strip).unwrap();
        f.tasks.run_until_idle();

        f.scroller.scroll_offset(200.0, false).unwrap();
        assert_eq!(f.scroller.offset().unwrap().x, 1000.0);
        f.scroller.scroll_offset(-5000.0, false).unwrap();
        assert_eq!(f.scroller.offset().unwrap().x, 1200.0);
        // Unchecked moves may leave the valid range
        f.scroller.scroll_offset(-100.0, true).unwrap();
        assert_eq!(f.scroller.offset().unwrap().x, 1300.0);
    }

    #[test]
    fn test_animation_reads_offset_when_it_runs() {
        let f = Fixture::new();
        f.scroller.bind(f.strip).unwrap();
        f.tasks.run_until_idle();

        f.scroller.scroll_to(500.0, false).unwrap();
        f.scroller.update_offset_x(25.0);
        f.tasks.flush_micro_tasks();
        assert_eq!(f.animation_targets(), vec![1200.0, 525.0]);
    }

    #[test]
    fn test_update_offset_x_is_unclamped() {
        let f = Fixture::new();
        f.scroller.update_offset_x(10.0);
        assert_eq!(f.scroller.offset(), None);

        f.scroller.bind(f.strip).unwrap();
        f.scroller.update_offset_x(-40.0);
        assert_eq!(f.scroller.offset().unwrap().x, -40.0);
        assert_eq!(f.tasks.pending_micro_tasks(), 0);
    }

    #[test]
    fn test_rebind_drops_pending_initial_jump() {
        let f = Fixture::new();
        let other = f.tree.create_element(
            f.tree.root(),
            ElementSpec::new(0.0, 0.0, 800.0, 600.0).content(900.0, 600.0),
        );
        f.scroller.bind(f.strip).unwrap();
        f.scroller.bind(other).unwrap();
        f.tasks.run_until_idle();

        let calls = f.animator.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, other);
        assert_eq!(calls[0].2.value, 100.0);
    }

    #[test]
    fn test_unbind_removes_listeners() {
        let f = Fixture::new();
        f.scroller.bind(f.strip).unwrap();
        assert_eq!(f.events.listener_count(event_types::WHEEL), 1);
        assert_eq!(f.events.listener_count(event_types::SCROLL), 1);

        f.scroller.unbind();
        f.scroller.unbind();
        assert_eq!(f.events.listener_count(event_types::WHEEL), 0);
        assert_eq!(f.events.listener_count(event_types::SCROLL), 0);
        assert!(!f.scroller.is_bound());

        // The queued jump finds nothing to do
        f.tasks.run_until_idle();
        assert!(f.animation_targets().is_empty());
    }

    #[test]
    fn test_dropping_the_scroller_removes_listeners() {
        let f = Fixture::new();
        f.scroller.bind(f.strip).unwrap();
        let Fixture {
            events, scroller, ..
        } = f;
        drop(scroller);
        assert_eq!(events.listener_count(event_types::WHEEL), 0);
        assert_eq!(events.listener_count(event_types::SCROLL), 0);
    }

    #[test]
    fn test_wheel_over_container_is_consumed() {
        let f = Fixture::new();
        f.scroller.bind(f.strip).unwrap();
        f.tasks.run_until_idle();

        let mut event = Event::wheel(
            Some(f.strip),
            WheelData::at(100.0, 100.0).with_wheel_delta(120.0),
        );
        f.events.dispatch(&mut event);
        assert!(event.default_prevented);
        assert!(event.propagation_stopped);
        // +120 legacy units normalize to +600: five notches back towards the start
        assert_eq!(f.scroller.offset().unwrap().x, 1150.0);
        assert_eq!(f.scroller.cached_direction(), Some(ScrollDir::Horizontal));
    }

    #[test]
    fn test_scroll_event_guard_clears_on_microtask() {
        let f = Fixture::new();
        f.scroller.bind(f.strip).unwrap();

        f.events.dispatch(&mut Event::scroll(f.strip, 0.0, 0.0));
        assert!(f.scroller.is_handling_scroll_event());
        f.tasks.flush_micro_tasks();
        assert!(!f.scroller.is_handling_scroll_event());
    }
}
