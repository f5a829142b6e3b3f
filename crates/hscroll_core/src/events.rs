//! Event dispatch system
//!
//! A single global listener registry, the way a page's `window` receives
//! every wheel and scroll notification. Listeners are identified by a
//! [`ListenerId`] handed out at registration, so whoever registered a
//! listener can remove exactly that one again.

use std::sync::{Arc, Mutex, PoisonError};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::dom::ElementId;

/// Event type identifier
pub type EventType = u32;

/// Common event types
pub mod event_types {
    use super::EventType;

    /// Native scroll notification (an element's scroll position changed)
    pub const SCROLL: EventType = 30;
    /// Mouse wheel / trackpad input
    pub const WHEEL: EventType = 33;
}

new_key_type! {
    /// Handle for a registered listener
    pub struct ListenerId;
}

/// Which dispatch pass a listener runs in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    /// Runs before any bubble listener, ahead of nested elements
    Capture,
    #[default]
    Bubble,
}

/// Wheel payload.
///
/// `detail` and `wheel_delta` are the legacy magnitude fields (line count
/// and 120-per-notch units). `delta_x`/`delta_y` carry the modern pixel
/// deltas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelData {
    pub client_x: f32,
    pub client_y: f32,
    pub detail: Option<f32>,
    pub wheel_delta: Option<f32>,
    pub delta_x: f32,
    pub delta_y: f32,
}

impl WheelData {
    /// Wheel event at a pointer position with no delta fields set
    pub fn at(client_x: f32, client_y: f32) -> Self {
        Self {
            client_x,
            client_y,
            ..Default::default()
        }
    }

    pub fn with_detail(mut self, detail: f32) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_wheel_delta(mut self, wheel_delta: f32) -> Self {
        self.wheel_delta = Some(wheel_delta);
        self
    }

    pub fn with_delta(mut self, delta_x: f32, delta_y: f32) -> Self {
        self.delta_x = delta_x;
        self.delta_y = delta_y;
        self
    }
}

/// Event-specific data
#[derive(Clone, Debug, PartialEq)]
pub enum EventData {
    Wheel(WheelData),
    Scroll { left: f32, top: f32 },
    None,
}

/// An input event with associated data
#[derive(Clone, Debug)]
pub struct Event {
    pub event_type: EventType,
    pub target: Option<ElementId>,
    pub data: EventData,
    pub propagation_stopped: bool,
    pub default_prevented: bool,
}

impl Event {
    pub fn new(event_type: EventType, target: Option<ElementId>, data: EventData) -> Self {
        Self {
            event_type,
            target,
            data,
            propagation_stopped: false,
            default_prevented: false,
        }
    }

    pub fn wheel(target: Option<ElementId>, data: WheelData) -> Self {
        Self::new(event_types::WHEEL, target, EventData::Wheel(data))
    }

    pub fn scroll(target: ElementId, left: f32, top: f32) -> Self {
        Self::new(
            event_types::SCROLL,
            Some(target),
            EventData::Scroll { left, top },
        )
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Suppress the host's default action (e.g. native page scrolling)
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// Event handler function type
pub type EventHandler = Arc<dyn Fn(&mut Event) + Send + Sync>;

struct Listener {
    event_type: EventType,
    phase: Phase,
    /// Registration order, used to keep dispatch order stable across slot reuse
    seq: u64,
    handler: EventHandler,
}

#[derive(Default)]
struct Registry {
    listeners: SlotMap<ListenerId, Listener>,
    next_seq: u64,
}

/// Dispatches events to registered global listeners
///
/// Capture listeners run before bubble listeners; within a phase,
/// listeners run in registration order. The registry lock is never held
/// while a handler runs, so handlers may register or remove listeners
/// (including themselves) mid-dispatch.
pub struct EventDispatcher {
    registry: Mutex<Registry>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
        }
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener for an event type in the given phase
    pub fn add_listener<F>(&self, event_type: EventType, phase: Phase, handler: F) -> ListenerId
    where
        F: Fn(&mut Event) + Send + Sync + 'static,
    {
        let mut registry = self.registry();
        let seq = registry.next_seq;
        registry.next_seq += 1;
        registry.listeners.insert(Listener {
            event_type,
            phase,
            seq,
            handler: Arc::new(handler),
        })
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.registry().listeners.remove(id).is_some()
    }

    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.registry().listeners.contains_key(id)
    }

    /// Number of listeners currently registered for an event type
    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.registry()
            .listeners
            .values()
            .filter(|l| l.event_type == event_type)
            .count()
    }

    /// Dispatch an event to all matching listeners
    pub fn dispatch(&self, event: &mut Event) {
        let mut pending: SmallVec<[(Phase, u64, ListenerId, EventHandler); 4]> = self
            .registry()
            .listeners
            .iter()
            .filter(|(_, l)| l.event_type == event.event_type)
            .map(|(id, l)| (l.phase, l.seq, id, Arc::clone(&l.handler)))
            .collect();
        pending.sort_by_key(|(phase, seq, _, _)| (*phase != Phase::Capture, *seq));

        for (_, _, id, handler) in pending {
            if event.propagation_stopped {
                break;
            }
            // Listeners removed by an earlier handler in this dispatch are skipped
            if !self.is_registered(id) {
                continue;
            }
            handler(event);
        }

        tracing::trace!(
            event_type = event.event_type,
            default_prevented = event.default_prevented,
            "dispatched"
        );
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_capture_runs_before_bubble() {
        let dispatcher = EventDispatcher::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let o = Arc::clone(&order);
        dispatcher.add_listener(event_types::WHEEL, Phase::Bubble, move |_| {
            o.lock().unwrap().push("bubble");
        });
        let o = Arc::clone(&order);
        dispatcher.add_listener(event_types::WHEEL, Phase::Capture, move |_| {
            o.lock().unwrap().push("capture");
        });

        dispatcher.dispatch(&mut Event::wheel(None, WheelData::at(0.0, 0.0)));
        assert_eq!(*order.lock().unwrap(), vec!["capture", "bubble"]);
    }

    #[test]
    fn test_stop_propagation_skips_later_listeners() {
        let dispatcher = EventDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));

        dispatcher.add_listener(event_types::WHEEL, Phase::Capture, |e| {
            e.stop_propagation();
            e.prevent_default();
        });
        let h = Arc::clone(&hits);
        dispatcher.add_listener(event_types::WHEEL, Phase::Bubble, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        let mut event = Event::wheel(None, WheelData::at(0.0, 0.0));
        dispatcher.dispatch(&mut event);
        assert!(event.default_prevented);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_only_matching_type_is_called() {
        let dispatcher = EventDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        dispatcher.add_listener(event_types::SCROLL, Phase::Capture, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher.dispatch(&mut Event::wheel(None, WheelData::at(0.0, 0.0)));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(dispatcher.listener_count(event_types::SCROLL), 1);
        assert_eq!(dispatcher.listener_count(event_types::WHEEL), 0);
    }

    #[test]
    fn test_remove_listener() {
        let dispatcher = EventDispatcher::new();
        let id = dispatcher.add_listener(event_types::SCROLL, Phase::Capture, |_| {});
        assert!(dispatcher.remove_listener(id));
        assert!(!dispatcher.remove_listener(id));
        assert_eq!(dispatcher.listener_count(event_types::SCROLL), 0);
    }

    #[test]
    fn test_listener_removed_mid_dispatch_is_skipped() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let victim = Arc::new(Mutex::new(None::<ListenerId>));

        let d = Arc::clone(&dispatcher);
        let v = Arc::clone(&victim);
        dispatcher.add_listener(event_types::SCROLL, Phase::Capture, move |_| {
            if let Some(id) = *v.lock().unwrap() {
                d.remove_listener(id);
            }
        });
        let h = Arc::clone(&hits);
        let id = dispatcher.add_listener(event_types::SCROLL, Phase::Bubble, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        *victim.lock().unwrap() = Some(id);

        dispatcher.dispatch(&mut Event::new(event_types::SCROLL, None, EventData::None));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(dispatcher.listener_count(event_types::SCROLL), 1);
    }
}
