//! Animation scheduler
//!
//! Owns every tween in flight and writes their values into the document
//! each frame.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hscroll_core::dom::{Document, ElementId};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::easing::Easing;
use crate::tween::PropertyTween;

new_key_type! {
    pub struct TweenId;
}

/// Element properties that can be tweened
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimatedProperty {
    ScrollLeft,
    ScrollTop,
}

impl AnimatedProperty {
    fn read(self, document: &dyn Document, target: ElementId) -> Option<f32> {
        let position = document.scroll_position(target)?;
        Some(match self {
            AnimatedProperty::ScrollLeft => position.left,
            AnimatedProperty::ScrollTop => position.top,
        })
    }

    fn write(self, document: &dyn Document, target: ElementId, value: f32) {
        let Some(mut position) = document.scroll_position(target) else {
            return;
        };
        match self {
            AnimatedProperty::ScrollLeft => position.left = value,
            AnimatedProperty::ScrollTop => position.top = value,
        }
        document.set_scroll_position(target, position);
    }
}

/// Final value and curve for an animation request
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimateTo {
    pub property: AnimatedProperty,
    pub value: f32,
    pub easing: Easing,
}

impl AnimateTo {
    pub fn scroll_left(value: f32, easing: Easing) -> Self {
        Self {
            property: AnimatedProperty::ScrollLeft,
            value,
            easing,
        }
    }
}

/// Smoothly moves a numeric element property to a final value
pub trait Animator: Send + Sync {
    /// Start animating `to.property` of `target` towards `to.value` over
    /// `duration_secs`. Fire-and-forget: a later request for the same
    /// property replaces this one.
    fn animate_property(&self, target: ElementId, duration_secs: f32, to: AnimateTo);
}

struct ActiveTween {
    target: ElementId,
    property: AnimatedProperty,
    tween: PropertyTween,
}

#[derive(Default)]
struct SchedulerState {
    tweens: SlotMap<TweenId, ActiveTween>,
    by_property: FxHashMap<(ElementId, AnimatedProperty), TweenId>,
}

/// The animation scheduler that ticks all active tweens
pub struct AnimationScheduler {
    document: Arc<dyn Document>,
    state: Mutex<SchedulerState>,
}

impl AnimationScheduler {
    pub fn new(document: Arc<dyn Document>) -> Self {
        Self {
            document,
            state: Mutex::new(SchedulerState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a tween, replacing any tween already driving the same property.
    /// The new tween starts from the property's current value.
    pub fn start(&self, target: ElementId, duration_secs: f32, to: AnimateTo) -> Option<TweenId> {
        let from = to.property.read(&*self.document, target)?;
        let tween = PropertyTween::new(from, to.value, duration_secs, to.easing);

        let mut state = self.state();
        if let Some(previous) = state.by_property.remove(&(target, to.property)) {
            state.tweens.remove(previous);
            tracing::trace!(?target, property = ?to.property, "replaced tween in flight");
        }
        let id = state.tweens.insert(ActiveTween {
            target,
            property: to.property,
            tween,
        });
        state.by_property.insert((target, to.property), id);
        Some(id)
    }

    /// Advance all tweens by `dt` seconds and write their values.
    /// Returns true while any tween is still running.
    pub fn tick(&self, dt: f32) -> bool {
        let mut writes = Vec::new();
        let running = {
            let mut state = self.state();
            let mut finished = Vec::new();
            for (id, active) in state.tweens.iter_mut() {
                let value = active.tween.tick(dt);
                writes.push((active.target, active.property, value));
                if active.tween.is_finished() {
                    finished.push(id);
                }
            }
            for id in finished {
                if let Some(active) = state.tweens.remove(id) {
                    state.by_property.remove(&(active.target, active.property));
                }
            }
            !state.tweens.is_empty()
        };

        // Lock released: document writes may be observed by other callers
        for (target, property, value) in writes {
            property.write(&*self.document, target, value);
        }
        running
    }

    /// Check if any tweens are still active
    pub fn has_active_animations(&self) -> bool {
        !self.state().tweens.is_empty()
    }

    pub fn tween_count(&self) -> usize {
        self.state().tweens.len()
    }

    /// Final value of the tween driving `property` on `target`, if any
    pub fn target_value(&self, target: ElementId, property: AnimatedProperty) -> Option<f32> {
        let state = self.state();
        let id = state.by_property.get(&(target, property))?;
        state.tweens.get(*id).map(|active| active.tween.to())
    }
}

impl Animator for AnimationScheduler {
    fn animate_property(&self, target: ElementId, duration_secs: f32, to: AnimateTo) {
        if self.start(target, duration_secs, to).is_none() {
            tracing::warn!(?target, "animation target is not in the document");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hscroll_core::dom::{ElementSpec, ElementTree};

    fn strip() -> (Arc<ElementTree>, ElementId, AnimationScheduler) {
        let tree = Arc::new(ElementTree::new(800.0, 600.0));
        let strip = tree.create_element(
            tree.root(),
            ElementSpec::new(0.0, 0.0, 800.0, 600.0).content(3000.0, 600.0),
        );
        let scheduler = AnimationScheduler::new(Arc::clone(&tree) as Arc<dyn Document>);
        (tree, strip, scheduler)
    }

    fn left(tree: &ElementTree, id: ElementId) -> f32 {
        tree.scroll_position(id).map(|p| p.left).unwrap_or_default()
    }

    #[test]
    fn test_tween_drives_scroll_left() {
        let (tree, strip, scheduler) = strip();
        scheduler.animate_property(strip, 0.3, AnimateTo::scroll_left(600.0, Easing::power2_out()));
        assert!(scheduler.has_active_animations());

        scheduler.tick(0.1);
        let midway = left(&tree, strip);
        assert!(midway > 0.0 && midway < 600.0);

        while scheduler.tick(1.0 / 60.0) {}
        assert_eq!(left(&tree, strip), 600.0);
        assert!(!scheduler.has_active_animations());
    }

    #[test]
    fn test_new_request_replaces_tween_in_flight() {
        let (tree, strip, scheduler) = strip();
        scheduler.animate_property(strip, 0.3, AnimateTo::scroll_left(1000.0, Easing::Linear));
        scheduler.tick(0.15);
        let halfway = left(&tree, strip);
        assert!((halfway - 500.0).abs() < 1.0);

        scheduler.animate_property(strip, 0.3, AnimateTo::scroll_left(200.0, Easing::Linear));
        assert_eq!(scheduler.tween_count(), 1);
        assert_eq!(
            scheduler.target_value(strip, AnimatedProperty::ScrollLeft),
            Some(200.0)
        );

        while scheduler.tick(0.05) {}
        assert_eq!(left(&tree, strip), 200.0);
    }

    #[test]
    fn test_unknown_target_is_ignored() {
        let (tree, strip, scheduler) = strip();
        tree.remove_element(strip);
        assert!(scheduler
            .start(strip, 0.3, AnimateTo::scroll_left(100.0, Easing::Linear))
            .is_none());
        assert!(!scheduler.has_active_animations());
    }
}
