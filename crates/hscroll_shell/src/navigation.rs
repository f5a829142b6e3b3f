//! Navigation completion notifications and the router interface
//!
//! The shell only needs two things from routing: a way to ask the deepest
//! active router to navigate, and a notification when a navigation has
//! finished. [`NavigationEvents`] is the observer hub for the latter.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

new_key_type! {
    pub struct SubscriptionId;
}

/// A finished navigation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationInstruction {
    /// Fragment that was navigated to, relative to the navigating router
    pub fragment: String,
    /// Number of routed panels after the navigation
    pub depth: usize,
}

/// Receives navigation completion notifications
pub trait NavigationObserver: Send + Sync {
    fn navigation_complete(&self, instruction: &NavigationInstruction);
}

impl<F> NavigationObserver for F
where
    F: Fn(&NavigationInstruction) + Send + Sync,
{
    fn navigation_complete(&self, instruction: &NavigationInstruction) {
        self(instruction)
    }
}

struct Entry {
    observer: Arc<dyn NavigationObserver>,
    once: bool,
}

type Hub = Mutex<SlotMap<SubscriptionId, Entry>>;

fn lock(hub: &Hub) -> MutexGuard<'_, SlotMap<SubscriptionId, Entry>> {
    hub.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Observer hub for "navigation complete"
///
/// Cloning yields another handle to the same hub.
#[derive(Clone, Default)]
pub struct NavigationEvents {
    hub: Arc<Hub>,
}

/// Handle to a registered observer. The observer stays registered until
/// [`dispose`](Self::dispose) is called.
#[derive(Clone, Debug)]
#[must_use = "an undisposed subscription keeps its observer registered"]
pub struct Subscription {
    hub: Weak<Hub>,
    id: SubscriptionId,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Unregister the observer. Returns false if it was already gone.
    pub fn dispose(&self) -> bool {
        match self.hub.upgrade() {
            Some(hub) => lock(&hub).remove(self.id).is_some(),
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.hub
            .upgrade()
            .is_some_and(|hub| lock(&hub).contains_key(self.id))
    }
}

impl NavigationEvents {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, observer: Arc<dyn NavigationObserver>, once: bool) -> Subscription {
        let id = lock(&self.hub).insert(Entry { observer, once });
        Subscription {
            hub: Arc::downgrade(&self.hub),
            id,
        }
    }

    /// Call `observer` on every completed navigation until disposed
    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: NavigationObserver + 'static,
    {
        self.insert(Arc::new(observer), false)
    }

    /// Call `observer` on the next completed navigation only
    pub fn subscribe_once<O>(&self, observer: O) -> Subscription
    where
        O: NavigationObserver + 'static,
    {
        self.insert(Arc::new(observer), true)
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.hub).len()
    }

    /// Notify every observer, in subscription order.
    ///
    /// One-shot observers are unregistered before any observer runs.
    /// Observers may subscribe or dispose during the publish; an observer
    /// disposed by an earlier one is skipped.
    pub fn publish(&self, instruction: &NavigationInstruction) {
        let pending: Vec<(SubscriptionId, bool, Arc<dyn NavigationObserver>)> = {
            let mut hub = lock(&self.hub);
            let pending: Vec<_> = hub
                .iter()
                .map(|(id, entry)| (id, entry.once, Arc::clone(&entry.observer)))
                .collect();
            for (id, once, _) in &pending {
                if *once {
                    hub.remove(*id);
                }
            }
            pending
        };

        tracing::trace!(
            fragment = %instruction.fragment,
            observers = pending.len(),
            "navigation complete"
        );

        for (id, once, observer) in pending {
            if !once && !lock(&self.hub).contains_key(id) {
                continue;
            }
            observer.navigation_complete(instruction);
        }
    }
}

/// Navigation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("No route named {0:?}")]
    UnknownRoute(String),

    #[error("No open panel at index {0}")]
    NoPanel(usize),
}

/// A router in a hierarchy of nested routers
pub trait Router: Send + Sync {
    /// Navigate to a fragment relative to this router
    fn navigate(&self, fragment: &str) -> Result<(), NavigationError>;

    /// Navigate to a named route relative to this router
    fn navigate_to_route(&self, route: &str) -> Result<(), NavigationError>;

    /// Router of the currently active child route, if it has one
    fn child_router(&self) -> Option<Arc<dyn Router>>;

    /// Router this one is nested in; `None` for the root
    fn parent(&self) -> Option<Arc<dyn Router>>;
}

/// Deepest active router below `router`
pub fn leaf_router(router: Arc<dyn Router>) -> Arc<dyn Router> {
    let mut current = router;
    while let Some(child) = current.child_router() {
        current = child;
    }
    current
}
