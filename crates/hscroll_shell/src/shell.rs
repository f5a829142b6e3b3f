//! Application shell
//!
//! Wires the horizontal scroller to the router view and opens routed
//! panels in bulk, scrolling to the newest one once navigation settles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hscroll_core::dom::ElementId;
use hscroll_scroller::{HorizontalScroller, ScrollError};

use crate::navigation::{
    leaf_router, NavigationError, NavigationEvents, NavigationInstruction, Router, Subscription,
};

/// Route opened by the bulk open commands
pub const SLOW_ROUTE: &str = "slow";

/// Panels opened by [`AppShell::open_all_at_once`] and
/// [`AppShell::open_one_by_one`] unless configured otherwise
pub const DEFAULT_OPEN_COUNT: usize = 10;

pub struct AppShell {
    scroller: HorizontalScroller,
    router: Arc<dyn Router>,
    events: NavigationEvents,
    router_view: ElementId,
    open_count: usize,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl AppShell {
    pub fn new(
        scroller: HorizontalScroller,
        router: Arc<dyn Router>,
        events: NavigationEvents,
        router_view: ElementId,
    ) -> Self {
        Self {
            scroller,
            router,
            events,
            router_view,
            open_count: DEFAULT_OPEN_COUNT,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_open_count(mut self, count: usize) -> Self {
        self.open_count = count;
        self
    }

    pub fn scroller(&self) -> &HorizontalScroller {
        &self.scroller
    }

    pub fn router_view(&self) -> ElementId {
        self.router_view
    }

    /// Subscriptions still waiting for a navigation to complete
    pub fn pending_subscriptions(&self) -> usize {
        let mut subscriptions = lock(&self.subscriptions);
        subscriptions.retain(Subscription::is_active);
        subscriptions.len()
    }

    fn track(&self, subscription: &Subscription) {
        let mut subscriptions = lock(&self.subscriptions);
        subscriptions.retain(Subscription::is_active);
        subscriptions.push(subscription.clone());
    }

    /// The shell's view is in the document: start scrolling the router view
    pub fn attached(&self) -> Result<(), ScrollError> {
        self.scroller.bind(self.router_view)
    }

    /// The shell's view left the document
    pub fn detached(&self) {
        self.scroller.unbind();
        for subscription in lock(&self.subscriptions).drain(..) {
            subscription.dispose();
        }
    }

    /// Open all panels with a single navigation of the leaf router, then
    /// scroll to the end once it completes
    pub fn open_all_at_once(&self) -> Result<(), NavigationError> {
        let scroller = self.scroller.clone();
        let subscription = self
            .events
            .subscribe_once(move |_: &NavigationInstruction| scroll_to_end(&scroller));
        self.track(&subscription);

        let fragment = format!("{SLOW_ROUTE}/").repeat(self.open_count);
        let result = leaf_router(self.router.clone()).navigate(&fragment);
        if result.is_err() {
            subscription.dispose();
        }
        result
    }

    /// Open panels one navigation at a time, each from the leaf router once
    /// the previous navigation completes, then scroll to the end
    pub fn open_one_by_one(&self) -> Result<(), NavigationError> {
        if self.open_count == 0 {
            scroll_to_end(&self.scroller);
            return Ok(());
        }

        let remaining = Arc::new(AtomicUsize::new(self.open_count));
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let scroller = self.scroller.clone();
        let router = self.router.clone();
        let own = slot.clone();
        let subscription = self
            .events
            .subscribe(move |_: &NavigationInstruction| {
                if remaining.fetch_sub(1, Ordering::SeqCst) > 1 {
                    let Err(err) = leaf_router(router.clone()).navigate_to_route(SLOW_ROUTE) else {
                        return;
                    };
                    tracing::warn!(%err, "opening next panel failed");
                    if let Some(subscription) = lock(&own).take() {
                        subscription.dispose();
                    }
                    return;
                }
                if let Some(subscription) = lock(&own).take() {
                    subscription.dispose();
                }
                scroll_to_end(&scroller);
            });
        *lock(&slot) = Some(subscription.clone());
        self.track(&subscription);

        let result = leaf_router(self.router.clone()).navigate_to_route(SLOW_ROUTE);
        if result.is_err() {
            subscription.dispose();
        }
        result
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn scroll_to_end(scroller: &HorizontalScroller) {
    let end = scroller.config().initial_offset;
    if let Err(err) = scroller.scroll_to(end, false) {
        tracing::warn!(%err, "scroll to newest panel failed");
    }
}
