//! Demo page: a router view that grows one panel per routed level
//!
//! Every level of the route hierarchy renders a panel next to its parent's.
//! Navigating a router replaces everything below it, so navigating the
//! leaf router appends panels. Closing a panel navigates the router that
//! rendered it to `""`, which closes that panel and every panel to its
//! right. Each "slow" panel holds a header and a vertically scrolling list,
//! which is exactly the layout the horizontal scroller has to
//! disambiguate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hscroll_core::dom::{Document, ElementId, ElementSpec, ElementTree, Overflow};
use hscroll_core::task::Scheduler;
use hscroll_scroller::HorizontalScroller;

use crate::config::{DemoConfig, ShellConfig};
use crate::headless::HeadlessHost;
use crate::navigation::{NavigationError, NavigationEvents, NavigationInstruction, Router};
use crate::shell::AppShell;

/// Routes every level can navigate to
pub const ROUTES: [&str; 2] = ["home", "slow"];

/// Elements of one routed panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Panel {
    pub route: &'static str,
    pub element: ElementId,
    pub header: ElementId,
    /// Vertically scrolling list; "home" panels have none
    pub list: Option<ElementId>,
}

struct PageInner {
    tree: Arc<ElementTree>,
    scheduler: Arc<dyn Scheduler>,
    events: NavigationEvents,
    config: DemoConfig,
    router_view: ElementId,
    panels: Mutex<Vec<Panel>>,
}

/// The routed demo page
///
/// Cloning yields another handle to the same page.
#[derive(Clone)]
pub struct DemoPage {
    inner: Arc<PageInner>,
}

impl DemoPage {
    /// Build the router view under the document root. It fills the
    /// viewport and scrolls horizontally only.
    pub fn new(
        tree: Arc<ElementTree>,
        scheduler: Arc<dyn Scheduler>,
        events: NavigationEvents,
        config: DemoConfig,
    ) -> Self {
        let router_view = tree.create_element(
            tree.root(),
            ElementSpec::new(0.0, 0.0, config.viewport_width, config.viewport_height)
                .overflow_x(Overflow::Auto)
                .overflow_y(Overflow::Hidden),
        );
        Self {
            inner: Arc::new(PageInner {
                tree,
                scheduler,
                events,
                config,
                router_view,
                panels: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn router_view(&self) -> ElementId {
        self.inner.router_view
    }

    pub fn panels(&self) -> Vec<Panel> {
        self.inner.panels().clone()
    }

    pub fn panel_count(&self) -> usize {
        self.inner.panels().len()
    }

    /// Router of the top level
    pub fn root_router(&self) -> Arc<dyn Router> {
        Arc::new(PanelRouter {
            page: self.inner.clone(),
            depth: 0,
        })
    }

    /// Router owned by the panel at `index`, the one its child routes
    /// render through
    pub fn panel_router(&self, index: usize) -> Option<Arc<dyn Router>> {
        (index < self.panel_count()).then(|| {
            Arc::new(PanelRouter {
                page: self.inner.clone(),
                depth: index + 1,
            }) as Arc<dyn Router>
        })
    }

    /// Close the panel at `index` along with every panel to its right
    pub fn close(&self, index: usize) -> Result<(), NavigationError> {
        let parent = self
            .panel_router(index)
            .and_then(|router| router.parent())
            .ok_or(NavigationError::NoPanel(index))?;
        parent.navigate("")
    }
}

impl PageInner {
    fn panels(&self) -> MutexGuard<'_, Vec<Panel>> {
        self.panels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn build_panel(&self, index: usize, route: &'static str) -> Panel {
        let c = &self.config;
        let element = self.tree.create_element(
            self.router_view,
            ElementSpec::new(
                index as f32 * c.panel_width,
                0.0,
                c.panel_width,
                c.viewport_height,
            ),
        );
        let header = self.tree.create_element(
            element,
            ElementSpec::new(0.0, 0.0, c.panel_width, c.header_height),
        );
        let list = (route == "slow").then(|| {
            let height = (c.viewport_height - c.header_height).max(0.0);
            self.tree.create_element(
                element,
                ElementSpec::new(0.0, c.header_height, c.panel_width, height)
                    .content(c.panel_width, c.list_items as f32 * c.item_height)
                    .overflow_y(Overflow::Auto),
            )
        });
        Panel {
            route,
            element,
            header,
            list,
        }
    }

    /// Replace every panel below `depth` with the routes in `fragment`
    fn navigate(&self, depth: usize, fragment: &str) -> Result<(), NavigationError> {
        let routes = fragment
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                ROUTES
                    .iter()
                    .copied()
                    .find(|route| *route == segment)
                    .ok_or_else(|| NavigationError::UnknownRoute(segment.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let count = {
            let mut panels = self.panels();
            let keep = depth.min(panels.len());
            for removed in panels.drain(keep..) {
                self.tree.remove_element(removed.element);
            }
            for route in routes {
                let panel = self.build_panel(panels.len(), route);
                panels.push(panel);
            }
            panels.len()
        };

        let c = &self.config;
        self.tree.set_content_size(
            self.router_view,
            count as f32 * c.panel_width,
            c.viewport_height,
        );
        tracing::debug!(fragment, depth, panels = count, "navigated");

        // Route activation finishes on a later turn
        let events = self.events.clone();
        let instruction = NavigationInstruction {
            fragment: fragment.to_string(),
            depth: count,
        };
        self.scheduler
            .queue_task(Box::new(move || events.publish(&instruction)));
        Ok(())
    }
}

/// Router for one level of the demo page
struct PanelRouter {
    page: Arc<PageInner>,
    depth: usize,
}

impl Router for PanelRouter {
    fn navigate(&self, fragment: &str) -> Result<(), NavigationError> {
        self.page.navigate(self.depth, fragment)
    }

    fn navigate_to_route(&self, route: &str) -> Result<(), NavigationError> {
        if !ROUTES.contains(&route) {
            return Err(NavigationError::UnknownRoute(route.to_string()));
        }
        self.page.navigate(self.depth, route)
    }

    fn child_router(&self) -> Option<Arc<dyn Router>> {
        if self.page.panels().len() > self.depth {
            Some(Arc::new(PanelRouter {
                page: self.page.clone(),
                depth: self.depth + 1,
            }))
        } else {
            None
        }
    }

    fn parent(&self) -> Option<Arc<dyn Router>> {
        let depth = self.depth.checked_sub(1)?;
        Some(Arc::new(PanelRouter {
            page: self.page.clone(),
            depth,
        }))
    }
}

/// Everything the demo needs, wired together on a headless host
pub struct DemoApp {
    pub host: HeadlessHost,
    pub events: NavigationEvents,
    pub page: DemoPage,
    pub shell: AppShell,
}

impl DemoApp {
    pub fn new(config: &ShellConfig) -> Self {
        let demo = &config.demo;
        let host = HeadlessHost::new(demo.viewport_width, demo.viewport_height, demo.frame_rate);
        let events = NavigationEvents::new();
        let page = DemoPage::new(
            host.tree().clone(),
            host.tasks().clone(),
            events.clone(),
            demo.clone(),
        );
        let scroller = HorizontalScroller::new(
            host.tree().clone(),
            host.events().clone(),
            host.tasks().clone(),
            host.animations().clone(),
            config.scroller,
        );
        let shell = AppShell::new(scroller, page.root_router(), events.clone(), page.router_view())
            .with_open_count(demo.open_count);
        Self {
            host,
            events,
            page,
            shell,
        }
    }

    /// Horizontal scroll position of the router view
    pub fn scroll_left(&self) -> f32 {
        self.host
            .tree()
            .scroll_position(self.page.router_view())
            .map(|p| p.left)
            .unwrap_or_default()
    }
}
