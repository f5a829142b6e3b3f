//! hscroll application shell
//!
//! Hosts the horizontal scroller in a routed page: the [`AppShell`] binds
//! the scroller to the router view and opens panels in bulk, the
//! [`HeadlessHost`] plays the browser event loop, and the demo page
//! provides nested routers with vertically scrolling panels.

pub mod config;
pub mod demo;
pub mod headless;
pub mod navigation;
pub mod shell;

pub use config::{DemoConfig, ShellConfig};
pub use demo::{DemoApp, DemoPage, Panel};
pub use headless::HeadlessHost;
pub use navigation::{
    leaf_router, NavigationError, NavigationEvents, NavigationInstruction, NavigationObserver,
    Router, Subscription, SubscriptionId,
};
pub use shell::AppShell;
