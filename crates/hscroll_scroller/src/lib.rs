//! Horizontal scroll controller
//!
//! Turns vertical wheel input over a container into horizontal scrolling of
//! that container, while leaving wheel input over nested vertically
//! scrollable elements alone.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use hscroll_animation::AnimationScheduler;
//! use hscroll_core::dom::{Document, ElementSpec, ElementTree};
//! use hscroll_core::{EventDispatcher, TaskQueue};
//! use hscroll_scroller::{HorizontalScroller, ScrollerConfig};
//!
//! let document = Arc::new(ElementTree::new(800.0, 600.0));
//! let strip = document.create_element(
//!     document.root(),
//!     ElementSpec::new(0.0, 0.0, 800.0, 600.0).content(2400.0, 600.0),
//! );
//! let tasks = Arc::new(TaskQueue::new());
//! let animations = Arc::new(AnimationScheduler::new(document.clone()));
//!
//! let scroller = HorizontalScroller::new(
//!     document.clone(),
//!     Arc::new(EventDispatcher::new()),
//!     tasks.clone(),
//!     animations.clone(),
//!     ScrollerConfig::default(),
//! );
//!
//! scroller.bind(strip).unwrap();
//! // The initial "scroll to end" runs on the next macrotask
//! tasks.run_until_idle();
//! assert_eq!(scroller.offset().map(|o| o.x), Some(1600.0));
//! ```

pub mod config;
pub mod direction;
pub mod error;
pub mod offset;
pub mod scroller;
pub mod wheel;

pub use config::ScrollerConfig;
pub use direction::{determine_scroll_direction, DirectionCache, ScrollDir};
pub use error::{Result, ScrollError};
pub use offset::{calculate_new_offset, Offset, OffsetRequest};
pub use scroller::HorizontalScroller;
pub use wheel::wheel_delta;
