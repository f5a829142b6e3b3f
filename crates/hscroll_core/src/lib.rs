//! hscroll Core Runtime
//!
//! The host primitives the horizontal scroller runs against:
//!
//! - **Document**: elements with scroll position, box metrics and effective overflow
//! - **Event Dispatch**: global capture/bubble listeners for wheel and scroll input
//! - **Task Queue**: microtask and macrotask scheduling on a single event loop
//!
//! # Example
//!
//! ```rust
//! use hscroll_core::dom::{Document, ElementSpec, ElementTree, ScrollPosition};
//!
//! let tree = ElementTree::new(800.0, 600.0);
//! let strip = tree.create_element(tree.root(), ElementSpec::new(0.0, 0.0, 800.0, 600.0).content(2400.0, 600.0));
//!
//! tree.set_scroll_position(strip, ScrollPosition::new(5000.0, 0.0));
//! assert_eq!(tree.scroll_position(strip).map(|p| p.left), Some(1600.0));
//! ```

pub mod dom;
pub mod events;
pub mod task;

pub use dom::{
    BoxMetrics, Document, EffectiveOverflow, ElementId, ElementSpec, ElementTree, Overflow,
    ScrollPosition,
};
pub use events::{Event, EventData, EventDispatcher, EventType, ListenerId, Phase, WheelData};
pub use task::{Scheduler, Task, TaskQueue};
