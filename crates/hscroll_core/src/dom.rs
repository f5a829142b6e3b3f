//! Element document
//!
//! The [`Document`] trait is everything the scroller needs to know about the
//! page: which element sits under the pointer, the ancestor chain, box
//! metrics, effective overflow and scroll position. [`ElementTree`] is the
//! in-memory implementation used by the headless host and by tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Unique identifier for an element in a document
    pub struct ElementId;
}

/// Overflow behavior of one axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
    Auto,
}

/// Resolved overflow for both axes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EffectiveOverflow {
    pub x: Overflow,
    pub y: Overflow,
}

/// Overflow as authored: the shorthand plus optional per-axis overrides
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct OverflowStyle {
    pub overflow: Overflow,
    pub overflow_x: Option<Overflow>,
    pub overflow_y: Option<Overflow>,
}

impl OverflowStyle {
    /// Resolve to the computed per-axis values.
    ///
    /// Axis values fall back to the shorthand. When one axis is not
    /// `Visible`, a `Visible` on the other axis computes to `Auto`.
    pub fn resolve(&self) -> EffectiveOverflow {
        let mut x = self.overflow_x.unwrap_or(self.overflow);
        let mut y = self.overflow_y.unwrap_or(self.overflow);
        if x == Overflow::Visible && y != Overflow::Visible {
            x = Overflow::Auto;
        } else if y == Overflow::Visible && x != Overflow::Visible {
            y = Overflow::Auto;
        }
        EffectiveOverflow { x, y }
    }
}

/// Box metrics of an element, in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxMetrics {
    /// Full content width including the part scrolled out of view
    pub scroll_width: f32,
    /// Full content height including the part scrolled out of view
    pub scroll_height: f32,
    /// Visible (padding box) width
    pub client_width: f32,
    /// Visible (padding box) height
    pub client_height: f32,
    /// Layout width including borders and scrollbar
    pub offset_width: f32,
    /// Layout height including borders and scrollbar
    pub offset_height: f32,
}

impl BoxMetrics {
    /// Metrics of a box whose content exactly fills it
    pub fn fitted(width: f32, height: f32) -> Self {
        Self {
            scroll_width: width,
            scroll_height: height,
            client_width: width,
            client_height: height,
            offset_width: width,
            offset_height: height,
        }
    }

    pub fn max_scroll_left(&self) -> f32 {
        (self.scroll_width - self.client_width).max(0.0)
    }

    pub fn max_scroll_top(&self) -> f32 {
        (self.scroll_height - self.client_height).max(0.0)
    }
}

/// Scroll position of an element
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollPosition {
    pub left: f32,
    pub top: f32,
}

impl ScrollPosition {
    pub fn new(left: f32, top: f32) -> Self {
        Self { left, top }
    }
}

/// A hit rectangle, relative to the parent's content origin
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// What the host knows about the page's elements
pub trait Document: Send + Sync {
    /// Topmost element at a viewport position
    fn element_from_point(&self, x: f32, y: f32) -> Option<ElementId>;

    fn parent(&self, element: ElementId) -> Option<ElementId>;

    fn metrics(&self, element: ElementId) -> Option<BoxMetrics>;

    /// Computed overflow for both axes
    fn overflow(&self, element: ElementId) -> EffectiveOverflow;

    fn scroll_position(&self, element: ElementId) -> Option<ScrollPosition>;

    /// Write a scroll position. Out-of-range values are clamped the way a
    /// browser clamps `scrollLeft`/`scrollTop`.
    fn set_scroll_position(&self, element: ElementId, position: ScrollPosition);
}

/// Construction parameters for an element
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElementSpec {
    pub rect: Rect,
    pub metrics: BoxMetrics,
    pub overflow: OverflowStyle,
}

impl ElementSpec {
    /// A box at `(x, y)` in its parent's content space, content fitting exactly
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            metrics: BoxMetrics::fitted(width, height),
            overflow: OverflowStyle::default(),
        }
    }

    /// Set the content size (never smaller than the visible box)
    pub fn content(mut self, width: f32, height: f32) -> Self {
        self.metrics.scroll_width = width.max(self.metrics.client_width);
        self.metrics.scroll_height = height.max(self.metrics.client_height);
        self
    }

    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.overflow.overflow = overflow;
        self
    }

    pub fn overflow_x(mut self, overflow: Overflow) -> Self {
        self.overflow.overflow_x = Some(overflow);
        self
    }

    pub fn overflow_y(mut self, overflow: Overflow) -> Self {
        self.overflow.overflow_y = Some(overflow);
        self
    }
}

struct ElementNode {
    parent: Option<ElementId>,
    children: SmallVec<[ElementId; 4]>,
    rect: Rect,
    metrics: BoxMetrics,
    overflow: OverflowStyle,
    scroll: ScrollPosition,
}

impl ElementNode {
    fn new(parent: Option<ElementId>, spec: ElementSpec) -> Self {
        Self {
            parent,
            children: SmallVec::new(),
            rect: spec.rect,
            metrics: spec.metrics,
            overflow: spec.overflow,
            scroll: ScrollPosition::default(),
        }
    }

    fn clamp_scroll(&mut self) {
        self.scroll.left = self.scroll.left.clamp(0.0, self.metrics.max_scroll_left());
        self.scroll.top = self.scroll.top.clamp(0.0, self.metrics.max_scroll_top());
    }
}

struct TreeInner {
    nodes: SlotMap<ElementId, ElementNode>,
    root: ElementId,
    /// Elements whose scroll position changed since the last drain
    scrolled: SmallVec<[ElementId; 4]>,
}

impl TreeInner {
    fn mark_scrolled(&mut self, id: ElementId) {
        if !self.scrolled.contains(&id) {
            self.scrolled.push(id);
        }
    }

    /// Deepest element containing the point. `(x, y)` is in the coordinate
    /// space of `id`'s parent content box.
    fn hit(&self, id: ElementId, x: f32, y: f32) -> Option<ElementId> {
        let node = self.nodes.get(id)?;
        if !node.rect.contains(x, y) {
            return None;
        }
        let local_x = x - node.rect.x + node.scroll.left;
        let local_y = y - node.rect.y + node.scroll.top;
        // Later children paint on top
        node.children
            .iter()
            .rev()
            .find_map(|&child| self.hit(child, local_x, local_y))
            .or(Some(id))
    }
}

/// In-memory element tree
///
/// The root element is the viewport itself. Rectangles are relative to the
/// parent's content origin, so scrolling a parent moves its children for
/// hit testing the way it does on screen.
pub struct ElementTree {
    inner: Mutex<TreeInner>,
}

impl ElementTree {
    /// Create a document whose root covers a `width` x `height` viewport
    pub fn new(width: f32, height: f32) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(ElementNode::new(
            None,
            ElementSpec::new(0.0, 0.0, width, height),
        ));
        Self {
            inner: Mutex::new(TreeInner {
                nodes,
                root,
                scrolled: SmallVec::new(),
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, TreeInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn root(&self) -> ElementId {
        self.inner().root
    }

    /// Append a new element as the last child of `parent`
    pub fn create_element(&self, parent: ElementId, spec: ElementSpec) -> ElementId {
        let mut inner = self.inner();
        let id = inner.nodes.insert(ElementNode::new(Some(parent), spec));
        if let Some(parent_node) = inner.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        id
    }

    /// Remove an element and its whole subtree
    pub fn remove_element(&self, id: ElementId) {
        let mut inner = self.inner();
        if id == inner.root {
            return;
        }
        if let Some(parent) = inner.nodes.get(id).and_then(|n| n.parent) {
            if let Some(parent_node) = inner.nodes.get_mut(parent) {
                parent_node.children.retain(|c| *c != id);
            }
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = inner.nodes.remove(next) {
                stack.extend(node.children);
            }
        }
        let TreeInner { nodes, scrolled, .. } = &mut *inner;
        scrolled.retain(|s| nodes.contains_key(*s));
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.inner().nodes.contains_key(id)
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.inner()
            .nodes
            .get(id)
            .map(|n| n.children.to_vec())
            .unwrap_or_default()
    }

    /// Update an element's content size, re-clamping its scroll position
    pub fn set_content_size(&self, id: ElementId, width: f32, height: f32) {
        let mut inner = self.inner();
        let Some(node) = inner.nodes.get_mut(id) else {
            return;
        };
        node.metrics.scroll_width = width.max(node.metrics.client_width);
        node.metrics.scroll_height = height.max(node.metrics.client_height);
        let before = node.scroll;
        node.clamp_scroll();
        if node.scroll != before {
            inner.mark_scrolled(id);
        }
    }

    /// Drain the elements whose scroll position changed, in change order
    pub fn take_scrolled(&self) -> Vec<ElementId> {
        self.inner().scrolled.drain(..).collect()
    }
}

impl Document for ElementTree {
    fn element_from_point(&self, x: f32, y: f32) -> Option<ElementId> {
        let inner = self.inner();
        inner.hit(inner.root, x, y)
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.inner().nodes.get(element).and_then(|n| n.parent)
    }

    fn metrics(&self, element: ElementId) -> Option<BoxMetrics> {
        self.inner().nodes.get(element).map(|n| n.metrics)
    }

    fn overflow(&self, element: ElementId) -> EffectiveOverflow {
        self.inner()
            .nodes
            .get(element)
            .map(|n| n.overflow.resolve())
            .unwrap_or_default()
    }

    fn scroll_position(&self, element: ElementId) -> Option<ScrollPosition> {
        self.inner().nodes.get(element).map(|n| n.scroll)
    }

    fn set_scroll_position(&self, element: ElementId, position: ScrollPosition) {
        let mut inner = self.inner();
        let Some(node) = inner.nodes.get_mut(element) else {
            return;
        };
        let before = node.scroll;
        node.scroll = position;
        node.clamp_scroll();
        if node.scroll != before {
            inner.mark_scrolled(element);
        }
    }
}
