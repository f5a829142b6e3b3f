//! Scroll direction disambiguation
//!
//! A wheel gesture over the container scrolls it horizontally, unless the
//! pointer is over a nested element that needs the wheel for its own
//! vertical scrolling.

use hscroll_core::dom::{Document, ElementId, Overflow};

/// Who a wheel gesture belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDir {
    /// The scroller redirects the gesture into horizontal scrolling
    Horizontal,
    /// A nested element scrolls vertically; the gesture is left alone
    Vertical,
}

/// Per-gesture memo of the resolved direction
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DirectionCache {
    pointer: Option<(f32, f32)>,
    scroll_dir: Option<ScrollDir>,
}

impl DirectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn scroll_dir(&self) -> Option<ScrollDir> {
        self.scroll_dir
    }

    pub fn pointer(&self) -> Option<(f32, f32)> {
        self.pointer
    }

    /// Return the cached direction, or run `compute` when nothing is cached
    /// or the pointer moved more than `hysteresis` on either axis since the
    /// last computation.
    pub fn resolve<F>(&mut self, x: f32, y: f32, hysteresis: f32, compute: F) -> ScrollDir
    where
        F: FnOnce() -> ScrollDir,
    {
        if let (Some((last_x, last_y)), Some(dir)) = (self.pointer, self.scroll_dir) {
            if (x - last_x).abs() <= hysteresis && (y - last_y).abs() <= hysteresis {
                return dir;
            }
        }

        let dir = compute();
        self.pointer = Some((x, y));
        self.scroll_dir = Some(dir);
        dir
    }
}

/// Whether `element` overflows vertically in a way the wheel should scroll
pub fn has_vertical_overflow(document: &dyn Document, element: ElementId, threshold: f32) -> bool {
    let Some(metrics) = document.metrics(element) else {
        return false;
    };
    metrics.scroll_height - threshold > metrics.client_height
        && matches!(
            document.overflow(element).y,
            Overflow::Visible | Overflow::Auto
        )
}

/// Walk up from the element under the pointer to `container` (inclusive)
/// and report [`ScrollDir::Vertical`] at the first element with vertical
/// overflow.
///
/// The document root is never tested: it is the page scroller, not a
/// nested one. With nothing under the pointer the gesture is left alone.
pub fn determine_scroll_direction(
    document: &dyn Document,
    container: ElementId,
    x: f32,
    y: f32,
    overflow_threshold: f32,
) -> ScrollDir {
    let Some(mut current) = document.element_from_point(x, y) else {
        return ScrollDir::Vertical;
    };

    loop {
        let parent = document.parent(current);
        let is_container = current == container;
        if parent.is_none() && !is_container {
            break;
        }
        if has_vertical_overflow(document, current, overflow_threshold) {
            tracing::trace!(element = ?current, "vertical overflow under pointer");
            return ScrollDir::Vertical;
        }
        match parent {
            Some(next) if !is_container => current = next,
            _ => break,
        }
    }

    ScrollDir::Horizontal
}
