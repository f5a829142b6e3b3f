//! Scroller error types

use hscroll_core::ElementId;
use thiserror::Error;

/// Scroller errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollError {
    /// Scroll bounds were requested without a container (not bound, or the
    /// container left the document)
    #[error("No scroll container: the scroller is not bound")]
    NoContainer,

    /// The element handed to `bind` is not part of the document
    #[error("Element {0:?} is not in the document")]
    UnknownElement(ElementId),
}

/// Result type for scroller operations
pub type Result<T> = std::result::Result<T, ScrollError>;
