//! hscroll Animation System
//!
//! Fixed-duration property tweens driven by the host's frame loop.
//!
//! # Features
//!
//! - **Easing**: power curves (in/out/in-out) and CSS-style cubic beziers
//! - **Tweens**: a numeric property interpolated over a fixed duration
//! - **Last-writer-wins**: a new request for a property replaces the tween in flight

pub mod easing;
pub mod scheduler;
pub mod tween;

pub use easing::Easing;
pub use scheduler::{AnimateTo, AnimatedProperty, AnimationScheduler, Animator, TweenId};
pub use tween::PropertyTween;
