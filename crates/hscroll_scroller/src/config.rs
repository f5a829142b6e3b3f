//! Scroller tunables

use hscroll_animation::Easing;
use serde::{Deserialize, Serialize};

/// Configuration for wheel translation, direction detection and animation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollerConfig {
    /// Pointer movement (px, either axis) before the scroll direction under
    /// the pointer is re-evaluated
    pub direction_hysteresis: f32,
    /// Slack (px) allowed between scroll height and client height before an
    /// element counts as vertically overflowing
    pub overflow_threshold: f32,
    /// Raw wheel units per notch
    pub wheel_tick: f32,
    /// Offset change (px) per notch
    pub wheel_step: f32,
    /// Multiplier for the legacy `detail` wheel field
    pub detail_factor: f32,
    /// Multiplier for the legacy `wheelDelta` wheel field
    pub wheel_delta_factor: f32,
    /// Duration of an animated scroll transition, in seconds
    pub animation_duration: f32,
    pub easing: Easing,
    /// Target of the "scroll to end" jump after binding; clamped to the real maximum
    pub initial_offset: f32,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            direction_hysteresis: 12.0,
            overflow_threshold: 6.0,
            wheel_tick: 120.0,
            wheel_step: 10.0,
            detail_factor: -240.0,
            wheel_delta_factor: 5.0,
            animation_duration: 0.3,
            easing: Easing::power2_out(),
            initial_offset: 100_000.0,
        }
    }
}

impl ScrollerConfig {
    /// Convert a raw wheel delta into an offset change
    pub fn offset_change_from_wheel(&self, wheel_delta: f32) -> f32 {
        if self.wheel_tick == 0.0 {
            return 0.0;
        }
        wheel_delta / self.wheel_tick * self.wheel_step
    }
}
