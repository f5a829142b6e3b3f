//! Wheel delta normalization

use hscroll_core::WheelData;

use crate::config::ScrollerConfig;

/// Raw wheel delta from the legacy magnitude fields.
///
/// `detail` wins over `wheel_delta`; a zero field counts as absent. Events
/// carrying only the modern pixel deltas yield 0, so they never move the
/// container horizontally.
pub fn wheel_delta(wheel: &WheelData, config: &ScrollerConfig) -> f32 {
    match (wheel.detail, wheel.wheel_delta) {
        (Some(detail), _) if detail != 0.0 => detail * config.detail_factor,
        (_, Some(wheel_delta)) if wheel_delta != 0.0 => wheel_delta * config.wheel_delta_factor,
        _ => 0.0,
    }
}
