//! Scroll offset state and bounds clamping

use hscroll_core::BoxMetrics;

use crate::config::ScrollerConfig;
use crate::error::{Result, ScrollError};

/// The scroller's view of the container's scroll position
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    /// Horizontal offset, kept within `[0, scroll_width - offset_width]`
    pub x: f32,
    /// Vertical offset, tracked but not managed
    pub y: f32,
    /// Set when the scroller itself moved the container; consumed by the
    /// next native scroll event
    pub set_by_script: bool,
}

impl Offset {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            set_by_script: false,
        }
    }
}

/// What a new offset is computed from
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OffsetRequest {
    /// Normalized wheel delta, converted to an offset change first
    WheelDelta(f32),
    /// Relative change; positive values move towards offset 0
    Change(f32),
    /// Absolute target
    Target(f32),
}

/// Largest valid horizontal offset for a container
pub fn max_offset(metrics: &BoxMetrics) -> f32 {
    (metrics.scroll_width - metrics.offset_width).max(0.0)
}

/// Compute a new horizontal offset, clamped to `[0, max_offset]`.
///
/// Relative requests that push against a rail the offset already sits on
/// return that rail unchanged. A missing container is an error.
pub fn calculate_new_offset(
    metrics: Option<&BoxMetrics>,
    current: f32,
    request: OffsetRequest,
    config: &ScrollerConfig,
) -> Result<f32> {
    let metrics = metrics.ok_or(ScrollError::NoContainer)?;

    let min = 0.0_f32;
    let max = max_offset(metrics);

    let change = match request {
        OffsetRequest::Target(target) => return Ok(target.clamp(min, max)),
        OffsetRequest::WheelDelta(delta) => config.offset_change_from_wheel(delta),
        OffsetRequest::Change(change) => change,
    };

    if current == min && change >= 0.0 {
        return Ok(min);
    }
    if current == max && change <= 0.0 {
        return Ok(max);
    }

    Ok((current - change).clamp(min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2000px of content in an 800px box: offsets run from 0 to 1200
    fn metrics() -> BoxMetrics {
        BoxMetrics {
            scroll_width: 2000.0,
            scroll_height: 600.0,
            client_width: 800.0,
            client_height: 600.0,
            offset_width: 800.0,
            offset_height: 600.0,
        }
    }

    fn calc(current: f32, request: OffsetRequest) -> f32 {
        calculate_new_offset(Some(&metrics()), current, request, &ScrollerConfig::default())
            .unwrap()
    }

    #[test]
    fn test_missing_container_is_an_error() {
        let result = calculate_new_offset(
            None,
            0.0,
            OffsetRequest::Target(10.0),
            &ScrollerConfig::default(),
        );
        assert_eq!(result, Err(ScrollError::NoContainer));
    }

    #[test]
    fn test_targets_are_clamped() {
        for target in [-5000.0, -1.0, 0.0, 17.5, 1200.0, 1200.5, 100_000.0] {
            let offset = calc(300.0, OffsetRequest::Target(target));
            assert!((0.0..=1200.0).contains(&offset), "{target} -> {offset}");
        }
        assert_eq!(calc(300.0, OffsetRequest::Target(100_000.0)), 1200.0);
        assert_eq!(calc(300.0, OffsetRequest::Target(-3.0)), 0.0);
        assert_eq!(calc(300.0, OffsetRequest::Target(450.0)), 450.0);
    }

    #[test]
    fn test_change_is_subtracted() {
        assert_eq!(calc(300.0, OffsetRequest::Change(50.0)), 250.0);
        assert_eq!(calc(300.0, OffsetRequest::Change(-50.0)), 350.0);
        assert_eq!(calc(30.0, OffsetRequest::Change(50.0)), 0.0);
        assert_eq!(calc(1190.0, OffsetRequest::Change(-50.0)), 1200.0);
    }

    #[test]
    fn test_wheel_delta_uses_notch_step() {
        // -600 raw = five notches down = 50px further along
        assert_eq!(calc(300.0, OffsetRequest::WheelDelta(-600.0)), 350.0);
        assert_eq!(calc(300.0, OffsetRequest::WheelDelta(720.0)), 240.0);
    }

    #[test]
    fn test_rails_hold() {
        assert_eq!(calc(0.0, OffsetRequest::Change(25.0)), 0.0);
        assert_eq!(calc(0.0, OffsetRequest::Change(0.0)), 0.0);
        assert_eq!(calc(1200.0, OffsetRequest::Change(-25.0)), 1200.0);
        assert_eq!(calc(1200.0, OffsetRequest::WheelDelta(0.0)), 1200.0);

        // Moving off a rail is allowed
        assert_eq!(calc(0.0, OffsetRequest::Change(-25.0)), 25.0);
        assert_eq!(calc(1200.0, OffsetRequest::Change(25.0)), 1175.0);
    }

    #[test]
    fn test_narrow_content_pins_to_zero() {
        let narrow = BoxMetrics {
            scroll_width: 500.0,
            offset_width: 800.0,
            ..metrics()
        };
        let offset = calculate_new_offset(
            Some(&narrow),
            0.0,
            OffsetRequest::Target(300.0),
            &ScrollerConfig::default(),
        )
        .unwrap();
        assert_eq!(offset, 0.0);
    }
}
