//! Pure grid math: block spans, the "now" offset, centering, and the
//! visibility rules tied to the scroll axes.
//!
//! Everything here takes offsets and widths in cells; the grid maps one
//! cell per horizontal pixel of the time axis. No clock reads — callers
//! pass minutes in, so the math is testable at fixed times.

use grilla_core::timeutil::parse_hms;

/// Horizontal density of the time axis.
pub const CELLS_PER_MINUTE: u32 = 2;
pub const HOUR_WIDTH: u32 = 60 * CELLS_PER_MINUTE;
/// Full width of one day on the time axis.
pub const DAY_WIDTH: u32 = 24 * HOUR_WIDTH;

/// Vertical rows scrolled before the banner collapses. Collapse is
/// binary: past the threshold the banner is gone, back at or under it
/// the banner re-expands.
pub const BANNER_COLLAPSE_ROWS: usize = 0;

/// Horizontal placement of one program block on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    pub left: u32,
    pub width: u32,
}

/// Duration in minutes, wrapping past midnight when the end reads
/// earlier than the start. `None` when either time is malformed.
pub fn duration_minutes(start_time: &str, end_time: &str) -> Option<u32> {
    let start = parse_hms(start_time)?;
    let mut end = parse_hms(end_time)?;
    if end < start {
        end += 24 * 60;
    }
    Some(end - start)
}

/// Block placement for a schedule. Width takes a 1-cell deduction for
/// visual separation, floored at 1. Malformed times yield a zero-width
/// span instead of an error so a bad row never takes the grid down.
pub fn block_span(start_time: &str, end_time: &str, cells_per_minute: u32) -> BlockSpan {
    let left = parse_hms(start_time).map_or(0, |m| m * cells_per_minute);
    let width = match duration_minutes(start_time, end_time) {
        Some(dur) => (dur * cells_per_minute).saturating_sub(1).max(1),
        None => 0,
    };
    BlockSpan { left, width }
}

/// Whether a block lies entirely before "now" (for the dimmed tier).
/// Malformed times are never marked past.
pub fn block_is_past(start_time: &str, end_time: &str, now_minutes: u32) -> bool {
    let Some(start) = parse_hms(start_time) else {
        return false;
    };
    let Some(mut end) = parse_hms(end_time) else {
        return false;
    };
    if end < start {
        end += 24 * 60;
    }
    end < now_minutes
}

/// Horizontal offset of the now line.
pub fn now_offset(now_minutes: u32, cells_per_minute: u32) -> u32 {
    now_minutes * cells_per_minute
}

/// Scroll offset that centers `now_offset` in a viewport of
/// `visible_width` cells, clamped at the left edge.
pub fn centered_offset(now_offset: u32, visible_width: u32) -> u32 {
    now_offset.saturating_sub(visible_width / 2)
}

/// The jump-to-now affordance shows once the viewport has drifted more
/// than half a screen away from the centered position.
pub fn jump_affordance_visible(scroll_x: u32, now_offset: u32, visible_width: u32) -> bool {
    let ideal = centered_offset(now_offset, visible_width);
    scroll_x.abs_diff(ideal) > visible_width / 2
}

pub fn banner_collapsed(scroll_y: usize, threshold_rows: usize) -> bool {
    scroll_y > threshold_rows
}

/// Largest horizontal offset that still shows a full viewport.
pub fn max_scroll_x(visible_width: u32) -> u32 {
    DAY_WIDTH.saturating_sub(visible_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_wraps_midnight() {
        assert_eq!(duration_minutes("23:30:00", "00:30:00"), Some(60));
        assert_eq!(duration_minutes("10:00:00", "12:00:00"), Some(120));
        assert_eq!(duration_minutes("10:00:00", "10:00:00"), Some(0));
    }

    #[test]
    fn test_block_span_geometry() {
        let span = block_span("10:00:00", "12:00:00", 2);
        assert_eq!(span.left, 10 * 60 * 2);
        assert_eq!(span.width, 120 * 2 - 1);
    }

    #[test]
    fn test_block_span_width_floor() {
        // Zero-length program still gets a visible sliver
        let span = block_span("10:00:00", "10:00:00", 2);
        assert_eq!(span.width, 1);
    }

    #[test]
    fn test_block_span_malformed_times() {
        assert_eq!(block_span("bogus", "12:00:00", 2).width, 0);
        assert_eq!(block_span("10:00:00", "", 2).width, 0);
        let span = block_span("", "", 2);
        assert_eq!(span, BlockSpan { left: 0, width: 0 });
    }

    #[test]
    fn test_now_offset_at_1405() {
        assert_eq!(now_offset(14 * 60 + 5, 2), 1690);
    }

    #[test]
    fn test_centered_offset_clamps_left() {
        assert_eq!(centered_offset(10, 400), 0);
        assert_eq!(centered_offset(1690, 400), 1490);
    }

    #[test]
    fn test_jump_affordance_visibility() {
        let now = 1690;
        let w = 400;
        let ideal = centered_offset(now, w); // 1490
        assert!(!jump_affordance_visible(ideal, now, w));
        assert!(!jump_affordance_visible(ideal + w / 2, now, w));
        assert!(jump_affordance_visible(ideal + w / 2 + 1, now, w));
        assert!(jump_affordance_visible(0, now, w));
    }

    #[test]
    fn test_block_is_past() {
        assert!(block_is_past("08:00:00", "09:00:00", 10 * 60));
        assert!(!block_is_past("08:00:00", "11:00:00", 10 * 60));
        // Crosses midnight: still running at 00:10
        assert!(!block_is_past("23:30:00", "00:30:00", 23 * 60 + 45));
        assert!(!block_is_past("bad", "worse", 600));
    }

    #[test]
    fn test_banner_collapse_threshold() {
        assert!(!banner_collapsed(0, 0));
        assert!(banner_collapsed(1, 0));
        assert!(!banner_collapsed(3, 3));
        assert!(banner_collapsed(4, 3));
    }
}
