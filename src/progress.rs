//! Read-only projections over playback state for display collaborators.
//!
//! Nothing here is stored; every value is recomputed from the controller state and the
//! current segment on demand, and none of it feeds back into the controller.

use serde::Serialize;

use crate::playback::PlaybackState;
use crate::segments::Segment;

/// Remaining time (seconds) below which a segment is `Critical`.
pub const CRITICAL_SECONDS: f64 = 5.0;

/// Fraction of the duration below which remaining time is a `Warning`.
pub const WARNING_FRACTION: f64 = 1.0 / 3.0;

/// Advisory urgency classification of the remaining time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Threshold {
    Normal,
    Warning,
    Critical,
}

/// Everything a renderer needs to draw a progress bar and countdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressReport {
    pub ratio: f64,
    pub threshold: Threshold,
    pub remaining_secs: f64,
}

/// Stateless helper computing [`ProgressReport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressReporter;

impl ProgressReporter {
    pub fn report(state: &PlaybackState, segment: &Segment) -> ProgressReport {
        let duration = segment.duration_secs();
        ProgressReport {
            ratio: progress_ratio(state.remaining_time(), duration),
            threshold: threshold(state.remaining_time(), duration),
            remaining_secs: state.remaining_time(),
        }
    }
}

/// Fraction of `duration` already elapsed, clamped to `[0, 1]`.
///
/// A zero duration counts as fully elapsed.
pub fn progress_ratio(remaining: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return 1.0;
    }
    ((duration - remaining) / duration).clamp(0.0, 1.0)
}

pub fn threshold(remaining: f64, duration: f64) -> Threshold {
    if remaining < CRITICAL_SECONDS {
        Threshold::Critical
    } else if remaining < duration * WARNING_FRACTION {
        Threshold::Warning
    } else {
        Threshold::Normal
    }
}

/// Countdown text in `MM:SS`, rounding partial seconds up so `0:00` only shows at zero.
pub fn format_clock(remaining: f64) -> String {
    let total = if remaining.is_finite() && remaining > 0.0 {
        remaining.ceil() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_spans_zero_to_one() {
        assert_eq!(progress_ratio(30.0, 30.0), 0.0);
        assert!((progress_ratio(15.0, 30.0) - 0.5).abs() < 1e-9);
        assert_eq!(progress_ratio(0.0, 30.0), 1.0);
    }

    #[test]
    fn ratio_is_clamped_and_zero_duration_is_complete() {
        assert_eq!(progress_ratio(40.0, 30.0), 0.0);
        assert_eq!(progress_ratio(0.0, 0.0), 1.0);
    }

    #[test]
    fn thresholds() {
        assert_eq!(threshold(60.0, 60.0), Threshold::Normal);
        assert_eq!(threshold(19.9, 60.0), Threshold::Warning);
        assert_eq!(threshold(20.0, 60.0), Threshold::Normal);
        assert_eq!(threshold(4.9, 60.0), Threshold::Critical);
        // Short segments go straight from normal to critical.
        assert_eq!(threshold(5.0, 9.0), Threshold::Normal);
        assert_eq!(threshold(2.9, 9.0), Threshold::Critical);
    }

    #[test]
    fn clock_rounds_up() {
        assert_eq!(format_clock(90.0), "01:30");
        assert_eq!(format_clock(0.2), "00:01");
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(-3.0), "00:00");
    }
}
