//! Segment filtering by service type and time constraint.

use crate::domain::{Segment, TimeSpec, TrainType};

/// Half-width of the approximate-time window, minutes.
const APPROX_WINDOW_MINS: i64 = 30;

/// How many minutes before an exact requested time a departure may still
/// be, matching the original grace behavior. There is no upper bound:
/// later departures are always acceptable.
const EXACT_EARLY_GRACE_MINS: i64 = 30;

/// Filter raw segments by requested type and time constraint.
///
/// Pure function. Drops entries whose normalized type differs from the
/// request, applies the time rule for `time`, and returns the survivors
/// stably sorted ascending by departure clock.
///
/// Entries with a malformed (missing) departure clock are kept when no
/// time comparison is required, and dropped only when one is: a single bad
/// field should not stripe out an unconstrained result set. Such entries
/// sort after all timed ones.
pub fn filter_segments(
    segments: Vec<Segment>,
    train_type: TrainType,
    time: &TimeSpec,
) -> Vec<Segment> {
    let mut kept: Vec<Segment> = segments
        .into_iter()
        .filter(|seg| seg.train_type == train_type && matches_time(seg, time))
        .collect();

    kept.sort_by_key(|seg| seg.departure.map(|t| t.minute_of_day()).unwrap_or(i64::MAX));
    kept
}

/// Whether a segment satisfies the active time rule.
pub fn matches_time(segment: &Segment, time: &TimeSpec) -> bool {
    let Some(departure) = segment.departure else {
        // Comparison only required when a constraint is active.
        return !time.is_constrained();
    };

    match time {
        TimeSpec::Unconstrained => true,
        TimeSpec::Daypart(daypart) => daypart.contains(departure),
        TimeSpec::Around(anchor) => departure.abs_diff_minutes(*anchor) <= APPROX_WINDOW_MINS,
        TimeSpec::Exact(requested) => {
            departure.signed_diff_minutes(*requested) >= -EXACT_EARLY_GRACE_MINS
        }
    }
}
