use std::collections::BTreeMap;

use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};

use statwox_core::models::response::ResponseRecord;

pub const DEFAULT_TIMELINE_DAYS: i64 = 30;

/// Wider windows are clamped; they already cover every representable date.
const MAX_TIMELINE_DAYS: i64 = 10_000 * 366;

/// Responses per UTC calendar day (`YYYY-MM-DD`), counting only responses
/// started at or after `now - days`.
pub fn responses_timeline(
    responses: &[ResponseRecord],
    now: Timestamp,
    days: i64,
) -> BTreeMap<String, u32> {
    let window = SignedDuration::from_hours(days.clamp(-MAX_TIMELINE_DAYS, MAX_TIMELINE_DAYS) * 24);
    let start = now.checked_sub(window).ok();

    let mut timeline = BTreeMap::new();
    for record in responses {
        let started_at = record.response.started_at;
        if start.is_some_and(|start| started_at < start) {
            continue;
        }
        let day = started_at.to_zoned(TimeZone::UTC).date().to_string();
        *timeline.entry(day).or_insert(0) += 1;
    }
    timeline
}
