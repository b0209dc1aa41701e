//! statwox-analytics
//!
//! Read-only aggregations over a materialized survey snapshot. Pure
//! functions, recomputed per request. Every aggregation tolerates an empty
//! response set: fields with nothing to report are omitted, never zeroed
//! into misleading values and never turned into errors.
//!
//! Ownership checks happen before a snapshot is built; nothing here knows
//! who is asking.

pub mod breakdown;
pub mod crosstab;
pub mod funnel;
pub mod nps;
pub mod overview;
pub mod timeline;

use statwox_core::models::question::Question;
use statwox_core::models::response::ResponseRecord;
use statwox_core::models::survey::Survey;

/// A survey with its questions and a bounded window of its responses.
///
/// Callers load `questions` in ascending `order` and `responses` newest
/// first; text samples in [`breakdown`] rely on the latter.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub survey: Survey,
    pub questions: Vec<Question>,
    pub responses: Vec<ResponseRecord>,
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub(crate) fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(whole) * 100.0
    }
}

/// [`percentage`] rounded half up to a whole number.
pub(crate) fn rounded_percentage(part: u32, whole: u32) -> i64 {
    statwox_core::numeric::round_half_up(percentage(part, whole)) as i64
}
