/// Minimum plausible average time spent per question, in seconds.
pub const SECONDS_PER_QUESTION: u32 = 3;

pub const FAST_COMPLETION_REASON: &str = "Suspiciously fast completion";

/// Advisory outcome attached to a persisted response. Never blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnomalyFlag {
    pub flagged: bool,
    pub reason: Option<String>,
}

/// Flag a response completed faster than `SECONDS_PER_QUESTION` per question.
///
/// A missing or zero duration, or a survey without questions, is never
/// flagged.
pub fn flag_response(duration: Option<u32>, question_count: usize) -> AnomalyFlag {
    let Some(duration) = duration.filter(|d| *d > 0) else {
        return AnomalyFlag::default();
    };
    if question_count == 0 {
        return AnomalyFlag::default();
    }

    let floor = u64::from(SECONDS_PER_QUESTION) * question_count as u64;
    if u64::from(duration) < floor {
        AnomalyFlag {
            flagged: true,
            reason: Some(FAST_COMPLETION_REASON.to_string()),
        }
    } else {
        AnomalyFlag::default()
    }
}
