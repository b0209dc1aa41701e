//! Page-by-page drop-off.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use ts_rs::TS;
use uuid::Uuid;

use statwox_core::models::question::Question;
use statwox_core::models::response::ResponseRecord;

use crate::rounded_percentage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Funnel {
    pub funnel: Vec<FunnelStep>,
    pub total_started: u32,
    pub total_completed: u32,
    pub overall_completion_rate: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FunnelStep {
    pub page: u32,
    pub started: u32,
    pub completed: u32,
    /// Share of all started responses that never reached this step.
    pub drop_off_rate: i64,
}

/// One step per distinct page in ascending order, then a final submission
/// step numbered one past the highest page.
///
/// A response reaches a page when it answered at least one question on
/// it, and reaches the submission step when it is complete. Every
/// loaded response counts as started.
pub fn build_funnel(questions: &[Question], responses: &[ResponseRecord]) -> Funnel {
    let total_started = count(responses.len());
    let pages: BTreeSet<u32> = questions.iter().map(|q| q.page).collect();

    let mut funnel: Vec<FunnelStep> = pages
        .iter()
        .map(|&page| {
            let on_page: HashSet<Uuid> = questions
                .iter()
                .filter(|q| q.page == page)
                .map(|q| q.id)
                .collect();
            let reached = count(
                responses
                    .iter()
                    .filter(|r| r.answers.iter().any(|a| on_page.contains(&a.question_id)))
                    .count(),
            );
            step(page, reached, total_started)
        })
        .collect();

    let total_completed = count(responses.iter().filter(|r| r.response.is_complete).count());
    let submission_page = pages.last().map_or(1, |last| last.saturating_add(1));
    funnel.push(step(submission_page, total_completed, total_started));

    Funnel {
        funnel,
        total_started,
        total_completed,
        overall_completion_rate: rounded_percentage(total_completed, total_started),
    }
}

fn step(page: u32, reached: u32, total_started: u32) -> FunnelStep {
    FunnelStep {
        page,
        started: reached,
        completed: reached,
        drop_off_rate: rounded_percentage(total_started - reached, total_started),
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
