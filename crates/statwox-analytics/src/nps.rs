//! Net Promoter Score over rating questions, read as a 0-10 scale.

use std::collections::BTreeMap;

use serde::Serialize;
use ts_rs::TS;
use uuid::Uuid;

use statwox_core::models::question::{Question, QuestionType};
use statwox_core::models::response::ResponseRecord;
use statwox_core::numeric::{parse_int_prefix, round_half_up};

use crate::rounded_percentage;

pub const PROMOTER_MIN: i64 = 9;
pub const PASSIVE_MIN: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NpsResult {
    pub question_title: String,
    /// Promoter share minus detractor share, in whole percent (-100..=100).
    pub score: i64,
    pub promoters: u32,
    pub passives: u32,
    pub detractors: u32,
    pub total_responses: u32,
    pub promoter_pct: i64,
    pub passive_pct: i64,
    pub detractor_pct: i64,
}

/// NPS for each rating question with at least one integer answer among
/// the complete responses. Other questions are left out of the map.
pub fn nps_by_question(
    questions: &[Question],
    responses: &[ResponseRecord],
) -> BTreeMap<Uuid, NpsResult> {
    questions
        .iter()
        .filter(|q| q.question_type == QuestionType::Rating)
        .filter_map(|q| {
            let scores: Vec<i64> = responses
                .iter()
                .filter(|r| r.response.is_complete)
                .flat_map(|r| &r.answers)
                .filter(|a| a.question_id == q.id)
                .filter_map(|a| parse_int_prefix(&a.value))
                .collect();
            score_nps(&q.title, &scores).map(|result| (q.id, result))
        })
        .collect()
}

/// Classify `scores` and compute the NPS. `None` for an empty slice.
pub fn score_nps(question_title: &str, scores: &[i64]) -> Option<NpsResult> {
    if scores.is_empty() {
        return None;
    }

    let (mut promoters, mut passives, mut detractors) = (0u32, 0u32, 0u32);
    for &score in scores {
        if score >= PROMOTER_MIN {
            promoters += 1;
        } else if score >= PASSIVE_MIN {
            passives += 1;
        } else {
            detractors += 1;
        }
    }

    let total = promoters + passives + detractors;
    let net = f64::from(promoters) - f64::from(detractors);

    Some(NpsResult {
        question_title: question_title.to_string(),
        score: round_half_up(net / f64::from(total) * 100.0) as i64,
        promoters,
        passives,
        detractors,
        total_responses: total,
        promoter_pct: rounded_percentage(promoters, total),
        passive_pct: rounded_percentage(passives, total),
        detractor_pct: rounded_percentage(detractors, total),
    })
}
