use std::collections::BTreeMap;

use serde::Serialize;
use ts_rs::TS;
use uuid::Uuid;

use statwox_core::models::response::ResponseRecord;

/// Joint answer frequencies for two questions: `matrix[a][b]` counts the
/// complete responses that answered `a` to `question_a` and `b` to
/// `question_b`. Absent pairs are absent keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CrossTab {
    pub question_a: Uuid,
    pub question_b: Uuid,
    pub matrix: BTreeMap<String, BTreeMap<String, u32>>,
}

/// Responses that are partial, or that left either question unanswered
/// or blank, are skipped.
pub fn cross_tabulate(responses: &[ResponseRecord], question_a: Uuid, question_b: Uuid) -> CrossTab {
    let mut matrix: BTreeMap<String, BTreeMap<String, u32>> = BTreeMap::new();

    for record in responses.iter().filter(|r| r.response.is_complete) {
        let answer = |id| {
            record
                .answer_for(id)
                .map(|a| a.value.as_str())
                .filter(|v| !v.is_empty())
        };
        let (Some(a), Some(b)) = (answer(question_a), answer(question_b)) else {
            continue;
        };

        *matrix
            .entry(a.to_string())
            .or_default()
            .entry(b.to_string())
            .or_insert(0) += 1;
    }

    CrossTab {
        question_a,
        question_b,
        matrix,
    }
}
