use std::collections::{HashMap, HashSet};

use jiff::Timestamp;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use statwox_auth::password::verify_password;
use statwox_core::models::answer::{AnswerInput, NewAnswer};
use statwox_core::models::question::Question;
use statwox_core::models::survey::{Survey, SurveyStatus};
use statwox_core::skip_logic::compute_visible_questions;

use crate::error::SubmissionError;
use crate::ip::ip_allowed;

/// Request context needed to admit a submission.
#[derive(Debug, Clone, Copy)]
pub struct Admission<'a> {
    pub now: Timestamp,
    pub client_ip: &'a str,
    pub password: Option<&'a str>,
}

/// Survey-level gates, evaluated in order: published, not closed, quota,
/// access password, IP allowlist.
pub fn check_admission(survey: &Survey, admission: &Admission<'_>) -> Result<(), SubmissionError> {
    if survey.status != SurveyStatus::Published {
        return Err(SubmissionError::NotPublished);
    }

    if survey.is_closed_at(admission.now) {
        return Err(SubmissionError::Closed);
    }

    if survey.quota_reached() {
        return Err(SubmissionError::QuotaReached);
    }

    if let Some(hash) = &survey.password_hash {
        let submitted = admission.password.unwrap_or_default();
        let matches = verify_password(submitted, hash).unwrap_or_else(|e| {
            warn!(survey_id = %survey.id, error = %e, "stored survey password hash is unusable");
            false
        });
        if !matches {
            return Err(SubmissionError::IncorrectPassword);
        }
    }

    if !ip_allowed(&survey.ip_allowlist, admission.client_ip) {
        return Err(SubmissionError::IpDenied);
    }

    Ok(())
}

/// Anonymous submissions are only accepted when the survey allows them.
pub fn check_identity(survey: &Survey, respondent_id: Option<Uuid>) -> Result<(), SubmissionError> {
    if respondent_id.is_none() && !survey.allow_anon {
        return Err(SubmissionError::AuthenticationRequired);
    }
    Ok(())
}

/// Validate the answer set against the survey's questions.
///
/// Every answer must reference a question of this survey by its exact
/// hyphenated lowercase ID; other spellings of the same UUID are unknown.
/// Required
/// questions must be answered only when they remain visible after skip
/// logic runs over the submitted answers; a required question the
/// respondent was skipped past cannot block submission. An empty set is
/// reported as a missing required answer when one applies, and as
/// `EmptyAnswers` otherwise.
pub fn check_answers(
    questions: &[Question],
    answers: &[AnswerInput],
) -> Result<Vec<NewAnswer>, SubmissionError> {
    let known: HashMap<String, Uuid> = questions.iter().map(|q| (q.id.to_string(), q.id)).collect();

    let mut accepted = Vec::with_capacity(answers.len());
    for answer in answers {
        let question_id = *known
            .get(&answer.question_id)
            .ok_or_else(|| SubmissionError::UnknownQuestion(answer.question_id.clone()))?;

        accepted.push(NewAnswer {
            question_id,
            value: answer.value_text(),
            file_url: answer.file_url.clone(),
            signature_url: answer.signature_url.clone(),
        });
    }

    let answer_map: HashMap<Uuid, Value> = accepted
        .iter()
        .map(|a| (a.question_id, Value::String(a.value.clone())))
        .collect();
    let visible: HashSet<Uuid> = compute_visible_questions(questions, &answer_map)
        .into_iter()
        .collect();

    let mut required: Vec<&Question> = questions
        .iter()
        .filter(|q| q.required && visible.contains(&q.id))
        .collect();
    required.sort_by_key(|q| q.order);

    if let Some(missing) = required.iter().find(|q| !answer_map.contains_key(&q.id)) {
        return Err(SubmissionError::MissingRequired(missing.id));
    }

    if accepted.is_empty() {
        return Err(SubmissionError::EmptyAnswers);
    }

    Ok(accepted)
}
