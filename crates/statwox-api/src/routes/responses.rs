//! Response submission: the admission pipeline in front of storage.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use axum::Json;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use statwox_audit::events::{AuditAction, AuditEvent, EntityType};
use statwox_core::models::answer::AnswerInput;
use statwox_core::models::response::ResponseMetadata;
use statwox_storage::error::StorageError;
use statwox_storage::responses::{self, NewResponse};
use statwox_storage::{questions, surveys};
use statwox_submission::anomaly::flag_response;
use statwox_submission::error::SubmissionError;
use statwox_submission::ip::client_ip;
use statwox_submission::validate::{Admission, check_admission, check_answers, check_identity};

use crate::audit_trail;
use crate::envelope::{Envelope, ok_with_message};
use crate::error::ApiError;
use crate::extract::{JsonBody, SurveyId};
use crate::middleware::auth::MaybeUser;
use crate::notify::survey_channel;
use crate::routes::{blocking, header_str};
use crate::state::AppState;
use crate::webhook::{WebhookEvent, WebhookPayload};

const UNKNOWN_USER_AGENT: &str = "unknown";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub metadata: Option<ClientMetadata>,
}

/// Context reported by the responding client.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetadata {
    /// Seconds spent on the survey. Fractions are dropped.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub geolocation: Option<Value>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

impl ClientMetadata {
    /// Whole seconds, or `None` when missing, zero or not a number.
    fn duration_secs(&self) -> Option<u32> {
        self.duration
            .filter(|d| d.is_finite() && *d >= 1.0)
            .map(|d| d.min(f64::from(u32::MAX)) as u32)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub response_id: Uuid,
    pub flagged: bool,
}

/// Accept a response to a published survey.
///
/// Checks run in a fixed order and stop at the first failure: survey
/// exists, admission (status, close time, quota, password, IP allowlist),
/// identity, duplicate, answers. The response, its answers and the
/// response counter are then written in one transaction; storage re-checks
/// the quota and the one-complete-response rule there. Webhook,
/// notification and audit run after commit and never fail the request.
pub async fn submit_response(
    State(state): State<AppState>,
    SurveyId(survey_id): SurveyId,
    MaybeUser(user): MaybeUser,
    headers: HeaderMap,
    JsonBody(body): JsonBody<SubmitRequest>,
) -> Result<Json<Envelope<SubmitReceipt>>, ApiError> {
    let survey = surveys::get(&state.pool, survey_id)
        .await?
        .ok_or_else(ApiError::survey_not_found)?;
    let questions = questions::list(&state.pool, survey_id).await?;

    let ip = client_ip(
        header_str(&headers, "x-forwarded-for"),
        header_str(&headers, "x-real-ip"),
    );
    let now = Timestamp::now();

    {
        let survey = survey.clone();
        let ip = ip.clone();
        let password = body.password.clone();
        blocking(move || {
            check_admission(
                &survey,
                &Admission {
                    now,
                    client_ip: &ip,
                    password: password.as_deref(),
                },
            )
        })
        .await??;
    }

    let respondent_id = user.map(|u| u.id);
    check_identity(&survey, respondent_id)?;

    if let Some(respondent_id) = respondent_id
        && responses::has_completed(&state.pool, survey_id, respondent_id).await?
    {
        return Err(SubmissionError::Duplicate.into());
    }

    let answers = check_answers(&questions, &body.answers)?;

    let metadata = body.metadata.unwrap_or_default();
    let duration = metadata.duration_secs();
    let flag = flag_response(duration, questions.len());

    let new_response = NewResponse {
        survey_id,
        respondent_id,
        started_at: now,
        completed_at: now,
        ip_address: Some(ip.clone()),
        user_agent: Some(
            header_str(&headers, USER_AGENT.as_str())
                .unwrap_or(UNKNOWN_USER_AGENT)
                .to_string(),
        ),
        duration,
        flagged: flag.flagged,
        flag_reason: flag.reason,
        metadata: ResponseMetadata {
            geolocation: metadata.geolocation,
            device_type: metadata.device_type,
            locale: metadata.locale,
        },
        answers,
    };

    let response = responses::submit(&state.pool, &new_response)
        .await
        .map_err(|e| match e {
            StorageError::Duplicate(_) => ApiError::from(SubmissionError::Duplicate),
            other => ApiError::from(other),
        })?;

    info!(
        survey_id = %survey_id,
        response_id = %response.id,
        flagged = response.flagged,
        anonymous = respondent_id.is_none(),
        "response submitted"
    );

    state.notifier.publish(
        &survey_channel(survey_id),
        "new-response",
        &json!({ "responseId": response.id, "flagged": response.flagged }),
    );

    if let Some(url) = &survey.webhook_url {
        state.webhooks.dispatch(
            url.clone(),
            survey.webhook_secret.clone(),
            WebhookPayload::new(
                WebhookEvent::ResponseCreated,
                survey_id,
                json!({
                    "responseId": response.id,
                    "answers": body.answers,
                    "respondentId": respondent_id,
                    "completedAt": response.completed_at,
                    "duration": duration,
                }),
            ),
        );
    }

    if let Some(respondent_id) = respondent_id {
        audit_trail::record(
            &state,
            AuditEvent::new(AuditAction::Create, EntityType::Response, response.id, respondent_id)
                .with_metadata(json!({ "surveyId": survey_id }))
                .with_ip(ip),
        )
        .await;
    }

    Ok(ok_with_message(
        "Response submitted successfully",
        SubmitReceipt {
            response_id: response.id,
            flagged: response.flagged,
        },
    ))
}
