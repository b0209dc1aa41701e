use std::collections::BTreeMap;

use axum::extract::State;
use axum::{Extension, Json};
use jiff::Timestamp;
use serde::Deserialize;
use uuid::Uuid;

use statwox_analytics::Snapshot;
use statwox_analytics::crosstab::{CrossTab, cross_tabulate};
use statwox_analytics::funnel::{Funnel, build_funnel};
use statwox_analytics::nps::{NpsResult, nps_by_question};
use statwox_analytics::overview::{SurveyAnalytics, survey_analytics};
use statwox_analytics::timeline::DEFAULT_TIMELINE_DAYS;
use statwox_core::numeric::parse_int_prefix;
use statwox_storage::questions;
use statwox_storage::responses::{self, ResponseWindow};

use crate::envelope::{Envelope, ok};
use crate::error::ApiError;
use crate::extract::{QueryParams, SurveyId};
use crate::middleware::auth::AuthUser;
use crate::routes::authored_survey;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    pub days: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CrossTabParams {
    #[serde(rename = "questionA")]
    pub question_a: Option<String>,
    #[serde(rename = "questionB")]
    pub question_b: Option<String>,
}

/// Overview over the most recent responses, bounded by the configured
/// window. `days` sets the timeline span from its leading integer, as
/// `parseInt` reads it; anything without one falls back to the default.
pub async fn get_analytics(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
    Extension(user): Extension<AuthUser>,
    QueryParams(params): QueryParams<AnalyticsParams>,
) -> Result<Json<Envelope<SurveyAnalytics>>, ApiError> {
    let survey = authored_survey(&state, id, &user).await?;

    let days = params
        .days
        .as_deref()
        .and_then(parse_int_prefix)
        .unwrap_or(DEFAULT_TIMELINE_DAYS);

    let window = ResponseWindow {
        limit: Some(state.config.analytics_response_window),
        complete_only: false,
    };
    let snapshot = Snapshot {
        questions: questions::list(&state.pool, id).await?,
        responses: responses::list_records(&state.pool, id, window).await?,
        survey,
    };

    Ok(ok(survey_analytics(&snapshot, Timestamp::now(), days)))
}

pub async fn get_nps(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Envelope<BTreeMap<Uuid, NpsResult>>>, ApiError> {
    authored_survey(&state, id, &user).await?;

    let questions = questions::list(&state.pool, id).await?;
    let window = ResponseWindow {
        limit: None,
        complete_only: true,
    };
    let records = responses::list_records(&state.pool, id, window).await?;

    Ok(ok(nps_by_question(&questions, &records)))
}

pub async fn get_funnel(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Envelope<Funnel>>, ApiError> {
    authored_survey(&state, id, &user).await?;

    let questions = questions::list(&state.pool, id).await?;
    let records = responses::list_records(&state.pool, id, ResponseWindow::default()).await?;

    Ok(ok(build_funnel(&questions, &records)))
}

pub async fn get_crosstab(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
    Extension(user): Extension<AuthUser>,
    QueryParams(params): QueryParams<CrossTabParams>,
) -> Result<Json<Envelope<CrossTab>>, ApiError> {
    let (Some(raw_a), Some(raw_b)) = (params.question_a, params.question_b) else {
        return Err(ApiError::Validation(
            "questionA and questionB params required".to_string(),
        ));
    };
    let question_a = parse_question_id(&raw_a)?;
    let question_b = parse_question_id(&raw_b)?;

    authored_survey(&state, id, &user).await?;

    let window = ResponseWindow {
        limit: None,
        complete_only: true,
    };
    let records = responses::list_records(&state.pool, id, window).await?;

    Ok(ok(cross_tabulate(&records, question_a, question_b)))
}

fn parse_question_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::Validation(format!("Invalid question ID: {raw}")))
}
