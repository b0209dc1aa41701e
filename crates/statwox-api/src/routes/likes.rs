use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use jiff::Timestamp;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use statwox_storage::error::StorageError;
use statwox_storage::{likes, surveys};

use crate::envelope::{Envelope, done, ok};
use crate::error::ApiError;
use crate::extract::SurveyId;
use crate::middleware::auth::{AuthUser, MaybeUser};
use crate::notify::user_channel;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LikeStatus {
    pub liked: bool,
}

/// Whether the caller likes the survey. Anonymous callers never do.
pub async fn like_status(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
    MaybeUser(user): MaybeUser,
) -> Result<Json<Envelope<LikeStatus>>, ApiError> {
    let liked = match user {
        Some(user) => likes::is_liked(&state.pool, user.id, id).await?,
        None => false,
    };
    Ok(ok(LikeStatus { liked }))
}

pub async fn like_survey(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
    Extension(user): Extension<AuthUser>,
) -> Result<(StatusCode, Json<Envelope<()>>), ApiError> {
    let survey = surveys::get(&state.pool, id)
        .await?
        .ok_or_else(ApiError::survey_not_found)?;

    likes::like(&state.pool, user.id, id, Timestamp::now())
        .await
        .map_err(|e| match e {
            StorageError::Duplicate(_) => ApiError::InvalidState("Survey already liked".to_string()),
            other => other.into(),
        })?;
    info!(survey_id = %id, user_id = %user.id, "liked survey");

    if survey.author_id != user.id {
        state.notifier.publish(
            &user_channel(survey.author_id),
            "notification",
            &json!({
                "type": "like",
                "surveyId": id,
                "surveyTitle": survey.title,
                "userId": user.id,
            }),
        );
    }

    Ok((StatusCode::CREATED, done("Survey liked successfully")))
}

pub async fn unlike_survey(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Envelope<()>>, ApiError> {
    likes::unlike(&state.pool, user.id, id)
        .await
        .map_err(|e| match e {
            StorageError::NotFound { .. } => ApiError::InvalidState("Survey not liked yet".to_string()),
            other => other.into(),
        })?;
    info!(survey_id = %id, user_id = %user.id, "unliked survey");

    Ok(done("Survey unliked successfully"))
}
