pub mod analytics;
pub mod auth;
pub mod comments;
pub mod export;
pub mod health;
pub mod likes;
pub mod responses;
pub mod surveys;

use axum::http::HeaderMap;
use uuid::Uuid;

use statwox_core::models::survey::Survey;
use statwox_storage::surveys as survey_store;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Load a survey the caller authored: missing is 404, someone else's is 403.
pub(crate) async fn authored_survey(
    state: &AppState,
    id: Uuid,
    user: &AuthUser,
) -> Result<Survey, ApiError> {
    let survey = survey_store::get(&state.pool, id)
        .await?
        .ok_or_else(ApiError::survey_not_found)?;

    if survey.author_id != user.id {
        return Err(ApiError::not_author());
    }
    Ok(survey)
}

/// Run CPU-heavy work (bcrypt) off the async workers.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))
}

pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Trimmed text, or `None` when nothing is left.
pub(crate) fn clean(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
