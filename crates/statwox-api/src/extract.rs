//! Request extractors whose rejections use the API error envelope.

use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::request::Parts;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;

/// JSON body. A malformed body is a 400 validation error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string. An undecodable query is a 400 validation error.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// The `{id}` of a survey route. An ID that is not a UUID cannot name a
/// survey, so it is reported as "Survey not found".
#[derive(Debug, Clone, Copy)]
pub struct SurveyId(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for SurveyId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        path_uuid(parts, state)
            .await
            .map(SurveyId)
            .map_err(|_| ApiError::survey_not_found())
    }
}

/// The `{id}` of a comment route.
#[derive(Debug, Clone, Copy)]
pub struct CommentId(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for CommentId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        path_uuid(parts, state)
            .await
            .map(CommentId)
            .map_err(|_| ApiError::comment_not_found())
    }
}

async fn path_uuid<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<Uuid, PathRejection> {
    match Path::<Uuid>::from_request_parts(parts, state).await {
        Ok(Path(id)) => Ok(id),
        Err(e) => {
            debug!(path = %parts.uri.path(), error = %e, "unparsable id in path");
            Err(e)
        }
    }
}
