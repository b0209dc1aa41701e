use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use statwox_audit::events::{AuditAction, AuditEvent, EntityType};
use statwox_core::models::comment::{Comment, CommentThread, strip_tags};
use statwox_storage::{comments, surveys};

use crate::audit_trail;
use crate::envelope::{Envelope, done, ok, ok_with_message};
use crate::error::ApiError;
use crate::extract::{CommentId, JsonBody, QueryParams, SurveyId};
use crate::middleware::auth::{AuthUser, MaybeUser};
use crate::notify::user_channel;
use crate::routes::surveys::{Pagination, page_window};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentList {
    pub comments: Vec<CommentThread>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct CommentBody {
    pub comment: Comment,
}

/// Markup-free, trimmed comment text. Nothing left is a validation error.
fn comment_text(content: Option<String>) -> Result<String, ApiError> {
    let required = || ApiError::Validation("Comment content is required".to_string());
    let raw = content.filter(|c| !c.trim().is_empty()).ok_or_else(required)?;
    let text = strip_tags(&raw).trim().to_string();
    if text.is_empty() {
        return Err(required());
    }
    Ok(text)
}

/// Threads on a survey. A private survey's comments are visible only to
/// its author.
pub async fn list_comments(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
    MaybeUser(user): MaybeUser,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Envelope<CommentList>>, ApiError> {
    let survey = surveys::get(&state.pool, id)
        .await?
        .ok_or_else(ApiError::survey_not_found)?;

    if !survey.is_public && user.as_ref().map(|u| u.id) != Some(survey.author_id) {
        return Err(ApiError::not_author());
    }

    let (page, limit) = page_window(params.page.as_deref(), params.limit.as_deref());
    let listing = comments::list_threads(&state.pool, id, page, limit).await?;

    Ok(ok(CommentList {
        pagination: Pagination {
            page,
            limit,
            total_items: listing.total,
            total_pages: listing.total.div_ceil(limit),
        },
        comments: listing.threads,
    }))
}

/// Post a comment or a reply. Replies attach to a top-level comment of the
/// same survey; a reply to a reply is refused.
pub async fn create_comment(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Envelope<CommentBody>>), ApiError> {
    let content = comment_text(body.content)?;

    let survey = surveys::get(&state.pool, id)
        .await?
        .ok_or_else(ApiError::survey_not_found)?;

    let parent_id = match body.parent_id.as_deref() {
        None => None,
        Some(raw) => {
            let invalid = || ApiError::Validation("Invalid parent comment".to_string());
            let parent_id = Uuid::try_parse(raw).map_err(|_| invalid())?;
            let parent = comments::get(&state.pool, parent_id)
                .await?
                .filter(|p| p.survey_id == id)
                .ok_or_else(invalid)?;
            if parent.parent_id.is_some() {
                return Err(ApiError::Validation("Cannot reply to a reply".to_string()));
            }
            Some(parent.id)
        }
    };

    let comment = comments::create(&state.pool, id, user.id, parent_id, &content, Timestamp::now()).await?;
    info!(survey_id = %id, comment_id = %comment.id, user_id = %user.id, "comment posted");

    if survey.author_id != user.id {
        state.notifier.publish(
            &user_channel(survey.author_id),
            "notification",
            &json!({
                "type": "comment",
                "surveyId": id,
                "surveyTitle": survey.title,
                "commentId": comment.id,
                "userId": user.id,
            }),
        );
    }

    audit_trail::record(
        &state,
        AuditEvent::new(AuditAction::Create, EntityType::Comment, comment.id, user.id)
            .with_metadata(json!({ "surveyId": id, "parentId": parent_id })),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        ok_with_message("Comment posted successfully", CommentBody { comment }),
    ))
}

/// Edit a comment. Only its author may.
pub async fn update_comment(
    State(state): State<AppState>,
    CommentId(id): CommentId,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<UpdateCommentRequest>,
) -> Result<Json<Envelope<CommentBody>>, ApiError> {
    let content = comment_text(body.content)?;

    let comment = comments::get(&state.pool, id)
        .await?
        .ok_or_else(ApiError::comment_not_found)?;
    if comment.author.id != user.id {
        return Err(ApiError::Forbidden("Not authorized to edit this comment".to_string()));
    }

    let comment = comments::update_content(&state.pool, id, &content, Timestamp::now()).await?;

    audit_trail::record(
        &state,
        AuditEvent::new(AuditAction::Update, EntityType::Comment, id, user.id),
    )
    .await;

    Ok(ok_with_message("Comment updated successfully", CommentBody { comment }))
}

/// Delete a comment and its replies. The comment's author and the survey's
/// author may both do this.
pub async fn delete_comment(
    State(state): State<AppState>,
    CommentId(id): CommentId,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let comment = comments::get(&state.pool, id)
        .await?
        .ok_or_else(ApiError::comment_not_found)?;

    if comment.author.id != user.id {
        let survey_author = surveys::get(&state.pool, comment.survey_id)
            .await?
            .map(|s| s.author_id);
        if survey_author != Some(user.id) {
            return Err(ApiError::Forbidden("Not authorized to delete this comment".to_string()));
        }
    }

    let removed = comments::delete(&state.pool, id).await?;
    info!(comment_id = %id, removed, user_id = %user.id, "comment deleted");

    audit_trail::record(
        &state,
        AuditEvent::new(AuditAction::Delete, EntityType::Comment, id, user.id)
            .with_metadata(json!({ "surveyId": comment.survey_id, "removed": removed })),
    )
    .await;

    Ok(done("Comment deleted successfully"))
}
