use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use serde_json::json;

use statwox_audit::events::{AuditAction, AuditEvent, EntityType};
use statwox_export::table::{export_filename, responses_csv};
use statwox_storage::questions;
use statwox_storage::responses::{self, ResponseWindow};

use crate::audit_trail;
use crate::error::ApiError;
use crate::extract::SurveyId;
use crate::middleware::auth::AuthUser;
use crate::routes::authored_survey;
use crate::state::AppState;

/// Every response as a CSV attachment, newest first.
pub async fn export_csv(
    State(state): State<AppState>,
    SurveyId(id): SurveyId,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, ApiError> {
    authored_survey(&state, id, &user).await?;

    let questions = questions::list(&state.pool, id).await?;
    let records = responses::list_records(&state.pool, id, ResponseWindow::default()).await?;
    let csv = responses_csv(&questions, &records)?;

    audit_trail::record(
        &state,
        AuditEvent::new(AuditAction::Export, EntityType::Survey, id, user.id)
            .with_metadata(json!({ "format": "csv", "responses": records.len() })),
    )
    .await;

    let disposition = format!("attachment; filename=\"{}\"", export_filename(id));
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
